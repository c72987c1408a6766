//! Species stat tables

use serde::{Deserialize, Serialize};

/// Per-species stats, each in `0..=stat_max` (tranquility in `0..=tranquility_max`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpeciesStats {
    /// Discounts movement cost
    pub mobility: u32,
    /// Raises item spawn chances
    pub perception: u32,
    /// Widens the stat range of generated food
    pub metabolism: u32,
    /// Widens the stat range of generated raw materials
    pub strength: u32,
    /// Items that may be eaten per visit
    pub tranquility: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesSpec {
    pub display_name: String,
    /// Starting and maximum life
    pub life: u32,
    pub stats: SpeciesStats,
}
