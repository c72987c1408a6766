//! Avatar records and their score sheet

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::core::types::{now_millis, AvatarId, Location, Timestamp, WorldId};
use crate::entity::item::Item;
use crate::entity::species::SpeciesSpec;

// === SCORES ===

/// Ranked score categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScoreCategory {
    Moved,
    FromOrigin,
    Gardenspaces,
    GardenspaceBlocks,
    NestsBuilt,
    ItemsConsumed,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 6] = [
        ScoreCategory::Moved,
        ScoreCategory::FromOrigin,
        ScoreCategory::Gardenspaces,
        ScoreCategory::GardenspaceBlocks,
        ScoreCategory::NestsBuilt,
        ScoreCategory::ItemsConsumed,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            ScoreCategory::Moved => "moved",
            ScoreCategory::FromOrigin => "from-origin",
            ScoreCategory::Gardenspaces => "gardenspaces",
            ScoreCategory::GardenspaceBlocks => "gardenspace-blocks",
            ScoreCategory::NestsBuilt => "nests-built",
            ScoreCategory::ItemsConsumed => "items-consumed",
        }
    }

    /// Human-readable table heading
    pub fn heading(&self) -> &'static str {
        match self {
            ScoreCategory::Moved => "Total distance flown",
            ScoreCategory::FromOrigin => "Distance flown from start block",
            ScoreCategory::Gardenspaces => "Number of gardenspaces captured",
            ScoreCategory::GardenspaceBlocks => "Total blocks captured in all owned gardenspaces",
            ScoreCategory::NestsBuilt => "Total nests built",
            ScoreCategory::ItemsConsumed => "Total items eaten",
        }
    }
}

impl fmt::Display for ScoreCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ScoreCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoreCategory::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| format!("unknown score category {:?}", s))
    }
}

/// Score sheet: the known counters plus an open map for anything else
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Scores {
    #[serde(default)]
    pub moved: u64,
    #[serde(default)]
    pub from_origin: u64,
    #[serde(default)]
    pub gardenspaces: u64,
    #[serde(default)]
    pub gardenspace_blocks: u64,
    #[serde(default)]
    pub nests_built: u64,
    #[serde(default)]
    pub items_consumed: u64,
    #[serde(flatten)]
    pub extra: BTreeMap<String, u64>,
}

impl Scores {
    pub fn get(&self, category: ScoreCategory) -> u64 {
        match category {
            ScoreCategory::Moved => self.moved,
            ScoreCategory::FromOrigin => self.from_origin,
            ScoreCategory::Gardenspaces => self.gardenspaces,
            ScoreCategory::GardenspaceBlocks => self.gardenspace_blocks,
            ScoreCategory::NestsBuilt => self.nests_built,
            ScoreCategory::ItemsConsumed => self.items_consumed,
        }
    }

    /// Add to an open-ended counter
    pub fn bump_extra(&mut self, name: &str, by: u64) {
        *self.extra.entry(name.to_string()).or_insert(0) += by;
    }

    /// Every counter keyed by its store name
    pub fn entries(&self) -> Vec<(String, u64)> {
        ScoreCategory::ALL
            .iter()
            .map(|c| (c.key().to_string(), self.get(*c)))
            .chain(self.extra.iter().map(|(k, v)| (k.clone(), *v)))
            .collect()
    }
}

// === AVATAR ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Avatar {
    pub id: AvatarId,
    /// Species key into the configured species table
    pub species: String,
    pub name: String,
    /// 0 means dead
    pub life: u32,
    #[serde(default)]
    pub scores: Scores,
    /// Items that may still be eaten at the current block
    pub consume_allowed: u32,
    #[serde(default)]
    pub inventory: Vec<Item>,
    #[serde(default)]
    pub loc: Option<Location>,
    #[serde(default)]
    pub origin: Option<Location>,
    pub created_at: Timestamp,
    #[serde(default)]
    pub died_at: Option<Timestamp>,
}

impl Avatar {
    pub fn new(name: String, species_key: &str, spec: &SpeciesSpec) -> Self {
        Self {
            id: AvatarId::new(),
            species: species_key.to_string(),
            name,
            life: spec.life,
            scores: Scores::default(),
            consume_allowed: spec.stats.tranquility,
            inventory: Vec::new(),
            loc: None,
            origin: None,
            created_at: now_millis(),
            died_at: None,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.life == 0
    }

    pub fn world(&self) -> Option<&WorldId> {
        self.loc.as_ref().map(|l| &l.world)
    }

    /// Whether the avatar is standing exactly at `loc`
    pub fn is_at(&self, loc: &Location) -> bool {
        self.loc.as_ref() == Some(loc)
    }

    /// Sum of carried item stats contributing to `affect`
    pub fn material_total(&self, affect: &str) -> u32 {
        self.inventory
            .iter()
            .filter(|i| i.affect == affect)
            .map(|i| i.stat)
            .sum()
    }
}
