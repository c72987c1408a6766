//! Game configuration with documented defaults
//!
//! Every section is optional in the TOML file; missing sections fall back to
//! the defaults below, which mirror `config/fauna.toml`.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::core::calendar::Season;
use crate::core::error::{FaunaError, Result};
use crate::entity::item::{ItemDef, ItemKind, Rarity};
use crate::entity::species::{SpeciesSpec, SpeciesStats};
use crate::spatial::terrain::{TerrainBand, TerrainTable};

/// Top-level configuration for the engine and the game rules it enforces
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub engine: EngineConfig,
    pub world: WorldConfig,
    pub meta: MetaConfig,
    pub block: BlockConfig,
    pub species: BTreeMap<String, SpeciesSpec>,
    pub items: ItemTables,
    pub generation: GenerationConfig,
    pub create: CreateConfig,
    pub gardenspace: GardenspaceConfig,
    pub app: AppConfig,
}

// === ENGINE ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Scheduler ticks per real second
    pub tick_freq_hz: u32,

    /// Game-time multiplier applied to each tick period
    ///
    /// At 8640 with 4 Hz, one real second advances the calendar by
    /// 2.4 game hours, so a game year passes in roughly an hour.
    pub time_mult: f64,

    /// Prefix for every key written to the store
    pub key_prefix: String,

    /// Fixed RNG seed; `None` seeds from OS entropy
    pub rng_seed: Option<u64>,

    /// Extra attempts for a failing write-op within the same tick
    pub write_retries: u32,
}

impl EngineConfig {
    /// Real time between ticks
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.tick_freq_hz.max(1)))
    }

    /// Game milliseconds added per tick
    pub fn game_millis_per_tick(&self) -> i64 {
        (self.tick_period().as_millis() as f64 * self.time_mult).round() as i64
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_freq_hz: 4,
            time_mult: 8640.0,
            key_prefix: "fauna-dev".into(),
            rng_seed: None,
            write_retries: 2,
        }
    }
}

// === WORLD ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Side length of a square bitmap chunk for worlds that do not set one
    pub default_chunk_width: u32,

    /// Largest bounding box (in blocks) a single listing may cover
    pub max_query_area: u64,

    /// Widest chunk a client may ask for when creating a world
    pub max_chunk_width: u32,

    /// Most noise octaves a world may ask for
    pub max_lod: u32,

    /// Blocks exist only where `|x|` and `|y|` are at most this
    pub coord_limit: i64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            default_chunk_width: 32,
            max_query_area: 256 * 256,
            max_chunk_width: 1024,
            max_lod: 16,
            coord_limit: 1 << 40,
        }
    }
}

// === META ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetaConfig {
    /// Upper bound for every species stat
    pub stat_max: u32,

    /// Upper bound for the tranquility stat (per-visit consumption budget)
    pub tranquility_max: u32,

    /// Carried raw materials per avatar
    pub inventory_max: usize,

    /// Global multiplier on the effective movement cost
    pub movement_weight: f64,
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            stat_max: 10,
            tranquility_max: 3,
            inventory_max: 5,
            movement_weight: 1.0,
        }
    }
}

// === BLOCK ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BlockConfig {
    /// Ordered noise thresholds -> terrain name
    pub types: TerrainTable,

    /// Season for each month, January first
    pub seasons: Vec<Season>,

    /// Terrain name -> the season in which items preferring it thrive
    pub boosts: BTreeMap<String, Season>,
}

impl BlockConfig {
    pub fn season_for_month(&self, month0: usize) -> Season {
        self.seasons.get(month0).copied().unwrap_or_default()
    }
}

impl Default for BlockConfig {
    fn default() -> Self {
        use Season::*;
        let band = |below: f64, name: &str| TerrainBand {
            below,
            name: name.into(),
        };
        Self {
            types: TerrainTable::new(vec![
                band(0.2, "water"),
                band(0.4, "meadow"),
                band(0.6, "forest"),
                band(0.8, "mountain"),
                band(1.0, "snowcap"),
            ]),
            seasons: vec![
                Winter, Winter, Spring, Spring, Spring, Summer, Summer, Summer, Autumn, Autumn,
                Autumn, Winter,
            ],
            boosts: [
                ("meadow", Spring),
                ("forest", Summer),
                ("mountain", Autumn),
                ("water", Winter),
            ]
            .into_iter()
            .map(|(t, s)| (t.to_string(), s))
            .collect(),
        }
    }
}

// === ITEMS ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ItemTables {
    pub consumable: Vec<ItemDef>,
    pub raw_material: Vec<ItemDef>,
}

impl ItemTables {
    /// Every definition paired with its kind
    pub fn all(&self) -> impl Iterator<Item = (ItemKind, &ItemDef)> {
        self.consumable
            .iter()
            .map(|d| (ItemKind::Consumable, d))
            .chain(self.raw_material.iter().map(|d| (ItemKind::RawMaterial, d)))
    }
}

impl Default for ItemTables {
    fn default() -> Self {
        let def = |name: &str, affect: &str, generate: f64, range: [u32; 2], rarity, terrain: &str| {
            ItemDef {
                name: name.into(),
                image: Some(format!("{}.png", name.replace(' ', "_"))),
                affect: affect.into(),
                generate,
                range,
                rarity,
                terrain: Some(terrain.into()),
            }
        };
        Self {
            consumable: vec![
                def("berries", "life", 0.10, [3, 8], Rarity::Common, "meadow"),
                def("seeds", "life", 0.15, [1, 4], Rarity::Common, "meadow"),
                def("worm", "life", 0.06, [6, 12], Rarity::Uncommon, "forest"),
                def("nectar", "life", 0.04, [10, 20], Rarity::Rare, "meadow"),
                def("golden beetle", "life", 0.01, [25, 40], Rarity::Legendary, "mountain"),
            ],
            raw_material: vec![
                def("twig", "wood", 0.12, [1, 3], Rarity::Common, "forest"),
                def("reed", "wood", 0.08, [1, 2], Rarity::Common, "water"),
                def("bark", "wood", 0.05, [2, 5], Rarity::Uncommon, "forest"),
                def("pine cone", "wood", 0.03, [3, 6], Rarity::Rare, "mountain"),
            ],
        }
    }
}

// === GENERATION ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Largest random seasonal bonus added to an item's generate chance
    pub season_boost_max: f64,

    /// Percentage removed from the seasonal bonus per rarity tier
    pub rarity_reduction_pct: RarityReduction,

    /// Chance bonus per unit of (perception / stat_max)
    pub species_chance_weight: f64,

    /// Cap on the perception chance bonus
    pub species_chance_max: f64,

    /// Extra stat added to the top of an item's range at stat == stat_max
    ///
    /// Metabolism widens consumables, strength widens raw materials.
    pub range_widen_max: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            season_boost_max: 0.05,
            rarity_reduction_pct: RarityReduction::default(),
            species_chance_weight: 0.02,
            species_chance_max: 0.02,
            range_widen_max: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RarityReduction {
    pub common: u32,
    pub uncommon: u32,
    pub rare: u32,
    pub legendary: u32,
}

impl RarityReduction {
    /// Fraction of the seasonal bonus kept for this tier
    pub fn retained(&self, rarity: Rarity) -> f64 {
        let pct = match rarity {
            Rarity::Common => self.common,
            Rarity::Uncommon => self.uncommon,
            Rarity::Rare => self.rare,
            Rarity::Legendary => self.legendary,
        };
        1.0 - f64::from(pct.min(100)) / 100.0
    }
}

impl Default for RarityReduction {
    fn default() -> Self {
        Self {
            common: 0,
            uncommon: 25,
            rare: 50,
            legendary: 75,
        }
    }
}

// === CREATE ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CreateConfig {
    pub nest: StructureSpec,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StructureSpec {
    /// Item affect -> total stat needed
    pub requires: BTreeMap<String, u32>,
}

impl Default for CreateConfig {
    fn default() -> Self {
        Self {
            nest: StructureSpec {
                requires: [("wood".to_string(), 10)].into_iter().collect(),
            },
        }
    }
}

// === GARDENSPACE ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GardenspaceConfig {
    /// Furthest a nest may be from the previous loop node along one axis
    pub max_edge_length: u32,

    /// Search frames expanded before giving up
    pub max_search_nodes: usize,
}

impl Default for GardenspaceConfig {
    fn default() -> Self {
        Self {
            max_edge_length: 24,
            max_search_nodes: 2048,
        }
    }
}

// === APP ===

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub sanitize_length_limit: usize,
    pub avatar_name_length_limit: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sanitize_length_limit: 512,
            avatar_name_length_limit: 32,
        }
    }
}

fn default_species() -> BTreeMap<String, SpeciesSpec> {
    let spec = |display: &str, life: u32, stats: [u32; 5]| SpeciesSpec {
        display_name: display.into(),
        life,
        stats: SpeciesStats {
            mobility: stats[0],
            perception: stats[1],
            metabolism: stats[2],
            strength: stats[3],
            tranquility: stats[4],
        },
    };
    [
        ("bluebird", spec("Bluebird", 100, [6, 6, 5, 4, 2])),
        ("butterfly", spec("Butterfly", 60, [3, 8, 7, 1, 3])),
        ("crow", spec("Crow", 120, [6, 7, 4, 8, 1])),
        ("hummingbird", spec("Hummingbird", 70, [9, 5, 9, 2, 3])),
        ("morningdove", spec("Morning Dove", 110, [4, 4, 5, 5, 3])),
        ("sparrow", spec("Sparrow", 100, [5, 6, 5, 4, 2])),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            world: WorldConfig::default(),
            meta: MetaConfig::default(),
            block: BlockConfig::default(),
            species: default_species(),
            items: ItemTables::default(),
            generation: GenerationConfig::default(),
            create: CreateConfig::default(),
            gardenspace: GardenspaceConfig::default(),
            app: AppConfig::default(),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config: GameConfig =
            toml::from_str(content).map_err(|e| FaunaError::Config(e.to_string()))?;
        config.validate().map_err(FaunaError::Config)?;
        Ok(config)
    }

    pub fn species_spec(&self, key: &str) -> Result<&SpeciesSpec> {
        self.species
            .get(key)
            .ok_or_else(|| FaunaError::UnknownSpecies(key.to_string()))
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.engine.tick_freq_hz == 0 || self.engine.tick_freq_hz > 1000 {
            return Err(format!(
                "engine.tick_freq_hz ({}) must be within 1..=1000",
                self.engine.tick_freq_hz
            ));
        }

        if !(self.engine.time_mult > 0.0) {
            return Err("engine.time_mult must be positive".into());
        }

        if self.world.default_chunk_width == 0 || self.world.default_chunk_width > self.world.max_chunk_width {
            return Err(format!(
                "world.default_chunk_width ({}) must be within 1..={}",
                self.world.default_chunk_width, self.world.max_chunk_width
            ));
        }

        if self.world.max_chunk_width > 1 << 16 {
            return Err("world.max_chunk_width must be at most 65536".into());
        }

        if self.world.coord_limit <= 0 || self.world.coord_limit > i64::MAX / 4 {
            return Err(format!(
                "world.coord_limit ({}) must be within 1..={}",
                self.world.coord_limit,
                i64::MAX / 4
            ));
        }

        if self.block.types.is_empty() {
            return Err("block.types must list at least one terrain".into());
        }

        if self.block.seasons.len() != 12 {
            return Err(format!(
                "block.seasons must have 12 entries, found {}",
                self.block.seasons.len()
            ));
        }

        if self.meta.stat_max == 0 {
            return Err("meta.stat_max must be positive".into());
        }

        for (key, spec) in &self.species {
            let s = &spec.stats;
            let highest = s.mobility.max(s.perception).max(s.metabolism).max(s.strength);
            if highest > self.meta.stat_max {
                return Err(format!(
                    "species {} has a stat of {} above stat_max {}",
                    key, highest, self.meta.stat_max
                ));
            }
            if s.tranquility > self.meta.tranquility_max {
                return Err(format!(
                    "species {} tranquility {} exceeds tranquility_max {}",
                    key, s.tranquility, self.meta.tranquility_max
                ));
            }
            if spec.life == 0 {
                return Err(format!("species {} must start with life", key));
            }
        }

        for (_, def) in self.items.all() {
            if def.range[0] > def.range[1] {
                return Err(format!("item {} has an inverted range", def.name));
            }
            if !(0.0..=1.0).contains(&def.generate) {
                return Err(format!(
                    "item {} generate chance {} is outside [0, 1]",
                    def.name, def.generate
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_bundled_toml_matches_defaults() {
        let config = GameConfig::parse_toml(include_str!("../../config/fauna.toml")).unwrap();
        let defaults = GameConfig::default();

        assert_eq!(config.engine.tick_freq_hz, defaults.engine.tick_freq_hz);
        assert_eq!(config.meta.stat_max, defaults.meta.stat_max);
        assert_eq!(config.block.seasons, defaults.block.seasons);
        assert_eq!(config.species.len(), defaults.species.len());
        assert_eq!(config.items.consumable.len(), defaults.items.consumable.len());
        assert_eq!(config.items.raw_material.len(), defaults.items.raw_material.len());
        assert_eq!(config.create.nest.requires.get("wood"), Some(&10));
        assert_eq!(config.world.max_chunk_width, defaults.world.max_chunk_width);
        assert_eq!(config.world.max_lod, defaults.world.max_lod);
        assert_eq!(config.world.coord_limit, defaults.world.coord_limit);
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config = GameConfig::parse_toml("[engine]\ntick_freq_hz = 10\n").unwrap();
        assert_eq!(config.engine.tick_freq_hz, 10);
        assert_eq!(config.meta.inventory_max, 5);
        assert!(config.species.contains_key("sparrow"));
    }

    #[test]
    fn test_rejects_bad_season_table() {
        let err = GameConfig::parse_toml("[block]\nseasons = [\"spring\"]\n");
        assert!(matches!(err, Err(FaunaError::Config(_))));
    }

    #[test]
    fn test_rejects_stat_above_max() {
        let mut config = GameConfig::default();
        config.meta.stat_max = 5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unbounded_world_limits() {
        let mut config = GameConfig::default();
        config.world.default_chunk_width = 2048;
        assert!(config.validate().is_err());

        let mut config = GameConfig::default();
        config.world.coord_limit = i64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tick_period_and_game_millis() {
        let engine = EngineConfig {
            tick_freq_hz: 4,
            time_mult: 10.0,
            ..EngineConfig::default()
        };
        assert_eq!(engine.tick_period(), Duration::from_millis(250));
        assert_eq!(engine.game_millis_per_tick(), 2500);
    }

    #[test]
    fn test_rarity_reduction() {
        let r = RarityReduction::default();
        assert!((r.retained(Rarity::Common) - 1.0).abs() < 1e-9);
        assert!((r.retained(Rarity::Legendary) - 0.25).abs() < 1e-9);
    }
}
