//! Per-visit item generation
//!
//! Every configured item gets one roll when a block is visited. The base
//! chance is raised by a random seasonal bonus (scaled down by rarity) when
//! the current season is the one its preferred terrain is boosted in, and by
//! the visitor's perception. Spawned items draw their stat from the
//! configured range, whose top is widened by the visitor's metabolism
//! (consumables) or strength (raw materials).

use rand::Rng;
use tracing::debug;

use crate::core::calendar::Season;
use crate::core::config::GameConfig;
use crate::entity::item::{Item, ItemDef, ItemKind};
use crate::entity::species::SpeciesStats;

/// Inputs fixed for one visit
#[derive(Debug, Clone, Copy)]
pub struct VisitContext<'a> {
    pub config: &'a GameConfig,
    pub season: Season,
    /// Stats of the visiting species, when a player is present
    pub visitor: Option<&'a SpeciesStats>,
}

impl<'a> VisitContext<'a> {
    fn stat_fraction(&self, stat: u32) -> f64 {
        let max = self.config.meta.stat_max.max(1);
        f64::from(stat.min(max)) / f64::from(max)
    }

    /// Whether `def`'s preferred terrain is boosted this season
    pub fn in_season(&self, def: &ItemDef) -> bool {
        def.terrain
            .as_ref()
            .and_then(|t| self.config.block.boosts.get(t))
            .map(|s| *s == self.season)
            .unwrap_or(false)
    }

    /// Spawn chance for one roll; the seasonal bonus consumes one random draw
    pub fn spawn_chance<R: Rng>(&self, def: &ItemDef, rng: &mut R) -> f64 {
        let gen = &self.config.generation;
        let mut chance = def.generate;

        if self.in_season(def) {
            let boost: f64 = rng.gen::<f64>() * gen.season_boost_max;
            chance += boost * gen.rarity_reduction_pct.retained(def.rarity);
        }

        if let Some(stats) = self.visitor {
            let bonus = self.stat_fraction(stats.perception) * gen.species_chance_weight;
            chance += bonus.min(gen.species_chance_max);
        }

        chance.clamp(0.0, 1.0)
    }

    /// Inclusive stat range after species widening
    pub fn stat_range(&self, kind: ItemKind, def: &ItemDef) -> (u32, u32) {
        let [lo, hi] = def.range;
        let widen = match self.visitor {
            Some(stats) => {
                let stat = match kind {
                    ItemKind::Consumable => stats.metabolism,
                    ItemKind::RawMaterial => stats.strength,
                };
                let max = f64::from(self.config.generation.range_widen_max);
                (self.stat_fraction(stat) * max).floor() as u32
            }
            None => 0,
        };
        (lo, hi.max(lo) + widen)
    }
}

/// Roll every item definition once; returns what spawned
pub fn roll_visit<R: Rng>(ctx: &VisitContext<'_>, rng: &mut R) -> Vec<Item> {
    let mut spawned = Vec::new();
    for (kind, def) in ctx.config.items.all() {
        let chance = ctx.spawn_chance(def, rng);
        if rng.gen::<f64>() >= chance {
            continue;
        }
        let (lo, hi) = ctx.stat_range(kind, def);
        let stat = rng.gen_range(lo..=hi);
        spawned.push(def.instantiate(kind, stat));
    }
    if !spawned.is_empty() {
        debug!(count = spawned.len(), season = %ctx.season, "items generated");
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ItemTables;
    use crate::entity::item::Rarity;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn single_item_config(generate: f64, terrain: Option<&str>) -> GameConfig {
        let mut config = GameConfig::default();
        config.items = ItemTables {
            consumable: vec![ItemDef {
                name: "berries".into(),
                image: None,
                affect: "life".into(),
                generate,
                range: [3, 8],
                rarity: Rarity::Common,
                terrain: terrain.map(str::to_string),
            }],
            raw_material: Vec::new(),
        };
        config
    }

    fn stats(perception: u32, metabolism: u32) -> SpeciesStats {
        SpeciesStats {
            mobility: 5,
            perception,
            metabolism,
            strength: 0,
            tranquility: 2,
        }
    }

    #[test]
    fn test_spawn_count_is_binomial() {
        let p = 0.2;
        let n = 10_000;
        let config = single_item_config(p, None);
        let ctx = VisitContext {
            config: &config,
            season: Season::Spring,
            visitor: None,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1234);

        let spawned: usize = (0..n).map(|_| roll_visit(&ctx, &mut rng).len()).sum();

        let mean = n as f64 * p;
        let sd = (n as f64 * p * (1.0 - p)).sqrt();
        assert!(
            (spawned as f64 - mean).abs() < 4.0 * sd,
            "spawned {} outside {} +/- {}",
            spawned,
            mean,
            4.0 * sd
        );
    }

    #[test]
    fn test_seasonal_boost_only_in_matching_season() {
        // Meadow is boosted in spring by default
        let config = single_item_config(0.1, Some("meadow"));
        let def = &config.items.consumable[0];
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let winter = VisitContext { config: &config, season: Season::Winter, visitor: None };
        assert!(!winter.in_season(def));
        assert_eq!(winter.spawn_chance(def, &mut rng), 0.1);

        let spring = VisitContext { config: &config, season: Season::Spring, visitor: None };
        assert!(spring.in_season(def));
        let chance = spring.spawn_chance(def, &mut rng);
        assert!(chance >= 0.1 && chance <= 0.1 + config.generation.season_boost_max);
    }

    #[test]
    fn test_perception_bonus_is_capped() {
        let mut config = single_item_config(0.1, None);
        config.generation.species_chance_weight = 0.5;
        config.generation.species_chance_max = 0.02;
        let def = config.items.consumable[0].clone();
        let visitor = stats(10, 0);
        let ctx = VisitContext { config: &config, season: Season::Winter, visitor: Some(&visitor) };

        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!((ctx.spawn_chance(&def, &mut rng) - 0.12).abs() < 1e-9);
    }

    #[test]
    fn test_metabolism_widens_consumable_range() {
        let config = single_item_config(1.0, None);
        let def = config.items.consumable[0].clone();

        let plain = VisitContext { config: &config, season: Season::Winter, visitor: None };
        assert_eq!(plain.stat_range(ItemKind::Consumable, &def), (3, 8));

        let hungry = stats(0, 10);
        let ctx = VisitContext { config: &config, season: Season::Winter, visitor: Some(&hungry) };
        assert_eq!(ctx.stat_range(ItemKind::Consumable, &def), (3, 10));
        // Strength, not metabolism, widens raw materials
        assert_eq!(ctx.stat_range(ItemKind::RawMaterial, &def), (3, 8));
    }

    #[test]
    fn test_certain_item_always_spawns_within_range() {
        let config = single_item_config(1.0, None);
        let ctx = VisitContext { config: &config, season: Season::Winter, visitor: None };
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        for _ in 0..100 {
            let items = roll_visit(&ctx, &mut rng);
            assert_eq!(items.len(), 1);
            assert!((3..=8).contains(&items[0].stat));
        }
    }
}
