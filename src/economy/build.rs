//! Building permanents and claiming gardenspaces

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::core::error::Result;
use crate::core::types::{now_millis, AvatarId, Coord, Location, WorldId};
use crate::engine::{counter, Engine};
use crate::entity::avatar::Avatar;
use crate::entity::world::WorldRecord;
use crate::gardenspace::{find_loop, interior, GridNestMap, SearchLimits};
use crate::spatial::block::{Block, Permanent, StructureKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildFailure {
    Dead,
    NotHere,
    /// Only nests can be built directly
    NotBuildable(StructureKind),
    AlreadyBuilt,
    InsufficientMaterials { affect: String, needed: u32, have: u32 },
}

/// Territory claimed by closing a loop of nests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GardenspaceClaim {
    /// Loop nodes starting at the new nest
    pub nodes: Vec<Coord>,
    /// Interior cells, row-major
    pub interior: Vec<Coord>,
    /// Interior cells actually stamped (foreign claims are skipped)
    pub claimed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildResult {
    Built {
        kind: StructureKind,
        gardenspace: Option<GardenspaceClaim>,
    },
    Denied(BuildFailure),
}

impl BuildResult {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Built { .. })
    }
}

/// Remove carried items, in inventory order, until every requirement is met.
/// Leaves the inventory untouched and reports the first shortfall otherwise.
pub fn consume_materials(avatar: &mut Avatar, requires: &BTreeMap<String, u32>) -> Option<BuildFailure> {
    for (affect, needed) in requires {
        let have = avatar.material_total(affect);
        if have < *needed {
            return Some(BuildFailure::InsufficientMaterials {
                affect: affect.clone(),
                needed: *needed,
                have,
            });
        }
    }

    for (affect, needed) in requires {
        let mut gathered = 0;
        avatar.inventory.retain(|item| {
            if gathered >= *needed || item.affect != *affect {
                return true;
            }
            gathered += item.stat;
            false
        });
    }
    None
}

impl Engine {
    /// Build a structure on the avatar's current block
    pub fn create_structure(&self, avatar_id: AvatarId, world_id: &WorldId, coord: Coord, kind: StructureKind) -> Result<BuildResult> {
        let actor = self.load_actor(avatar_id, world_id)?;
        let mut avatar = actor.avatar;
        if avatar.is_dead() {
            return Ok(BuildResult::Denied(BuildFailure::Dead));
        }
        let here = Location {
            world: world_id.clone(),
            coord,
        };
        if !avatar.is_at(&here) {
            return Ok(BuildResult::Denied(BuildFailure::NotHere));
        }
        if kind != StructureKind::Nest {
            return Ok(BuildResult::Denied(BuildFailure::NotBuildable(kind)));
        }

        let (mut block, _) = self.load_block(world_id, &actor.world, coord, None)?;
        if block.permanents.nest.is_some() {
            return Ok(BuildResult::Denied(BuildFailure::AlreadyBuilt));
        }
        if let Some(failure) = consume_materials(&mut avatar, &self.config.create.nest.requires) {
            return Ok(BuildResult::Denied(failure));
        }

        block.permanents.set(
            kind,
            Permanent {
                owner: avatar.id,
                created_at: now_millis(),
            },
        );
        avatar.scores.nests_built += 1;

        let found = self.detect_gardenspace(world_id, &actor.world, coord, avatar.id)?;
        if let Some((claim, _)) = &found {
            avatar.scores.gardenspaces += 1;
            avatar.scores.gardenspace_blocks += claim.claimed as u64;
        }

        // No reads past this point; the avatar and the nest are queued together
        self.save_avatar(&avatar);
        self.queue_block(world_id, &actor.world, coord, block);
        info!(avatar = %avatar.id, world = %world_id, %coord, "nest built");
        let gardenspace = match found {
            Some((claim, stamped)) => {
                for (cell, block) in stamped {
                    self.queue_block(world_id, &actor.world, cell, block);
                }
                Some(claim)
            }
            None => None,
        };
        self.register_scores(&avatar);

        self.bump(counter::NESTS_BUILT)?;
        if gardenspace.is_some() {
            self.bump(counter::GARDENSPACES)?;
        }
        Ok(BuildResult::Built { kind, gardenspace })
    }

    /// Look for a loop through the nest just built at `origin`.
    ///
    /// Returns the claim and the interior blocks with the gardenspace stamped
    /// on them, ready to queue.
    fn detect_gardenspace(
        &self,
        world_id: &WorldId,
        world: &WorldRecord,
        origin: Coord,
        owner: AvatarId,
    ) -> Result<Option<(GardenspaceClaim, Vec<(Coord, Block)>)>> {
        let map = GridNestMap {
            grid: &self.grid,
            world: world_id,
            chunk_width: self.chunk_width(world),
            pending: (origin, owner),
        };
        let limits = SearchLimits {
            max_edge_length: self.config.gardenspace.max_edge_length,
            max_nodes: self.config.gardenspace.max_search_nodes,
        };
        let Some(nodes) = find_loop(&map, origin, owner, limits)? else {
            debug!(%origin, "no gardenspace formed");
            return Ok(None);
        };

        let cells = interior(&nodes);
        let stamp = Permanent {
            owner,
            created_at: now_millis(),
        };
        let mut stamped = Vec::with_capacity(cells.len());
        for cell in &cells {
            let mut block = match self.grid.fetch(world_id, *cell)? {
                Some(block) => block,
                None => Block::new(self.noise.sample(&world.params, *cell), self.grid.terrain()),
            };
            if block.permanents.gardenspace.is_some_and(|g| g.owner != owner) {
                continue;
            }
            block.permanents.set(StructureKind::Gardenspace, stamp);
            stamped.push((*cell, block));
        }

        info!(
            avatar = %owner,
            %origin,
            nodes = nodes.len(),
            claimed = stamped.len(),
            "gardenspace claimed"
        );
        let claim = GardenspaceClaim {
            nodes,
            interior: cells,
            claimed: stamped.len(),
        };
        Ok(Some((claim, stamped)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ItemId;
    use crate::entity::item::{Item, ItemKind, Rarity};
    use crate::entity::species::{SpeciesSpec, SpeciesStats};

    fn wood(stat: u32) -> Item {
        Item {
            id: ItemId::new(),
            name: "twig".into(),
            kind: ItemKind::RawMaterial,
            affect: "wood".into(),
            stat,
            rarity: Rarity::Common,
            image: None,
        }
    }

    fn avatar_with(items: Vec<Item>) -> Avatar {
        let spec = SpeciesSpec {
            display_name: "Crow".into(),
            life: 100,
            stats: SpeciesStats::default(),
        };
        let mut avatar = Avatar::new("Kaw".into(), "crow", &spec);
        avatar.inventory = items;
        avatar
    }

    fn requires(wood: u32) -> BTreeMap<String, u32> {
        [("wood".to_string(), wood)].into_iter().collect()
    }

    #[test]
    fn test_materials_consumed_in_inventory_order() {
        let mut avatar = avatar_with(vec![wood(4), wood(4), wood(4), wood(1)]);
        let last_two: Vec<ItemId> = avatar.inventory[2..].iter().map(|i| i.id).collect();

        assert!(consume_materials(&mut avatar, &requires(8)).is_none());
        let left: Vec<ItemId> = avatar.inventory.iter().map(|i| i.id).collect();
        assert_eq!(left, last_two);
    }

    #[test]
    fn test_shortfall_leaves_inventory_alone() {
        let mut avatar = avatar_with(vec![wood(3), wood(3)]);
        let failure = consume_materials(&mut avatar, &requires(10));
        assert_eq!(
            failure,
            Some(BuildFailure::InsufficientMaterials {
                affect: "wood".into(),
                needed: 10,
                have: 6
            })
        );
        assert_eq!(avatar.inventory.len(), 2);
    }

    #[test]
    fn test_overshoot_uses_whole_items() {
        let mut avatar = avatar_with(vec![wood(7), wood(7)]);
        assert!(consume_materials(&mut avatar, &requires(10)).is_none());
        assert!(avatar.inventory.is_empty());
    }
}
