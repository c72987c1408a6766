//! Movement cost and avatar placement

use tracing::{debug, info};

use crate::core::error::Result;
use crate::core::types::{now_millis, AvatarId, Coord, Location, WorldId};
use crate::engine::{counter, Engine};
use crate::entity::avatar::Avatar;
use crate::spatial::block::{Block, InventoryEntry, Poster};

/// Life deducted for moving `distance` blocks.
///
/// Formula: ceil(distance / (0.9 + mobility / stat_max) * weight)
/// - mobility 0 => ceil(distance / 0.9)
/// - mobility == stat_max => ceil(distance / 1.9)
pub fn movement_cost(distance: u64, mobility: u32, stat_max: u32, weight: f64) -> u32 {
    if distance == 0 {
        return 0;
    }
    let mobility = f64::from(mobility.min(stat_max));
    let discount = 0.9 + mobility / f64::from(stat_max.max(1));
    let raw = distance as f64 / discount * weight;
    // Float noise must not push an exact quotient up to the next integer
    let cost = (raw - 1e-9).ceil().max(0.0);
    if cost >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        cost as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveFailure {
    /// The move would cost more life than is left
    InsufficientLife { cost: u32, life: u32 },
    /// Destination is the current block
    AlreadyHere,
    Dead,
}

#[derive(Debug, Clone)]
pub enum MoveResult {
    Moved {
        cost: u32,
        distance: u64,
        /// Life after the move
        life: u32,
        first_placement: bool,
        died: bool,
        /// Destination block as the avatar found it
        block: Block,
    },
    Denied(MoveFailure),
}

impl MoveResult {
    pub fn is_success(&self) -> bool {
        matches!(self, MoveResult::Moved { .. })
    }
}

impl Engine {
    /// Move an avatar, or place it for the first time.
    ///
    /// Every fallible read happens before the avatar and block writes are
    /// queued, and counters are bumped only after both are queued.
    pub fn set_avatar_loc(&self, avatar_id: AvatarId, world_id: &WorldId, coord: Coord) -> Result<MoveResult> {
        self.check_coord(coord)?;
        let actor = self.load_actor(avatar_id, world_id)?;
        let mut avatar = actor.avatar;
        if avatar.is_dead() {
            return Ok(MoveResult::Denied(MoveFailure::Dead));
        }

        let destination = Location {
            world: world_id.clone(),
            coord,
        };
        let (cost, distance) = match &avatar.loc {
            None => (0, 0),
            Some(current) if current.coord == coord => {
                return Ok(MoveResult::Denied(MoveFailure::AlreadyHere));
            }
            Some(current) => {
                let distance = current.coord.manhattan(&coord);
                let meta = &self.config.meta;
                let cost = movement_cost(
                    distance,
                    actor.spec.stats.mobility,
                    meta.stat_max,
                    meta.movement_weight,
                );
                // A dying avatar always gets one last move
                if avatar.life < cost && avatar.life != 1 {
                    return Ok(MoveResult::Denied(MoveFailure::InsufficientLife {
                        cost,
                        life: avatar.life,
                    }));
                }
                (cost, distance)
            }
        };

        let (block, mut dirty) = self.load_block(world_id, &actor.world, coord, Some(&actor.spec.stats))?;

        let first_placement = avatar.loc.is_none();
        if avatar.origin.is_none() {
            avatar.origin = Some(destination.clone());
        }
        avatar.life = avatar.life.saturating_sub(cost);
        avatar.scores.moved = avatar.scores.moved.saturating_add(distance);
        avatar.consume_allowed = actor.spec.stats.tranquility;
        avatar.loc = Some(destination);

        let died = avatar.life == 0;
        let mut stored = block.clone();
        if died {
            self.record_death(&mut avatar, coord, &mut stored, &actor.spec.display_name);
            self.register_scores(&avatar);
            dirty = true;
        }

        self.save_avatar(&avatar);
        if dirty {
            self.queue_block(world_id, &actor.world, coord, stored);
        }
        debug!(avatar = %avatar.id, %coord, cost, life = avatar.life, "avatar moved");

        self.bump(counter::MOVES)?;
        if died {
            self.bump(counter::DEATHS)?;
        }

        Ok(MoveResult::Moved {
            cost,
            distance,
            life: avatar.life,
            first_placement,
            died,
            block,
        })
    }

    /// Runs once, on the move that takes life to 0. Leaves an epitaph and a
    /// tombstone on `block`.
    fn record_death(&self, avatar: &mut Avatar, coord: Coord, block: &mut Block, species_name: &str) {
        avatar.died_at = Some(now_millis());
        avatar.scores.from_origin = avatar
            .origin
            .as_ref()
            .map(|o| o.coord.manhattan(&coord))
            .unwrap_or(0);

        block.inventory.push(InventoryEntry::Note {
            payload: format!("Here lies {} the {}, who flew {} blocks.", avatar.name, species_name, avatar.scores.moved),
            poster: Poster {
                id: Some(avatar.id),
                name: avatar.name.clone(),
                species: avatar.species.clone(),
            },
        });
        block.inventory.push(InventoryEntry::Tombstone {
            avatar: Box::new(avatar.clone()),
        });

        info!(
            avatar = %avatar.id,
            name = %avatar.name,
            %coord,
            moved = avatar.scores.moved,
            from_origin = avatar.scores.from_origin,
            "avatar died"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_cost_examples() {
        assert_eq!(movement_cost(0, 5, 10, 1.0), 0);
        assert_eq!(movement_cost(1, 10, 10, 1.0), 1);
        assert_eq!(movement_cost(19, 10, 10, 1.0), 10);
        assert_eq!(movement_cost(20, 10, 10, 1.0), 11);
        assert_eq!(movement_cost(9, 0, 10, 1.0), 10);
        assert_eq!(movement_cost(10, 0, 10, 1.0), 12);
        assert_eq!(movement_cost(19, 10, 10, 2.0), 20);
    }

    #[test]
    fn test_mobility_above_max_is_clamped() {
        assert_eq!(movement_cost(19, 50, 10, 1.0), movement_cost(19, 10, 10, 1.0));
    }

    proptest! {
        #[test]
        fn prop_full_mobility_costs_ceil_d_over_1_9(d in 0u64..200_000) {
            let expected = (d * 10 + 18) / 19;
            prop_assert_eq!(u64::from(movement_cost(d, 10, 10, 1.0)), expected);
        }

        #[test]
        fn prop_zero_mobility_costs_ceil_d_over_0_9(d in 0u64..200_000) {
            let expected = (d * 10 + 8) / 9;
            prop_assert_eq!(u64::from(movement_cost(d, 0, 10, 1.0)), expected);
        }

        #[test]
        fn prop_cost_never_below_distance_over_1_9(d in 1u64..10_000, mobility in 0u32..=10) {
            let cost = u64::from(movement_cost(d, mobility, 10, 1.0));
            prop_assert!(cost * 19 >= d * 10);
            prop_assert!(cost * 9 <= d * 10 + 9);
        }
    }
}
