//! Avatar economy: movement, items, building and scores
//!
//! Every operation loads the avatar and world, decides the outcome from what
//! is stored now, and queues the resulting writes. Expected refusals come back
//! as `Denied` results; only invariant violations are errors.

pub mod avatars;
pub mod build;
pub mod items;
pub mod movement;
pub mod scores;

pub use avatars::NewAvatar;
pub use build::{BuildFailure, BuildResult, GardenspaceClaim};
pub use items::{ItemOpFailure, ItemOpResult};
pub use movement::{movement_cost, MoveFailure, MoveResult};
pub use scores::{HighScoreEntry, HighScoreTable, ScoreQuery};

use crate::core::error::{FaunaError, Result};
use crate::core::types::{AvatarId, WorldId};
use crate::engine::{Engine, WriteOp};
use crate::entity::avatar::Avatar;
use crate::entity::species::SpeciesSpec;
use crate::entity::world::WorldRecord;

/// Everything an action needs about who is acting and where
pub(crate) struct Actor {
    pub avatar: Avatar,
    pub world: WorldRecord,
    pub spec: SpeciesSpec,
}

impl Engine {
    pub(crate) fn load_actor(&self, avatar_id: AvatarId, world_id: &WorldId) -> Result<Actor> {
        let avatar = self
            .entities
            .get_avatar(avatar_id)?
            .ok_or(FaunaError::AvatarNotFound(avatar_id))?;

        if let Some(current) = avatar.world() {
            if current != world_id {
                return Err(FaunaError::WorldChange {
                    avatar: avatar_id,
                    from: current.clone(),
                    to: world_id.clone(),
                });
            }
        }

        let world = self.get_world(world_id)?;
        let spec = self.config.species_spec(&avatar.species)?.clone();
        Ok(Actor {
            avatar,
            world,
            spec,
        })
    }

    pub(crate) fn save_avatar(&self, avatar: &Avatar) {
        self.defer(WriteOp::PutAvatar {
            avatar: Box::new(avatar.clone()),
        });
    }

    pub(crate) fn register_scores(&self, avatar: &Avatar) {
        self.defer(WriteOp::RegisterScores {
            avatar: avatar.id,
            scores: avatar.scores.entries(),
        });
    }
}
