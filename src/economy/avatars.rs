//! Avatar creation and lookup

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::error::{FaunaError, Result};
use crate::core::sanitize::sanitize;
use crate::core::types::AvatarId;
use crate::engine::{counter, Engine};
use crate::entity::avatar::Avatar;

/// Request to create an avatar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAvatar {
    pub name: String,
    /// Key into the species table
    pub species: String,
}

impl Engine {
    /// Create an avatar with full life and no location. The record is stored on
    /// the next tick.
    pub fn create_avatar(&self, request: NewAvatar) -> Result<AvatarId> {
        let spec = self.config.species_spec(&request.species)?;
        let mut name = sanitize(&request.name, self.config.app.avatar_name_length_limit);
        if name.is_empty() {
            name = spec.display_name.clone();
        }

        let avatar = Avatar::new(name, &request.species, spec);
        info!(avatar = %avatar.id, species = %avatar.species, name = %avatar.name, "avatar created");
        self.save_avatar(&avatar);
        self.bump(counter::AVATARS_CREATED)?;
        Ok(avatar.id)
    }

    pub fn get_avatar(&self, id: AvatarId) -> Result<Avatar> {
        self.entities
            .get_avatar(id)?
            .ok_or(FaunaError::AvatarNotFound(id))
    }

    pub fn list_avatars(&self) -> Result<Vec<Avatar>> {
        self.entities.list_avatars()
    }
}
