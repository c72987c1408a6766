//! Point store for avatar and world records

use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::core::error::{FaunaError, Result};
use crate::core::types::{AvatarId, WorldId};
use crate::entity::avatar::Avatar;
use crate::entity::world::WorldRecord;
use crate::store::{KeySpace, Store};

pub struct EntityStore {
    store: Arc<dyn Store>,
    keys: KeySpace,
}

fn decode<T: DeserializeOwned>(key: &str, field: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|e| FaunaError::CorruptRecord {
        key: format!("{}/{}", key, field),
        reason: e.to_string(),
    })
}

impl EntityStore {
    pub fn new(store: Arc<dyn Store>, keys: KeySpace) -> Self {
        Self { store, keys }
    }

    // === AVATARS ===

    pub fn get_avatar(&self, id: AvatarId) -> Result<Option<Avatar>> {
        let key = self.keys.avatars();
        let field = id.to_string();
        self.store
            .hget(&key, &field)?
            .map(|raw| decode(&key, &field, &raw))
            .transpose()
    }

    pub fn put_avatar(&self, avatar: &Avatar) -> Result<()> {
        let json = serde_json::to_string(avatar)?;
        self.store
            .hset(&self.keys.avatars(), &avatar.id.to_string(), json)?;
        Ok(())
    }

    /// Every avatar, oldest first
    pub fn list_avatars(&self) -> Result<Vec<Avatar>> {
        let key = self.keys.avatars();
        let mut avatars = self
            .store
            .hgetall(&key)?
            .into_iter()
            .map(|(field, raw)| decode::<Avatar>(&key, &field, &raw))
            .collect::<Result<Vec<_>>>()?;
        avatars.sort_by_key(|a| (a.created_at, a.id));
        Ok(avatars)
    }

    // === WORLDS ===

    pub fn get_world(&self, id: &WorldId) -> Result<Option<WorldRecord>> {
        let key = self.keys.worlds();
        self.store
            .hget(&key, id.as_str())?
            .map(|raw| decode(&key, id.as_str(), &raw))
            .transpose()
    }

    /// Store the record only if `id` is unused; false when it already existed
    pub fn create_world(&self, id: &WorldId, record: &WorldRecord) -> Result<bool> {
        let json = serde_json::to_string(record)?;
        self.store.hsetnx(&self.keys.worlds(), id.as_str(), json)
    }

    pub fn list_worlds(&self) -> Result<Vec<(WorldId, WorldRecord)>> {
        let key = self.keys.worlds();
        let mut worlds = self
            .store
            .hgetall(&key)?
            .into_iter()
            .map(|(field, raw)| -> Result<(WorldId, WorldRecord)> {
                let id = WorldId::parse(&field)?;
                let record = decode::<WorldRecord>(&key, &field, &raw)?;
                Ok((id, record))
            })
            .collect::<Result<Vec<_>>>()?;
        worlds.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(worlds)
    }
}
