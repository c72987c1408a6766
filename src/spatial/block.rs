//! Block records: the content of one grid cell

use serde::{Deserialize, Serialize};

use crate::core::types::{AvatarId, ItemId, Timestamp};
use crate::entity::avatar::Avatar;
use crate::entity::item::Item;
use crate::spatial::bitmap::Category;
use crate::spatial::terrain::TerrainTable;

/// Who left a note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Poster {
    pub id: Option<AvatarId>,
    pub name: String,
    pub species: String,
}

/// Something lying in a block
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InventoryEntry {
    Item { payload: Item },
    Note { payload: String, poster: Poster },
    /// Snapshot of an avatar taken at the moment it died here
    Tombstone { avatar: Box<Avatar> },
}

impl InventoryEntry {
    pub fn category(&self) -> Category {
        match self {
            InventoryEntry::Item { .. } => Category::Item,
            InventoryEntry::Note { .. } => Category::Note,
            InventoryEntry::Tombstone { .. } => Category::Tombstone,
        }
    }
}

/// Kinds of permanent structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Nest,
    Gardenspace,
}

impl StructureKind {
    pub fn category(&self) -> Category {
        match self {
            StructureKind::Nest => Category::Nest,
            StructureKind::Gardenspace => Category::Gardenspace,
        }
    }
}

/// Ownership stamp for a permanent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permanent {
    pub owner: AvatarId,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Permanents {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nest: Option<Permanent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gardenspace: Option<Permanent>,
}

impl Permanents {
    pub fn get(&self, kind: StructureKind) -> Option<&Permanent> {
        match kind {
            StructureKind::Nest => self.nest.as_ref(),
            StructureKind::Gardenspace => self.gardenspace.as_ref(),
        }
    }

    pub fn set(&mut self, kind: StructureKind, permanent: Permanent) {
        match kind {
            StructureKind::Nest => self.nest = Some(permanent),
            StructureKind::Gardenspace => self.gardenspace = Some(permanent),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nest.is_none() && self.gardenspace.is_none()
    }
}

/// One grid cell of a world
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    /// Cached noise sample
    pub n: Option<f64>,
    /// Terrain derived from `n`; fixed once set
    #[serde(default, rename = "type")]
    pub terrain: Option<String>,
    /// Visit count, maintained as a separate counter in the store
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub inventory: Vec<InventoryEntry>,
    #[serde(default)]
    pub permanents: Permanents,
}

impl Block {
    pub fn new(n: f64, terrain: &TerrainTable) -> Self {
        let mut block = Self {
            n: Some(n),
            ..Self::default()
        };
        block.ensure_terrain(terrain);
        block
    }

    /// Derive terrain from `n` unless it is already cached
    pub fn ensure_terrain(&mut self, table: &TerrainTable) {
        if self.terrain.is_none() {
            if let Some(n) = self.n {
                self.terrain = table.classify(n).map(str::to_string);
            }
        }
    }

    /// Whether this block's content places it in `category`
    pub fn has(&self, category: Category) -> bool {
        match category {
            Category::Occupied => !self.inventory.is_empty(),
            Category::Note | Category::Item | Category::Tombstone => {
                self.inventory.iter().any(|e| e.category() == category)
            }
            Category::Nest => self.permanents.nest.is_some(),
            Category::Gardenspace => self.permanents.gardenspace.is_some(),
            Category::Permanent => !self.permanents.is_empty(),
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.inventory.iter().filter_map(|e| match e {
            InventoryEntry::Item { payload } => Some(payload),
            _ => None,
        })
    }

    pub fn find_item(&self, id: ItemId) -> Option<&Item> {
        self.items().find(|item| item.id == id)
    }

    /// Remove and return an item lying here
    pub fn take_item(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.inventory.iter().position(
            |e| matches!(e, InventoryEntry::Item { payload } if payload.id == id),
        )?;
        match self.inventory.remove(idx) {
            InventoryEntry::Item { payload } => Some(payload),
            _ => None,
        }
    }

    pub fn push_item(&mut self, item: Item) {
        self.inventory.push(InventoryEntry::Item { payload: item });
    }

    pub fn notes(&self) -> impl Iterator<Item = (&str, &Poster)> {
        self.inventory.iter().filter_map(|e| match e {
            InventoryEntry::Note { payload, poster } => Some((payload.as_str(), poster)),
            _ => None,
        })
    }
}
