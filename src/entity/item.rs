//! Item definitions and generated item instances

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::types::ItemId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Restores life when eaten
    Consumable,
    /// Carried toward a build requirement
    RawMaterial,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Consumable => write!(f, "consumable"),
            ItemKind::RawMaterial => write!(f, "raw material"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Legendary,
}

/// Configured template an item is rolled from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    /// What the item contributes to: "life" for food, material names otherwise
    pub affect: String,
    /// Base spawn chance per visit
    pub generate: f64,
    /// Inclusive stat range
    pub range: [u32; 2],
    #[serde(default)]
    pub rarity: Rarity,
    /// Terrain whose season boosts this item
    #[serde(default)]
    pub terrain: Option<String>,
}

impl ItemDef {
    pub fn instantiate(&self, kind: ItemKind, stat: u32) -> Item {
        Item {
            id: ItemId::new(),
            name: self.name.clone(),
            kind,
            affect: self.affect.clone(),
            stat,
            rarity: self.rarity,
            image: self.image.clone(),
        }
    }
}

/// A concrete item lying in a block or carried by an avatar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
    pub kind: ItemKind,
    pub affect: String,
    pub stat: u32,
    pub rarity: Rarity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_copies_template() {
        let def = ItemDef {
            name: "worm".into(),
            image: None,
            affect: "life".into(),
            generate: 0.1,
            range: [2, 4],
            rarity: Rarity::Uncommon,
            terrain: Some("forest".into()),
        };
        let a = def.instantiate(ItemKind::Consumable, 3);
        let b = def.instantiate(ItemKind::Consumable, 3);
        assert_eq!(a.name, "worm");
        assert_eq!(a.rarity, Rarity::Uncommon);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&ItemKind::RawMaterial).unwrap();
        assert_eq!(json, "\"raw_material\"");
    }
}
