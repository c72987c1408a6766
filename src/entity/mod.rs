//! Avatar, world, species and item records

pub mod avatar;
pub mod item;
pub mod species;
pub mod store;
pub mod world;

pub use avatar::{Avatar, ScoreCategory, Scores};
pub use item::{Item, ItemDef, ItemKind, Rarity};
pub use species::{SpeciesSpec, SpeciesStats};
pub use store::EntityStore;
pub use world::{WorldParams, WorldRecord};
