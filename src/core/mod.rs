pub mod calendar;
pub mod config;
pub mod error;
pub mod sanitize;
pub mod types;

pub use calendar::{Calendar, GameTime, Season};
pub use config::GameConfig;
pub use error::{FaunaError, Result};
pub use types::{AvatarId, Coord, ItemId, Location, WorldId};
