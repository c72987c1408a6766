//! Fauna - persistent shared world engine
//!
//! Avatars spend life to move across a procedurally generated grid, eat and
//! gather items, and build nests whose loops enclose claimable gardenspaces.

pub mod core;
pub mod economy;
pub mod engine;
pub mod entity;
pub mod gardenspace;
pub mod generation;
pub mod spatial;
pub mod store;

pub use crate::core::{FaunaError, GameConfig, Result};
pub use crate::engine::Engine;
