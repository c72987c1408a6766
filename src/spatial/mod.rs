//! Spatial layer: blocks, the chunked presence index and terrain

pub mod bitmap;
pub mod block;
pub mod grid;
pub mod noise;
pub mod terrain;

pub use bitmap::{Category, ChunkCoord};
pub use block::{Block, InventoryEntry, Permanent, Permanents, Poster, StructureKind};
pub use grid::GridStore;
pub use noise::{ConstantNoise, NoiseSource, ValueNoise};
pub use terrain::{TerrainBand, TerrainTable};
