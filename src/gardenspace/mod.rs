//! Gardenspace detection
//!
//! After a nest is built, look for a closed loop of the builder's nests
//! through it. Neighbours are the nearest nests along each axis; the loop's
//! interior is then filled row by row and claimed.

pub mod fill;
pub mod search;

pub use fill::{interior, perimeter};
pub use search::{find_loop, SearchLimits, MIN_LOOP_NODES};

use std::collections::BTreeMap;

use crate::core::error::Result;
use crate::core::types::{AvatarId, Coord, WorldId};
use crate::spatial::bitmap::Category;
use crate::spatial::grid::GridStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    pub fn delta(&self) -> (i64, i64) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }
}

/// Ownership of the permanents at one cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellOwners {
    pub nest: Option<AvatarId>,
    pub gardenspace: Option<AvatarId>,
}

/// Nest lookups the loop search runs against
pub trait NestMap {
    /// Nearest nest strictly beyond `from` along `dir`, at most `max_len` cells away
    fn nearest_nest(&self, from: Coord, dir: Direction, max_len: u32) -> Result<Option<Coord>>;

    fn owners(&self, at: Coord) -> Result<CellOwners>;
}

/// Fixed in-memory nest layout
#[derive(Debug, Clone, Default)]
pub struct StaticNestMap {
    cells: BTreeMap<Coord, CellOwners>,
}

impl StaticNestMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_nest(&mut self, at: Coord, owner: AvatarId) {
        self.cells.entry(at).or_default().nest = Some(owner);
    }

    pub fn claim_gardenspace(&mut self, at: Coord, owner: AvatarId) {
        self.cells.entry(at).or_default().gardenspace = Some(owner);
    }
}

impl NestMap for StaticNestMap {
    fn nearest_nest(&self, from: Coord, dir: Direction, max_len: u32) -> Result<Option<Coord>> {
        let (dx, dy) = dir.delta();
        Ok((1..=i64::from(max_len))
            .map(|step| from.offset(dx * step, dy * step))
            .find(|c| self.cells.get(c).is_some_and(|o| o.nest.is_some())))
    }

    fn owners(&self, at: Coord) -> Result<CellOwners> {
        Ok(self.cells.get(&at).copied().unwrap_or_default())
    }
}

/// Grid-backed nest lookups.
///
/// The nest just built is still waiting in the write queue, so it is layered
/// over the stored index.
pub struct GridNestMap<'a> {
    pub grid: &'a GridStore,
    pub world: &'a WorldId,
    pub chunk_width: u32,
    pub pending: (Coord, AvatarId),
}

impl NestMap for GridNestMap<'_> {
    fn nearest_nest(&self, from: Coord, dir: Direction, max_len: u32) -> Result<Option<Coord>> {
        if max_len == 0 {
            return Ok(None);
        }
        let (dx, dy) = dir.delta();
        let len = i64::from(max_len);
        let near = from.offset(dx, dy);
        let far = from.offset(dx * len, dy * len);

        let mut hits =
            self.grid
                .query_bounding_box(self.world, self.chunk_width, Category::Nest, near, far, true)?;
        let (pending, _) = self.pending;
        let on_ray = (pending.x - from.x).signum() == dx
            && (pending.y - from.y).signum() == dy
            && pending.manhattan(&from) <= u64::from(max_len);
        if on_ray {
            hits.push(pending);
        }
        Ok(hits.into_iter().min_by_key(|c| c.manhattan(&from)))
    }

    fn owners(&self, at: Coord) -> Result<CellOwners> {
        let block = self.grid.fetch(self.world, at)?;
        let mut owners = CellOwners {
            nest: block.as_ref().and_then(|b| b.permanents.nest).map(|p| p.owner),
            gardenspace: block.as_ref().and_then(|b| b.permanents.gardenspace).map(|p| p.owner),
        };
        if at == self.pending.0 {
            owners.nest = Some(self.pending.1);
        }
        Ok(owners)
    }
}
