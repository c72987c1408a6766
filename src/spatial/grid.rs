//! Grid store: block records plus the chunked presence index
//!
//! Block content lives in one hash per world (`x:y` -> JSON, `x:y:count` ->
//! visit counter). Every write re-derives all category bits for the
//! coordinate so the index never drifts from the content it summarizes.

use std::sync::Arc;
use tracing::debug;

use crate::core::error::{FaunaError, Result};
use crate::core::types::{Coord, WorldId};
use crate::spatial::bitmap::{decode_chunk, normalize_box, Category, ChunkCoord};
use crate::spatial::block::Block;
use crate::spatial::terrain::TerrainTable;
use crate::store::{KeySpace, Store};

pub struct GridStore {
    store: Arc<dyn Store>,
    keys: KeySpace,
    terrain: TerrainTable,
}

impl GridStore {
    pub fn new(store: Arc<dyn Store>, keys: KeySpace, terrain: TerrainTable) -> Self {
        Self {
            store,
            keys,
            terrain,
        }
    }

    pub fn terrain(&self) -> &TerrainTable {
        &self.terrain
    }

    /// Stored block at `coord` with its current visit count
    pub fn fetch(&self, world: &WorldId, coord: Coord) -> Result<Option<Block>> {
        let key = self.keys.grid(world);
        let field = KeySpace::block_field(coord);
        let Some(raw) = self.store.hget(&key, &field)? else {
            return Ok(None);
        };
        let mut block: Block = serde_json::from_str(&raw).map_err(|e| FaunaError::CorruptRecord {
            key: format!("{}/{}", key, field),
            reason: e.to_string(),
        })?;
        block.count = self.visit_count(world, coord)?;
        Ok(Some(block))
    }

    pub fn visit_count(&self, world: &WorldId, coord: Coord) -> Result<u64> {
        let raw = self
            .store
            .hget(&self.keys.grid(world), &KeySpace::count_field(coord))?;
        Ok(raw.and_then(|v| v.parse::<u64>().ok()).unwrap_or(0))
    }

    /// Bump the visit counter, returning the new count
    pub fn record_visit(&self, world: &WorldId, coord: Coord) -> Result<u64> {
        let count = self
            .store
            .hincrby(&self.keys.grid(world), &KeySpace::count_field(coord), 1)?;
        Ok(count.max(0) as u64)
    }

    /// Replace the block at `coord` and resync every category bit for it.
    /// Only write-ops call this.
    pub fn put_block(&self, world: &WorldId, chunk_width: u32, coord: Coord, block: &Block) -> Result<()> {
        let mut block = block.clone();
        block.ensure_terrain(&self.terrain);

        let json = serde_json::to_string(&block)?;
        self.store
            .hset(&self.keys.grid(world), &KeySpace::block_field(coord), json)?;

        let (chunk, offset) = ChunkCoord::locate(coord, chunk_width);
        for category in Category::ALL {
            let key = self.keys.bitmap(world, category, chunk);
            self.store.setbit(&key, offset, block.has(category))?;
        }
        debug!(%world, %coord, "block stored");
        Ok(())
    }

    /// Single-bit presence check
    pub fn has(&self, world: &WorldId, chunk_width: u32, category: Category, coord: Coord) -> Result<bool> {
        let (chunk, offset) = ChunkCoord::locate(coord, chunk_width);
        self.store
            .getbit(&self.keys.bitmap(world, category, chunk), offset)
    }

    /// Coordinates flagged for `category` in the box spanned by `from` and `to`.
    ///
    /// Each overlapped chunk is read once. With `strict` the result is cut to
    /// the exact box and sorted row-major; otherwise every flagged coordinate
    /// in the touched chunks is returned in chunk order.
    pub fn query_bounding_box(
        &self,
        world: &WorldId,
        chunk_width: u32,
        category: Category,
        from: Coord,
        to: Coord,
        strict: bool,
    ) -> Result<Vec<Coord>> {
        let (min, max) = normalize_box(from, to);
        let mut out = Vec::new();

        for chunk in ChunkCoord::covering(min, max, chunk_width) {
            let key = self.keys.bitmap(world, category, chunk);
            if let Some(buf) = self.store.get_bytes(&key)? {
                out.extend(decode_chunk(chunk, chunk_width, &buf));
            }
        }

        if strict {
            out.retain(|c| c.x >= min.x && c.x <= max.x && c.y >= min.y && c.y <= max.y);
            out.sort_by_key(|c| c.row_major());
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::AvatarId;
    use crate::entity::item::{Item, ItemKind, Rarity};
    use crate::spatial::block::Permanent;
    use crate::spatial::terrain::TerrainBand;
    use crate::store::MemoryStore;
    use crate::core::types::ItemId;

    fn grid() -> GridStore {
        GridStore::new(
            Arc::new(MemoryStore::new()),
            KeySpace::new("grid-test"),
            TerrainTable::new(vec![TerrainBand {
                below: 1.0,
                name: "meadow".into(),
            }]),
        )
    }

    fn world() -> WorldId {
        WorldId::parse(&"ab".repeat(32)).unwrap()
    }

    fn berry() -> Item {
        Item {
            id: ItemId::new(),
            name: "berries".into(),
            kind: ItemKind::Consumable,
            affect: "life".into(),
            stat: 4,
            rarity: Rarity::Common,
            image: None,
        }
    }

    #[test]
    fn test_put_then_fetch_sets_and_clears_bits() {
        let grid = grid();
        let w = world();
        let c = Coord::new(-5, 12);

        let mut block = Block {
            n: Some(0.5),
            ..Block::default()
        };
        block.push_item(berry());
        grid.put_block(&w, 8, c, &block).unwrap();

        let stored = grid.fetch(&w, c).unwrap().unwrap();
        assert_eq!(stored.terrain.as_deref(), Some("meadow"));
        assert!(grid.has(&w, 8, Category::Item, c).unwrap());
        assert!(grid.has(&w, 8, Category::Occupied, c).unwrap());
        assert!(!grid.has(&w, 8, Category::Nest, c).unwrap());

        let mut emptied = stored;
        emptied.inventory.clear();
        grid.put_block(&w, 8, c, &emptied).unwrap();
        assert!(!grid.has(&w, 8, Category::Item, c).unwrap());
        assert!(!grid.has(&w, 8, Category::Occupied, c).unwrap());
    }

    #[test]
    fn test_visit_count_survives_put() {
        let grid = grid();
        let w = world();
        let c = Coord::new(1, 1);
        grid.put_block(&w, 8, c, &Block::default()).unwrap();
        assert_eq!(grid.record_visit(&w, c).unwrap(), 1);
        assert_eq!(grid.record_visit(&w, c).unwrap(), 2);

        let block = grid.fetch(&w, c).unwrap().unwrap();
        grid.put_block(&w, 8, c, &block).unwrap();
        assert_eq!(grid.fetch(&w, c).unwrap().unwrap().count, 2);
    }

    #[test]
    fn test_strict_query_is_clipped_and_row_major() {
        let grid = grid();
        let w = world();
        let owner = AvatarId::new();
        for c in [Coord::new(3, 1), Coord::new(-1, 0), Coord::new(0, 1), Coord::new(20, 20)] {
            let mut block = Block::default();
            block.permanents.nest = Some(Permanent { owner, created_at: 0 });
            grid.put_block(&w, 8, c, &block).unwrap();
        }

        let strict = grid
            .query_bounding_box(&w, 8, Category::Nest, Coord::new(5, 5), Coord::new(-1, 0), true)
            .unwrap();
        assert_eq!(strict, vec![Coord::new(-1, 0), Coord::new(0, 1), Coord::new(3, 1)]);

        // Loose mode returns everything in touched chunks, even outside the box
        let loose = grid
            .query_bounding_box(&w, 8, Category::Nest, Coord::new(0, 0), Coord::new(1, 1), false)
            .unwrap();
        assert!(loose.contains(&Coord::new(3, 1)));
        assert!(!loose.contains(&Coord::new(20, 20)));
    }

    #[test]
    fn test_query_over_unwritten_chunks_is_empty() {
        let grid = grid();
        let found = grid
            .query_bounding_box(&world(), 8, Category::Note, Coord::new(-100, -100), Coord::new(100, 100), true)
            .unwrap();
        assert!(found.is_empty());
    }
}
