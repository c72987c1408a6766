//! World and block operations

use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::core::error::{FaunaError, Result};
use crate::core::sanitize::sanitize;
use crate::core::types::{now_millis, Coord, WorldId};
use crate::engine::{counter, Engine, WriteOp};
use crate::entity::species::SpeciesStats;
use crate::entity::world::{generate_world_name, WorldParams, WorldRecord};
use crate::generation::{roll_visit, VisitContext};
use crate::spatial::bitmap::{box_area, Category};
use crate::spatial::block::{Block, InventoryEntry, Poster};

/// Result of [`Engine::enter_world`]
#[derive(Debug, Clone)]
pub struct EnterWorld {
    pub world_id: WorldId,
    pub world: WorldRecord,
    /// No record existed when the call was made; creation lands on the next tick
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteResult {
    /// Note queued; the block will hold `inventory_len` entries
    Added { inventory_len: usize },
    /// Nothing left after sanitizing
    Empty,
}

impl NoteResult {
    pub fn is_success(&self) -> bool {
        matches!(self, NoteResult::Added { .. })
    }
}

impl Engine {
    // === WORLDS ===

    /// Look up or create the world described by `params`
    pub fn enter_world(&self, params: WorldParams) -> Result<EnterWorld> {
        params.check(&self.config.world)?;
        let world_id = params.world_id()?;
        if let Some(world) = self.entities.get_world(&world_id)? {
            return Ok(EnterWorld {
                world_id,
                world,
                is_new: false,
            });
        }

        let name = generate_world_name(&mut *self.rng.lock());
        let world = WorldRecord {
            name,
            params,
            created_at: now_millis(),
        };
        info!(world = %world_id, name = %world.name, "new world requested");
        self.defer(WriteOp::CreateWorld {
            id: world_id.clone(),
            record: world.clone(),
        });
        Ok(EnterWorld {
            world_id,
            world,
            is_new: true,
        })
    }

    pub fn get_world(&self, id: &WorldId) -> Result<WorldRecord> {
        self.entities
            .get_world(id)?
            .ok_or_else(|| FaunaError::WorldNotFound(id.clone()))
    }

    pub fn list_worlds(&self) -> Result<Vec<(WorldId, WorldRecord)>> {
        self.entities.list_worlds()
    }

    pub(crate) fn chunk_width(&self, world: &WorldRecord) -> u32 {
        world.chunk_width(self.config.world.default_chunk_width)
    }

    // === BLOCKS ===

    /// Blocks only exist inside the configured coordinate bound
    pub(crate) fn check_coord(&self, coord: Coord) -> Result<()> {
        let limit = self.config.world.coord_limit;
        if coord.within(limit) {
            Ok(())
        } else {
            Err(FaunaError::CoordOutOfBounds { coord, limit })
        }
    }

    /// Fetch a block, creating it from noise if it has never been stored.
    ///
    /// With a `visitor` the visit counter is bumped and an item roll runs.
    /// Nothing is queued; the flag says whether the block differs from what
    /// is stored, so the caller can fold it into its own single write.
    pub(crate) fn load_block(
        &self,
        world_id: &WorldId,
        world: &WorldRecord,
        coord: Coord,
        visitor: Option<&SpeciesStats>,
    ) -> Result<(Block, bool)> {
        self.check_coord(coord)?;
        let (mut block, mut dirty) = match self.grid.fetch(world_id, coord)? {
            Some(block) => (block, false),
            None => {
                let n = self.noise.sample(&world.params, coord);
                (Block::new(n, self.grid.terrain()), true)
            }
        };

        if visitor.is_some() {
            block.count = self.grid.record_visit(world_id, coord)?;

            let season = self.current_season();
            let ctx = VisitContext {
                config: &self.config,
                season,
                visitor,
            };
            let items = roll_visit(&ctx, &mut *self.rng.lock());
            if !items.is_empty() {
                self.bump_by(counter::ITEMS_GENERATED, items.len() as i64)?;
                for item in items {
                    block.push_item(item);
                }
                dirty = true;
            }
        }
        Ok((block, dirty))
    }

    /// [`Engine::load_block`], queueing the block if it changed
    pub(crate) fn visit_block(
        &self,
        world_id: &WorldId,
        world: &WorldRecord,
        coord: Coord,
        visitor: Option<&SpeciesStats>,
    ) -> Result<Block> {
        let (block, dirty) = self.load_block(world_id, world, coord, visitor)?;
        if dirty {
            self.queue_block(world_id, world, coord, block.clone());
        }
        Ok(block)
    }

    pub(crate) fn queue_block(&self, world_id: &WorldId, world: &WorldRecord, coord: Coord, block: Block) {
        self.defer(WriteOp::PutBlock {
            world: world_id.clone(),
            chunk_width: self.chunk_width(world),
            coord,
            block,
        });
    }

    /// Block at `coord`, created lazily; never counts as a visit
    pub fn get_block(&self, world_id: &WorldId, coord: Coord) -> Result<Block> {
        let world = self.get_world(world_id)?;
        self.visit_block(world_id, &world, coord, None)
    }

    /// Leave a note on a block
    pub fn add_block_note(&self, world_id: &WorldId, coord: Coord, text: &str, poster: Poster) -> Result<NoteResult> {
        let world = self.get_world(world_id)?;
        let limit = self.config.app.sanitize_length_limit;
        let payload = sanitize(text, limit);
        if payload.is_empty() {
            return Ok(NoteResult::Empty);
        }
        let poster = Poster {
            name: sanitize(&poster.name, self.config.app.avatar_name_length_limit),
            ..poster
        };

        let (mut block, _) = self.load_block(world_id, &world, coord, None)?;
        block.inventory.push(InventoryEntry::Note { payload, poster });
        let inventory_len = block.inventory.len();
        self.queue_block(world_id, &world, coord, block);
        self.bump(counter::NOTES)?;
        debug!(world = %world_id, %coord, "note added");
        Ok(NoteResult::Added { inventory_len })
    }

    /// Flagged coordinates per category inside the box, row-major
    pub fn list_blocks_in_bounding_box(
        &self,
        world_id: &WorldId,
        categories: &[Category],
        from: Coord,
        to: Coord,
    ) -> Result<BTreeMap<Category, Vec<Coord>>> {
        self.check_coord(from)?;
        self.check_coord(to)?;
        let area = box_area(from, to);
        let limit = self.config.world.max_query_area;
        if area > limit {
            return Err(FaunaError::BoundingBoxTooLarge {
                from,
                to,
                area,
                limit,
            });
        }

        let world = self.get_world(world_id)?;
        let width = self.chunk_width(&world);
        let mut out = BTreeMap::new();
        for category in categories {
            let coords = self
                .grid
                .query_bounding_box(world_id, width, *category, from, to, true)?;
            out.insert(*category, coords);
        }
        Ok(out)
    }
}
