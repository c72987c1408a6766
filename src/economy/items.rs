//! Eating, picking up and dropping items

use tracing::debug;

use crate::core::error::Result;
use crate::core::types::{AvatarId, Coord, ItemId, Location, WorldId};
use crate::economy::Actor;
use crate::engine::{counter, Engine};
use crate::entity::item::{Item, ItemKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOpFailure {
    Dead,
    /// The avatar is not standing on that block
    NotHere,
    /// No such item here (or it was already taken)
    ItemNotFound,
    WrongKind { expected: ItemKind, found: ItemKind },
    /// Per-visit eating allowance used up
    NotHungry,
    InventoryFull,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemOpResult {
    Consumed { item: Item, life: u32 },
    PickedUp { item: Item },
    Dropped { item: Item },
    Denied(ItemOpFailure),
}

impl ItemOpResult {
    pub fn is_success(&self) -> bool {
        !matches!(self, ItemOpResult::Denied(_))
    }
}

/// Outcome of the checks shared by every item operation
enum Checked {
    Ready(Box<Actor>),
    Denied(ItemOpFailure),
}

impl Engine {
    /// Common checks: alive and standing on the block
    fn item_actor(&self, avatar_id: AvatarId, world_id: &WorldId, coord: Coord) -> Result<Checked> {
        let actor = self.load_actor(avatar_id, world_id)?;
        if actor.avatar.is_dead() {
            return Ok(Checked::Denied(ItemOpFailure::Dead));
        }
        let here = Location {
            world: world_id.clone(),
            coord,
        };
        if !actor.avatar.is_at(&here) {
            return Ok(Checked::Denied(ItemOpFailure::NotHere));
        }
        Ok(Checked::Ready(Box::new(actor)))
    }

    /// Eat a consumable lying in the avatar's block
    pub fn consume_item(&self, avatar_id: AvatarId, world_id: &WorldId, coord: Coord, item_id: ItemId) -> Result<ItemOpResult> {
        let mut actor = match self.item_actor(avatar_id, world_id, coord)? {
            Checked::Ready(actor) => *actor,
            Checked::Denied(failure) => return Ok(ItemOpResult::Denied(failure)),
        };
        let (mut block, _) = self.load_block(world_id, &actor.world, coord, None)?;
        let Some(kind) = block.find_item(item_id).map(|i| i.kind) else {
            return Ok(ItemOpResult::Denied(ItemOpFailure::ItemNotFound));
        };
        if kind != ItemKind::Consumable {
            return Ok(ItemOpResult::Denied(ItemOpFailure::WrongKind {
                expected: ItemKind::Consumable,
                found: kind,
            }));
        }
        if actor.avatar.consume_allowed == 0 {
            return Ok(ItemOpResult::Denied(ItemOpFailure::NotHungry));
        }
        let Some(item) = block.take_item(item_id) else {
            return Ok(ItemOpResult::Denied(ItemOpFailure::ItemNotFound));
        };

        let avatar = &mut actor.avatar;
        if item.affect == "life" {
            avatar.life = avatar.life.saturating_add(item.stat).min(actor.spec.life);
        } else {
            avatar.scores.bump_extra(&item.affect, u64::from(item.stat));
        }
        avatar.consume_allowed -= 1;
        avatar.scores.items_consumed += 1;

        self.queue_block(world_id, &actor.world, coord, block);
        self.save_avatar(avatar);
        self.bump(counter::ITEMS_CONSUMED)?;
        debug!(avatar = %avatar.id, item = %item.name, life = avatar.life, "item consumed");

        Ok(ItemOpResult::Consumed {
            life: avatar.life,
            item,
        })
    }

    /// Carry a raw material from the avatar's block
    pub fn pickup_item(&self, avatar_id: AvatarId, world_id: &WorldId, coord: Coord, item_id: ItemId) -> Result<ItemOpResult> {
        let mut actor = match self.item_actor(avatar_id, world_id, coord)? {
            Checked::Ready(actor) => *actor,
            Checked::Denied(failure) => return Ok(ItemOpResult::Denied(failure)),
        };
        let (mut block, _) = self.load_block(world_id, &actor.world, coord, None)?;
        let Some(kind) = block.find_item(item_id).map(|i| i.kind) else {
            return Ok(ItemOpResult::Denied(ItemOpFailure::ItemNotFound));
        };
        if kind != ItemKind::RawMaterial {
            return Ok(ItemOpResult::Denied(ItemOpFailure::WrongKind {
                expected: ItemKind::RawMaterial,
                found: kind,
            }));
        }
        if actor.avatar.inventory.len() >= self.config.meta.inventory_max {
            return Ok(ItemOpResult::Denied(ItemOpFailure::InventoryFull));
        }
        let Some(item) = block.take_item(item_id) else {
            return Ok(ItemOpResult::Denied(ItemOpFailure::ItemNotFound));
        };

        actor.avatar.inventory.push(item.clone());
        self.queue_block(world_id, &actor.world, coord, block);
        self.save_avatar(&actor.avatar);
        self.bump(counter::ITEMS_PICKED_UP)?;
        debug!(avatar = %actor.avatar.id, item = %item.name, "item picked up");

        Ok(ItemOpResult::PickedUp { item })
    }

    /// Put a carried item down in the avatar's block
    pub fn drop_item(&self, avatar_id: AvatarId, world_id: &WorldId, coord: Coord, item_id: ItemId) -> Result<ItemOpResult> {
        let mut actor = match self.item_actor(avatar_id, world_id, coord)? {
            Checked::Ready(actor) => *actor,
            Checked::Denied(failure) => return Ok(ItemOpResult::Denied(failure)),
        };
        let Some(idx) = actor.avatar.inventory.iter().position(|i| i.id == item_id) else {
            return Ok(ItemOpResult::Denied(ItemOpFailure::ItemNotFound));
        };

        let (mut block, _) = self.load_block(world_id, &actor.world, coord, None)?;
        let item = actor.avatar.inventory.remove(idx);
        block.push_item(item.clone());

        self.queue_block(world_id, &actor.world, coord, block);
        self.save_avatar(&actor.avatar);
        self.bump(counter::ITEMS_DROPPED)?;
        debug!(avatar = %actor.avatar.id, item = %item.name, "item dropped");

        Ok(ItemOpResult::Dropped { item })
    }
}
