//! Loop search over nest-bearing blocks
//!
//! Explicit-stack DFS. Each frame owns its path and visited set, cloned when
//! the search branches, so sibling branches never see each other's state.

use std::collections::BTreeSet;
use tracing::debug;

use crate::core::error::Result;
use crate::core::types::{AvatarId, Coord};
use crate::gardenspace::{Direction, NestMap};

/// Shortest loop that can enclose anything
pub const MIN_LOOP_NODES: usize = 4;

#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    /// Furthest a ray looks for the next nest
    pub max_edge_length: u32,
    /// Frames expanded before giving up
    pub max_nodes: usize,
}

struct Frame {
    node: Coord,
    path: Vec<Coord>,
    visited: BTreeSet<Coord>,
}

/// Closed loop of same-owner nests through `origin`, if one exists.
///
/// Returned nodes start at `origin` and follow the loop; the closing edge back
/// to `origin` is implied.
pub fn find_loop<M: NestMap + ?Sized>(
    map: &M,
    origin: Coord,
    owner: AvatarId,
    limits: SearchLimits,
) -> Result<Option<Vec<Coord>>> {
    let mut stack = vec![Frame {
        node: origin,
        path: vec![origin],
        visited: BTreeSet::from([origin]),
    }];
    let mut expanded = 0usize;

    while let Some(frame) = stack.pop() {
        expanded += 1;
        if expanded > limits.max_nodes {
            debug!(%origin, expanded, "gardenspace search budget exhausted");
            return Ok(None);
        }

        // Pushed in reverse so the first direction is explored first
        for dir in Direction::ALL.iter().rev() {
            let Some(next) = map.nearest_nest(frame.node, *dir, limits.max_edge_length)? else {
                continue;
            };
            let owners = map.owners(next)?;
            if owners.nest != Some(owner) {
                continue;
            }
            if owners.gardenspace.is_some_and(|g| g != owner) {
                continue;
            }

            if next == origin {
                if frame.path.len() >= MIN_LOOP_NODES {
                    debug!(%origin, nodes = frame.path.len(), expanded, "gardenspace loop closed");
                    return Ok(Some(frame.path));
                }
                continue;
            }
            if frame.visited.contains(&next) {
                continue;
            }

            let mut path = frame.path.clone();
            path.push(next);
            let mut visited = frame.visited.clone();
            visited.insert(next);
            stack.push(Frame {
                node: next,
                path,
                visited,
            });
        }
    }

    Ok(None)
}
