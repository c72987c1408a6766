//! Scanline fill of a closed loop's interior

use std::collections::{BTreeMap, BTreeSet};

use crate::core::types::Coord;

/// Every cell on the loop's edges, closing edge included
pub fn perimeter(nodes: &[Coord]) -> BTreeSet<Coord> {
    let mut cells = BTreeSet::new();
    if nodes.is_empty() {
        return cells;
    }
    for (i, from) in nodes.iter().enumerate() {
        let to = nodes[(i + 1) % nodes.len()];
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        let mut cur = *from;
        cells.insert(cur);
        while cur != to {
            // Edges are axis-aligned; a diagonal pair steps on both axes
            cur = cur.offset(if cur.x != to.x { dx } else { 0 }, if cur.y != to.y { dy } else { 0 });
            cells.insert(cur);
        }
    }
    cells
}

/// Interior cells in row-major order.
///
/// For every row strictly inside the bounding box, the cells strictly between
/// the leftmost and rightmost perimeter cells of that row, excluding
/// perimeter cells.
pub fn interior(nodes: &[Coord]) -> Vec<Coord> {
    let edge = perimeter(nodes);
    let Some(min_y) = edge.iter().map(|c| c.y).min() else {
        return Vec::new();
    };
    let max_y = edge.iter().map(|c| c.y).max().unwrap_or(min_y);
    if max_y - min_y < 2 {
        return Vec::new();
    }

    let mut rows: BTreeMap<i64, (i64, i64)> = BTreeMap::new();
    for c in &edge {
        let span = rows.entry(c.y).or_insert((c.x, c.x));
        span.0 = span.0.min(c.x);
        span.1 = span.1.max(c.x);
    }

    let mut out = Vec::new();
    for (y, (left, right)) in rows.range(min_y + 1..max_y) {
        for x in left + 1..*right {
            let c = Coord::new(x, *y);
            if !edge.contains(&c) {
                out.push(c);
            }
        }
    }
    out
}
