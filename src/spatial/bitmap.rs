//! Chunked presence bitmaps
//!
//! One bit per coordinate per category, grouped into square chunks of
//! `width x width` bits. A bounding-box query reads each overlapped chunk's
//! raw buffer once instead of probing individual coordinates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::types::Coord;

/// Categories tracked by the presence index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Inventory holds anything at all
    Occupied,
    Note,
    Item,
    Tombstone,
    Nest,
    Gardenspace,
    /// Any permanent structure
    Permanent,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Occupied,
        Category::Note,
        Category::Item,
        Category::Tombstone,
        Category::Nest,
        Category::Gardenspace,
        Category::Permanent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Occupied => "occupied",
            Category::Note => "note",
            Category::Item => "item",
            Category::Tombstone => "tombstone",
            Category::Nest => "nest",
            Category::Gardenspace => "gardenspace",
            Category::Permanent => "permanent",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown category {:?}", s))
    }
}

/// Chunk index in chunk units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub cx: i64,
    pub cy: i64,
}

impl ChunkCoord {
    /// Chunk holding `coord` and the bit offset of `coord` inside it
    pub fn locate(coord: Coord, width: u32) -> (ChunkCoord, u64) {
        let w = i64::from(width);
        let chunk = ChunkCoord {
            cx: coord.x.div_euclid(w),
            cy: coord.y.div_euclid(w),
        };
        // Both remainders are below `width`, so the product fits in u64
        let lx = coord.x.rem_euclid(w) as u64;
        let ly = coord.y.rem_euclid(w) as u64;
        (chunk, ly * u64::from(width) + lx)
    }

    /// World coordinate of this chunk's (0, 0) cell
    pub fn origin(&self, width: u32) -> Coord {
        let w = i64::from(width);
        Coord::new(self.cx.saturating_mul(w), self.cy.saturating_mul(w))
    }

    /// Every chunk overlapping the inclusive box spanned by `a` and `b`
    pub fn covering(a: Coord, b: Coord, width: u32) -> Vec<ChunkCoord> {
        let (min, max) = normalize_box(a, b);
        let (lo, _) = ChunkCoord::locate(min, width);
        let (hi, _) = ChunkCoord::locate(max, width);
        let mut chunks = Vec::new();
        for cy in lo.cy..=hi.cy {
            for cx in lo.cx..=hi.cx {
                chunks.push(ChunkCoord { cx, cy });
            }
        }
        chunks
    }
}

/// Order the corners of a box as (min, max)
pub fn normalize_box(a: Coord, b: Coord) -> (Coord, Coord) {
    (
        Coord::new(a.x.min(b.x), a.y.min(b.y)),
        Coord::new(a.x.max(b.x), a.y.max(b.y)),
    )
}

/// Inclusive area of a box in blocks
pub fn box_area(a: Coord, b: Coord) -> u64 {
    let (min, max) = normalize_box(a, b);
    (min.x.abs_diff(max.x) + 1).saturating_mul(min.y.abs_diff(max.y) + 1)
}

/// Extract the coordinates of every set bit in a raw chunk buffer
pub fn decode_chunk(chunk: ChunkCoord, width: u32, buf: &[u8]) -> Vec<Coord> {
    let w = u64::from(width);
    let cells = w * w;
    let origin = chunk.origin(width);
    let mut out = Vec::new();

    for (byte_idx, byte) in buf.iter().enumerate() {
        if *byte == 0 {
            continue;
        }
        for bit in 0..8u64 {
            if byte & (0x80 >> bit) == 0 {
                continue;
            }
            let offset = byte_idx as u64 * 8 + bit;
            if offset >= cells {
                break;
            }
            let lx = (offset % w) as i64;
            let ly = (offset / w) as i64;
            out.push(origin.offset(lx, ly));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_handles_negative_coordinates() {
        let (chunk, offset) = ChunkCoord::locate(Coord::new(-1, -1), 8);
        assert_eq!(chunk, ChunkCoord { cx: -1, cy: -1 });
        assert_eq!(offset, 7 * 8 + 7);

        let (chunk, offset) = ChunkCoord::locate(Coord::new(9, 2), 8);
        assert_eq!(chunk, ChunkCoord { cx: 1, cy: 0 });
        assert_eq!(offset, 2 * 8 + 1);
    }

    #[test]
    fn test_locate_extremes_stay_in_chunk() {
        for width in [1, 1000, u32::MAX] {
            for coord in [Coord::new(i64::MIN, i64::MAX), Coord::new(i64::MAX, i64::MIN)] {
                let (_, offset) = ChunkCoord::locate(coord, width);
                assert!(offset < u64::from(width) * u64::from(width));
            }
        }
    }

    #[test]
    fn test_covering_spans_all_overlapped_chunks() {
        let chunks = ChunkCoord::covering(Coord::new(5, 5), Coord::new(-3, 12), 8);
        // x: -3..=5 -> chunks -1, 0; y: 5..=12 -> chunks 0, 1
        assert_eq!(chunks.len(), 4);
        assert!(chunks.contains(&ChunkCoord { cx: -1, cy: 1 }));
    }

    #[test]
    fn test_decode_chunk() {
        // Bits 0 and 9 set in an 8-wide chunk at (1, -1)
        let buf = [0x80, 0x40];
        let coords = decode_chunk(ChunkCoord { cx: 1, cy: -1 }, 8, &buf);
        assert_eq!(coords, vec![Coord::new(8, -8), Coord::new(9, -7)]);
    }

    #[test]
    fn test_box_area() {
        assert_eq!(box_area(Coord::new(0, 0), Coord::new(0, 0)), 1);
        assert_eq!(box_area(Coord::new(2, 2), Coord::new(-1, 0)), 12);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("nest".parse::<Category>(), Ok(Category::Nest));
        assert!("castle".parse::<Category>().is_err());
    }

    proptest::proptest! {
        #[test]
        fn prop_locate_then_decode_finds_coord(x in -5000i64..5000, y in -5000i64..5000, width in 1u32..64) {
            let coord = Coord::new(x, y);
            let (chunk, offset) = ChunkCoord::locate(coord, width);
            proptest::prop_assert!(offset < u64::from(width) * u64::from(width));

            let mut buf = vec![0u8; (offset / 8 + 1) as usize];
            buf[(offset / 8) as usize] |= 0x80 >> (offset % 8);
            proptest::prop_assert_eq!(decode_chunk(chunk, width, &buf), vec![coord]);
        }
    }
}
