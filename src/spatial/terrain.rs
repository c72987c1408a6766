//! Terrain classification from the noise sample

use serde::{Deserialize, Serialize};

/// One row of the threshold table: samples at or below `below` get `name`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainBand {
    pub below: f64,
    pub name: String,
}

/// Ordered terrain thresholds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<TerrainBand>", into = "Vec<TerrainBand>")]
pub struct TerrainTable {
    bands: Vec<TerrainBand>,
}

impl TerrainTable {
    pub fn new(mut bands: Vec<TerrainBand>) -> Self {
        bands.sort_by(|a, b| a.below.total_cmp(&b.below));
        Self { bands }
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.name.as_str())
    }

    /// First band whose threshold is >= `n`; samples past the table get the last band
    pub fn classify(&self, n: f64) -> Option<&str> {
        self.bands
            .iter()
            .find(|b| b.below >= n)
            .or_else(|| self.bands.last())
            .map(|b| b.name.as_str())
    }
}

impl From<Vec<TerrainBand>> for TerrainTable {
    fn from(bands: Vec<TerrainBand>) -> Self {
        Self::new(bands)
    }
}

impl From<TerrainTable> for Vec<TerrainBand> {
    fn from(table: TerrainTable) -> Self {
        table.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TerrainTable {
        TerrainTable::new(vec![
            TerrainBand { below: 0.6, name: "forest".into() },
            TerrainBand { below: 0.2, name: "water".into() },
            TerrainBand { below: 1.0, name: "peak".into() },
        ])
    }

    #[test]
    fn test_classify_uses_sorted_thresholds() {
        let t = table();
        assert_eq!(t.classify(0.0), Some("water"));
        assert_eq!(t.classify(0.2), Some("water"));
        assert_eq!(t.classify(0.21), Some("forest"));
        assert_eq!(t.classify(0.99), Some("peak"));
    }

    #[test]
    fn test_classify_past_table_uses_last_band() {
        assert_eq!(table().classify(1.5), Some("peak"));
        assert_eq!(TerrainTable::default().classify(0.5), None);
    }
}
