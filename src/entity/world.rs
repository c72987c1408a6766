//! World records and content-addressed world identity

use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::config::WorldConfig;
use crate::core::error::{FaunaError, Result};
use crate::core::types::{Timestamp, WorldId};

/// Creation parameters; the world id is derived from these alone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldParams {
    /// Noise feature size in blocks
    pub scale: f64,
    pub seed: u64,
    /// Noise octaves
    pub lod: u32,
    /// Amplitude multiplier between octaves
    pub falloff: f64,
    /// Bitmap chunk width; the engine default applies when absent
    #[serde(default)]
    pub chunk_width: Option<u32>,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            scale: 64.0,
            seed: 0,
            lod: 4,
            falloff: 0.5,
            chunk_width: None,
        }
    }
}

impl WorldParams {
    /// Reject parameters the grid or the noise sampler cannot honour
    pub fn check(&self, limits: &WorldConfig) -> Result<()> {
        let bad = |reason: String| Err(FaunaError::InvalidWorldParams(reason));
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return bad(format!("scale {} must be finite and positive", self.scale));
        }
        if !self.falloff.is_finite() || self.falloff <= 0.0 {
            return bad(format!("falloff {} must be finite and positive", self.falloff));
        }
        if self.lod == 0 || self.lod > limits.max_lod {
            return bad(format!("lod {} must be within 1..={}", self.lod, limits.max_lod));
        }
        if let Some(width) = self.chunk_width {
            if width > limits.max_chunk_width {
                return bad(format!(
                    "chunk_width {} exceeds {}",
                    width, limits.max_chunk_width
                ));
            }
        }
        Ok(())
    }

    /// Lowercase hex SHA-256 of the canonical JSON encoding
    pub fn world_id(&self) -> Result<WorldId> {
        let canonical = serde_json::to_string(self)?;
        let digest = Sha256::digest(canonical.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Ok(WorldId::from_digest(hex))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldRecord {
    pub name: String,
    pub params: WorldParams,
    pub created_at: Timestamp,
}

impl WorldRecord {
    pub fn chunk_width(&self, default: u32) -> u32 {
        self.params.chunk_width.filter(|w| *w > 0).unwrap_or(default)
    }
}

/// Two-part world name, e.g. "Thistlehollow"
pub fn generate_world_name<R: Rng>(rng: &mut R) -> String {
    let prefixes = [
        "Thistle", "Bramble", "Willow", "Amber", "Fern", "Clover", "Heather", "Moss", "Briar", "Hazel",
    ];
    let suffixes = [
        "hollow", "meadow", "glen", "brook", "wood", "field", "dell", "reach", "mere", "heath",
    ];

    let prefix = prefixes[rng.gen_range(0..prefixes.len())];
    let suffix = suffixes[rng.gen_range(0..suffixes.len())];

    format!("{}{}", prefix, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_world_id_is_stable_and_param_sensitive() {
        let a = WorldParams { seed: 7, ..WorldParams::default() };
        let b = WorldParams { seed: 8, ..WorldParams::default() };

        let id = a.world_id().unwrap();
        assert_eq!(id.as_str().len(), WorldId::LEN);
        assert!(WorldId::parse(id.as_str()).is_ok());
        assert_eq!(id, a.clone().world_id().unwrap());
        assert_ne!(id, b.world_id().unwrap());
    }

    #[test]
    fn test_check_rejects_unusable_params() {
        let limits = WorldConfig::default();
        assert!(WorldParams::default().check(&limits).is_ok());
        assert!(WorldParams { chunk_width: Some(0), ..WorldParams::default() }.check(&limits).is_ok());

        let rejected = [
            WorldParams { chunk_width: Some(u32::MAX), ..WorldParams::default() },
            WorldParams { chunk_width: Some(60_000), ..WorldParams::default() },
            WorldParams { lod: u32::MAX, ..WorldParams::default() },
            WorldParams { lod: 0, ..WorldParams::default() },
            WorldParams { scale: f64::NAN, ..WorldParams::default() },
            WorldParams { scale: -1.0, ..WorldParams::default() },
            WorldParams { falloff: f64::INFINITY, ..WorldParams::default() },
            WorldParams { falloff: 0.0, ..WorldParams::default() },
        ];
        for params in rejected {
            assert!(
                matches!(params.check(&limits), Err(FaunaError::InvalidWorldParams(_))),
                "{:?} accepted",
                params
            );
        }
    }

    #[test]
    fn test_chunk_width_falls_back_to_default() {
        let mut record = WorldRecord {
            name: "Mossglen".into(),
            params: WorldParams::default(),
            created_at: 0,
        };
        assert_eq!(record.chunk_width(32), 32);
        record.params.chunk_width = Some(0);
        assert_eq!(record.chunk_width(32), 32);
        record.params.chunk_width = Some(8);
        assert_eq!(record.chunk_width(32), 8);
    }

    #[test]
    fn test_world_name_is_seed_deterministic() {
        let mut a = ChaCha8Rng::seed_from_u64(3);
        let mut b = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(generate_world_name(&mut a), generate_world_name(&mut b));
    }
}
