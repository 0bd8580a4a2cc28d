//! Nearest-neighbor identity resolution
//!
//! Computes the Euclidean distance from the probe to every candidate
//! template and selects the global minimum. Accepting the first
//! candidate under threshold would make the result depend on candidate
//! order, so it is deliberately not done here.

use types::embedding::Embedding;
use types::errors::MatchError;
use types::identity::Identity;

/// Default distance threshold, calibrated against unnormalized Facenet
/// embeddings. Deployment-specific; override via configuration.
pub const DEFAULT_THRESHOLD: f32 = 10.0;

/// Result of resolving a probe against the enrolled set
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The nearest candidate, strictly within threshold
    Match(Identity),
    /// No candidate within threshold
    NoMatch,
}

/// Identity resolution engine
///
/// Purely computational and side-effect free; safe to call concurrently
/// against a stable candidate snapshot.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    threshold: f32,
}

impl MatchEngine {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Resolve a probe to the nearest enrolled identity
    ///
    /// Returns the candidate with the globally minimal distance when
    /// that distance is strictly below the threshold. Equidistant
    /// candidates resolve to the lexicographically smallest id, so the
    /// result is independent of candidate order. A dimensionality
    /// mismatch anywhere in the candidate set is an error.
    pub fn resolve(
        &self,
        probe: &Embedding,
        candidates: &[Identity],
    ) -> Result<Resolution, MatchError> {
        let mut best: Option<(f32, &Identity)> = None;

        for candidate in candidates {
            let dist = probe.distance(&candidate.template).map_err(MatchError::from)?;
            best = match best {
                None => Some((dist, candidate)),
                Some((best_dist, best_candidate)) => {
                    if dist < best_dist || (dist == best_dist && candidate.id < best_candidate.id)
                    {
                        Some((dist, candidate))
                    } else {
                        Some((best_dist, best_candidate))
                    }
                }
            };
        }

        match best {
            Some((dist, candidate)) if dist < self.threshold => {
                Ok(Resolution::Match(candidate.clone()))
            }
            _ => Ok(Resolution::NoMatch),
        }
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}
