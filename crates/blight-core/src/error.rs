//! Error types for per-cell and per-region failures.
//!
//! None of these are fatal: the cycle loop contains every one of them
//! and degrades throughput for the affected cell or region only.

use std::error::Error;
use std::fmt;

use crate::id::{RegionKey, SpaceId, VoxelKey};

/// Failures reported by collaborators while the engine works a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SpreadError {
    /// A region could not be made resident. The cell whose expansion
    /// needed it is skipped for this cycle and not retried.
    ResourceUnavailable {
        /// Region that failed to load.
        region: RegionKey,
        /// Host-supplied description of the failure.
        reason: String,
    },
    /// A voxel write is structurally impossible. Treated exactly like
    /// "already in the target state".
    WriteRejected {
        /// Voxel whose write was refused.
        voxel: VoxelKey,
    },
    /// The owning space no longer exists. Queued cells in it are dropped.
    SpaceRemoved {
        /// The missing space.
        space: SpaceId,
    },
}

impl fmt::Display for SpreadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResourceUnavailable { region, reason } => {
                write!(f, "region {region} unavailable: {reason}")
            }
            Self::WriteRejected { voxel } => write!(f, "write to {voxel} rejected"),
            Self::SpaceRemoved { space } => write!(f, "space {space} no longer exists"),
        }
    }
}

impl Error for SpreadError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_key() {
        let err = SpreadError::ResourceUnavailable {
            region: RegionKey::new(SpaceId(1), 2, -3),
            reason: "disk busy".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("1:[2, -3]"));
        assert!(msg.contains("disk busy"));

        let err = SpreadError::SpaceRemoved { space: SpaceId(9) };
        assert_eq!(err.to_string(), "space 9 no longer exists");
    }
}
