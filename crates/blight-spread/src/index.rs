//! Set of regions holding at least one converted voxel.

use blight_core::{RegionKey, VoxelKey};
use indexmap::IndexSet;

/// Regions that contain at least one converted voxel.
///
/// Add-only during normal operation: a region never leaves the index
/// until the whole engine is reset. Written by the cycle scheduler and
/// read by the area effect scheduler.
#[derive(Clone, Debug, Default)]
pub struct InfectedRegionIndex {
    regions: IndexSet<RegionKey>,
}

impl InfectedRegionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conversion in `region`. Returns `true` on first insert.
    pub fn insert(&mut self, region: RegionKey) -> bool {
        self.regions.insert(region)
    }

    /// Whether `region` is infected.
    pub fn contains(&self, region: RegionKey) -> bool {
        self.regions.contains(&region)
    }

    /// Whether the region containing `voxel` is infected.
    pub fn contains_voxel(&self, voxel: &VoxelKey) -> bool {
        self.regions.contains(&voxel.region())
    }

    /// Number of infected regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Whether no region is infected.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Infected regions in first-infection order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionKey> {
        self.regions.iter()
    }

    /// Forget every region. Only used on reset.
    pub fn clear(&mut self) {
        self.regions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blight_core::SpaceId;

    #[test]
    fn insert_is_idempotent_and_ordered() {
        let mut idx = InfectedRegionIndex::new();
        let a = RegionKey::new(SpaceId(0), 0, 0);
        let b = RegionKey::new(SpaceId(0), -1, 3);
        assert!(idx.insert(b));
        assert!(idx.insert(a));
        assert!(!idx.insert(b));
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.iter().copied().collect::<Vec<_>>(), vec![b, a]);
        assert!(idx.contains_voxel(&VoxelKey::new(SpaceId(0), -5, 70, 50)));
        idx.clear();
        assert!(idx.is_empty());
    }
}
