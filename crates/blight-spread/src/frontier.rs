//! The spread wavefront.
//!
//! [`SpreadFrontier`] holds the voxels awaiting evaluation in FIFO order,
//! which makes the spread breadth-first: a voxel closer to a seed is
//! always evaluated before one farther away.
//!
//! # Unbounded `seen`
//!
//! Every voxel ever enqueued stays in the dedup set for the lifetime of
//! the frontier (until [`clear`](SpreadFrontier::clear)). Memory therefore
//! grows with the number of distinct voxels the spread has touched. This
//! is intentional: pruning would let a voxel that was processed and later
//! reverted by someone else be re-enqueued and re-infected, which changes
//! spread semantics.

use std::collections::{HashSet, VecDeque};

use blight_core::{RegionKey, VoxelKey};
use indexmap::IndexMap;

/// FIFO wavefront with lifetime dedup and per-region pending counts.
///
/// # Invariant
///
/// Between dequeues, the sum of all pending counts equals [`len`](Self::len).
/// [`dequeue`](Self::dequeue) pops without touching the counts; the caller
/// must follow every pop with exactly one [`settle`](Self::settle) for the
/// popped voxel's region before doing anything else with the frontier.
#[derive(Debug, Default)]
pub struct SpreadFrontier {
    queue: VecDeque<VoxelKey>,
    seen: HashSet<VoxelKey>,
    pending_by_region: IndexMap<RegionKey, u32>,
}

impl SpreadFrontier {
    /// Create an empty frontier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `voxel` unless it has ever been enqueued before.
    ///
    /// Returns `false` and leaves the frontier untouched for repeats.
    pub fn enqueue(&mut self, voxel: VoxelKey) -> bool {
        if !self.seen.insert(voxel) {
            return false;
        }
        self.queue.push_back(voxel);
        *self.pending_by_region.entry(voxel.region()).or_insert(0) += 1;
        true
    }

    /// Pop the oldest queued voxel.
    ///
    /// Does not decrement the pending count; see [`settle`](Self::settle).
    pub fn dequeue(&mut self) -> Option<VoxelKey> {
        self.queue.pop_front()
    }

    /// Account for one popped voxel in `region`.
    ///
    /// Returns `true` when this drained the region's pending work to zero
    /// (the region is then removed from the map).
    ///
    /// # Panics
    ///
    /// Debug builds panic if `region` has no pending work, which means a
    /// settle without a matching dequeue.
    pub fn settle(&mut self, region: RegionKey) -> bool {
        let Some(count) = self.pending_by_region.get_mut(&region) else {
            debug_assert!(false, "settle for region {region} with no pending work");
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.pending_by_region.swap_remove(&region);
            true
        } else {
            false
        }
    }

    /// Number of queued voxels.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Queued voxels belonging to `region`.
    pub fn pending(&self, region: RegionKey) -> u32 {
        self.pending_by_region.get(&region).copied().unwrap_or(0)
    }

    /// Sum of all per-region pending counts.
    pub fn pending_total(&self) -> usize {
        self.pending_by_region.values().map(|&c| c as usize).sum()
    }

    /// Regions with queued work, in first-reference order.
    pub fn pending_regions(&self) -> impl Iterator<Item = (RegionKey, u32)> + '_ {
        self.pending_by_region.iter().map(|(r, c)| (*r, *c))
    }

    /// Whether `voxel` has ever been enqueued.
    pub fn has_seen(&self, voxel: &VoxelKey) -> bool {
        self.seen.contains(voxel)
    }

    /// Number of distinct voxels ever enqueued.
    pub fn seen_len(&self) -> usize {
        self.seen.len()
    }

    /// Discard all state, including the dedup set.
    pub fn clear(&mut self) {
        self.queue.clear();
        self.seen.clear();
        self.pending_by_region.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blight_core::SpaceId;

    const S: SpaceId = SpaceId(0);

    fn v(x: i32, y: i32, z: i32) -> VoxelKey {
        VoxelKey::new(S, x, y, z)
    }

    #[test]
    fn enqueue_dedups_for_lifetime() {
        let mut f = SpreadFrontier::new();
        assert!(f.enqueue(v(0, 0, 0)));
        assert!(!f.enqueue(v(0, 0, 0)));
        assert_eq!(f.len(), 1);

        let k = f.dequeue().unwrap();
        f.settle(k.region());
        assert!(f.is_empty());
        // Still seen after leaving the queue.
        assert!(!f.enqueue(v(0, 0, 0)));
        assert!(f.has_seen(&v(0, 0, 0)));
        assert_eq!(f.seen_len(), 1);
    }

    #[test]
    fn dequeue_is_fifo() {
        let mut f = SpreadFrontier::new();
        for x in 0..5 {
            f.enqueue(v(x * 20, 0, 0));
        }
        let mut order = Vec::new();
        while let Some(k) = f.dequeue() {
            f.settle(k.region());
            order.push(k.x);
        }
        assert_eq!(order, vec![0, 20, 40, 60, 80]);
    }

    #[test]
    fn pending_counts_track_regions() {
        let mut f = SpreadFrontier::new();
        f.enqueue(v(0, 0, 0));
        f.enqueue(v(1, 5, 1));
        f.enqueue(v(16, 0, 0));
        let r0 = v(0, 0, 0).region();
        let r1 = v(16, 0, 0).region();
        assert_eq!(f.pending(r0), 2);
        assert_eq!(f.pending(r1), 1);
        assert_eq!(f.pending_total(), f.len());

        let k = f.dequeue().unwrap();
        assert!(!f.settle(k.region()));
        assert_eq!(f.pending(r0), 1);

        let k = f.dequeue().unwrap();
        assert!(f.settle(k.region()), "second r0 pop drains it");
        assert_eq!(f.pending(r0), 0);
        assert_eq!(f.pending_regions().count(), 1);
        assert_eq!(f.pending_total(), f.len());
    }

    #[test]
    fn clear_forgets_seen() {
        let mut f = SpreadFrontier::new();
        f.enqueue(v(0, 0, 0));
        f.clear();
        assert!(f.is_empty());
        assert_eq!(f.pending_total(), 0);
        assert!(f.enqueue(v(0, 0, 0)));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn pending_total_matches_len(
                ops in proptest::collection::vec((any::<bool>(), -40i32..40, -40i32..40), 1..200),
            ) {
                let mut f = SpreadFrontier::new();
                for (push, x, z) in ops {
                    if push {
                        f.enqueue(v(x, 0, z));
                    } else if let Some(k) = f.dequeue() {
                        f.settle(k.region());
                    }
                    prop_assert_eq!(f.pending_total(), f.len());
                }
            }

            #[test]
            fn enqueue_succeeds_once_per_key(
                keys in proptest::collection::vec((-8i32..8, -8i32..8, -8i32..8), 1..100),
            ) {
                let mut f = SpreadFrontier::new();
                let mut accepted = std::collections::HashSet::new();
                for (x, y, z) in keys {
                    let k = v(x, y, z);
                    let before = f.len();
                    let ok = f.enqueue(k);
                    prop_assert_eq!(ok, accepted.insert(k));
                    prop_assert_eq!(f.len(), before + usize::from(ok));
                }
            }
        }
    }
}
