//! Region residency bookkeeping.
//!
//! Regions are an expensive external resource: they have to be paged in
//! before any voxel in them can be read or written. The engine loads them
//! on demand and releases only the ones it loaded itself, once they have
//! had no pending frontier work for a full grace period. The grace period
//! absorbs a wavefront that leaves a region and comes straight back.

use blight_core::{RegionKey, RegionLoader, SpreadError, TickId};
use indexmap::{IndexMap, IndexSet};

use crate::frontier::SpreadFrontier;

/// Result of [`RegionLifecycleManager::ensure_loaded`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Already resident, by any means. Nothing was done.
    AlreadyResident,
    /// The engine loaded it during this call.
    Loaded,
    /// The load failed; work in this region must be skipped this cycle.
    Unavailable(SpreadError),
}

impl LoadOutcome {
    /// Whether voxels in the region may now be accessed.
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Unavailable(_))
    }
}

/// Counts from one [`RegionLifecycleManager::run_housekeeping`] pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HousekeepingOutcome {
    /// Regions handed back to the loader.
    pub released: u32,
    /// Regions dropped from bookkeeping because they were no longer
    /// resident (evicted elsewhere, or their space was removed).
    pub forgotten: u32,
}

/// Tracks which regions the engine made resident and when each becomes
/// eligible for release.
///
/// A region has a release deadline only while it is engine-loaded and
/// has zero pending frontier work. New work cancels the deadline.
#[derive(Debug)]
pub struct RegionLifecycleManager {
    loaded_by_engine: IndexSet<RegionKey>,
    release_at: IndexMap<RegionKey, TickId>,
    grace_ticks: u64,
}

impl RegionLifecycleManager {
    /// Create a manager with the given release grace period.
    pub fn new(grace_ticks: u64) -> Self {
        Self {
            loaded_by_engine: IndexSet::new(),
            release_at: IndexMap::new(),
            grace_ticks,
        }
    }

    /// Make `region` resident if it is not already.
    ///
    /// `pending` is the region's current frontier work. A region loaded
    /// while it has none is scheduled for release straight away, so a
    /// region paged in only to touch an already-seen neighbour still
    /// gets handed back.
    ///
    /// Load failures are logged and reported as
    /// [`LoadOutcome::Unavailable`]; they are never retried here.
    pub fn ensure_loaded(
        &mut self,
        region: RegionKey,
        pending: u32,
        now: TickId,
        loader: &mut dyn RegionLoader,
    ) -> LoadOutcome {
        if loader.is_resident(region) {
            return LoadOutcome::AlreadyResident;
        }
        match loader.load(region) {
            Ok(()) => {
                log::debug!("loaded region {region}");
                self.loaded_by_engine.insert(region);
                if pending == 0 {
                    self.release_at.insert(region, now.after(self.grace_ticks));
                }
                LoadOutcome::Loaded
            }
            Err(err @ SpreadError::SpaceRemoved { .. }) => {
                log::debug!("skipping region {region}: {err}");
                self.forget(region);
                LoadOutcome::Unavailable(err)
            }
            Err(err) => {
                log::warn!("failed to load region {region}: {err}");
                LoadOutcome::Unavailable(err)
            }
        }
    }

    /// The region's pending work reached zero.
    ///
    /// Schedules release after the grace period if the engine loaded it;
    /// regions resident for other reasons are not ours to release.
    pub fn note_work_drained(&mut self, region: RegionKey, now: TickId) {
        if self.loaded_by_engine.contains(&region) {
            self.release_at.insert(region, now.after(self.grace_ticks));
        }
    }

    /// New frontier work arrived for the region: cancel any pending release.
    pub fn note_work_arrived(&mut self, region: RegionKey) {
        self.release_at.swap_remove(&region);
    }

    /// Release every region whose deadline has passed, whose pending work
    /// is still zero, and which is still resident.
    ///
    /// Regions no longer resident are dropped from bookkeeping without a
    /// `release` call. A due entry whose region has picked up work again
    /// loses its deadline; the next drain reschedules it.
    pub fn run_housekeeping(
        &mut self,
        now: TickId,
        frontier: &SpreadFrontier,
        loader: &mut dyn RegionLoader,
    ) -> HousekeepingOutcome {
        let mut outcome = HousekeepingOutcome::default();
        let loaded = &mut self.loaded_by_engine;
        self.release_at.retain(|region, deadline| {
            if *deadline > now {
                return true;
            }
            if frontier.pending(*region) > 0 {
                return false;
            }
            if loader.is_resident(*region) {
                loader.release(*region);
                log::debug!("released region {region}");
                outcome.released += 1;
            } else {
                outcome.forgotten += 1;
            }
            loaded.swap_remove(region);
            false
        });
        outcome
    }

    /// Release every still-resident region the engine loaded and clear
    /// all bookkeeping. Returns how many regions were released.
    pub fn release_all(&mut self, loader: &mut dyn RegionLoader) -> usize {
        let mut released = 0;
        for region in self.loaded_by_engine.drain(..) {
            if loader.is_resident(region) {
                loader.release(region);
                released += 1;
            }
        }
        self.release_at.clear();
        released
    }

    /// Whether the engine itself made `region` resident.
    pub fn is_engine_loaded(&self, region: RegionKey) -> bool {
        self.loaded_by_engine.contains(&region)
    }

    /// Number of regions the engine currently holds.
    pub fn engine_loaded_count(&self) -> usize {
        self.loaded_by_engine.len()
    }

    /// Scheduled release tick for `region`, if any.
    pub fn release_deadline(&self, region: RegionKey) -> Option<TickId> {
        self.release_at.get(&region).copied()
    }

    /// Number of regions with a scheduled release.
    pub fn scheduled_count(&self) -> usize {
        self.release_at.len()
    }

    /// The release grace period in ticks.
    pub fn grace_ticks(&self) -> u64 {
        self.grace_ticks
    }

    /// Change the grace period. Applies to deadlines set from now on.
    pub fn set_grace_ticks(&mut self, grace_ticks: u64) {
        self.grace_ticks = grace_ticks;
    }

    fn forget(&mut self, region: RegionKey) {
        self.loaded_by_engine.swap_remove(&region);
        self.release_at.swap_remove(&region);
    }
}
