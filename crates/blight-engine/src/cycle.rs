//! The bounded spread cycle.
//!
//! [`SpreadCycleScheduler`] owns the frontier, region residency, and the
//! infected region index. Each cycle pops voxels in FIFO order, makes
//! sure their regions are resident, and tries to convert each of their
//! six neighbours, stopping the instant the conversion budget is spent.
//!
//! # Budget
//!
//! The budget bounds *conversions*, not pops or pushes. A cycle may pop
//! many voxels whose neighbours are all already converted (cheap no-ops)
//! without spending budget. Pops are capped at
//! [`DEQUEUE_CEILING_FACTOR`] times the budget, so a wavefront crossing
//! unconvertible space (air, excluded blocks) still ends its cycle.
//!
//! # Failures
//!
//! Every per-cell failure is contained inside the loop:
//!
//! - A region that will not load drops that one voxel's expansion for
//!   good. The voxel has already left the frontier and is only revisited
//!   if a later conversion rediscovers it as a neighbour.
//! - A rejected write counts as "already converted".
//! - A voxel whose space has been removed is dropped silently.

use std::time::Instant;

use blight_core::{RegionKey, RegionLoader, TickId, VoxelAccessor, VoxelKey};
use blight_spread::{
    Conversion, ConversionPolicy, InfectedRegionIndex, LoadOutcome, RegionLifecycleManager,
    SpreadFrontier,
};

use crate::config::{clamp_budget, clamp_interval, SpreadConfig, DEQUEUE_CEILING_FACTOR};
use crate::metrics::CycleMetrics;

/// Owns all spread state and runs the conversion cycle on its interval.
#[derive(Debug)]
pub struct SpreadCycleScheduler {
    frontier: SpreadFrontier,
    residency: RegionLifecycleManager,
    infected: InfectedRegionIndex,
    policy: ConversionPolicy,
    enabled: bool,
    budget: u32,
    interval_ticks: u32,
    /// `None` after an interval change: re-phase on the next poll.
    next_due: Option<TickId>,
}

impl SpreadCycleScheduler {
    /// Build a scheduler from (sanitized) configuration.
    pub fn new(config: &SpreadConfig) -> Self {
        let config = config.clone().sanitized();
        Self {
            frontier: SpreadFrontier::new(),
            residency: RegionLifecycleManager::new(config.release_grace_ticks),
            infected: InfectedRegionIndex::new(),
            policy: config.policy,
            enabled: config.enabled,
            budget: config.budget,
            interval_ticks: config.cycle_interval_ticks,
            next_due: Some(TickId(0)),
        }
    }

    /// Add a seed voxel to the frontier.
    ///
    /// Returns `false` if the voxel was ever enqueued before, lies outside
    /// its space's vertical extent, or its space no longer exists.
    pub fn seed(&mut self, voxel: VoxelKey, voxels: &dyn VoxelAccessor) -> bool {
        match voxels.extent(voxel.space) {
            Some(extent) if extent.contains(voxel.y) => {}
            _ => return false,
        }
        if !self.frontier.enqueue(voxel) {
            return false;
        }
        self.residency.note_work_arrived(voxel.region());
        true
    }

    /// Run a cycle if one is due at `now`.
    pub fn poll(
        &mut self,
        now: TickId,
        loader: &mut dyn RegionLoader,
        voxels: &mut dyn VoxelAccessor,
    ) -> Option<CycleMetrics> {
        let interval = u64::from(self.interval_ticks);
        let due = *self.next_due.get_or_insert(now.after(interval));
        if now < due {
            return None;
        }
        self.next_due = Some(now.after(interval));
        Some(self.run_cycle(now, loader, voxels))
    }

    /// Run one cycle unconditionally.
    ///
    /// When disabled, only housekeeping runs.
    pub fn run_cycle(
        &mut self,
        now: TickId,
        loader: &mut dyn RegionLoader,
        voxels: &mut dyn VoxelAccessor,
    ) -> CycleMetrics {
        let start = Instant::now();
        let mut m = CycleMetrics::default();

        if self.enabled {
            m.ran_body = true;
            self.drain(now, loader, voxels, &mut m);
        }

        let housekeeping = self.residency.run_housekeeping(now, &self.frontier, loader);
        m.regions_released = housekeeping.released;
        m.regions_forgotten = housekeeping.forgotten;
        m.elapsed_us = start.elapsed().as_micros() as u64;

        if m.converted > 0 || m.regions_released > 0 {
            log::debug!(
                "cycle at tick {now}: converted {}/{}, frontier {}, released {}",
                m.converted,
                self.budget,
                self.frontier.len(),
                m.regions_released,
            );
        }
        m
    }

    fn drain(
        &mut self,
        now: TickId,
        loader: &mut dyn RegionLoader,
        voxels: &mut dyn VoxelAccessor,
        m: &mut CycleMetrics,
    ) {
        let ceiling = self.budget.saturating_mul(DEQUEUE_CEILING_FACTOR);
        while m.converted < self.budget && m.dequeued < ceiling {
            let Some(cell) = self.frontier.dequeue() else {
                break;
            };
            m.dequeued += 1;
            let region = cell.region();
            if self.frontier.settle(region) {
                self.residency.note_work_drained(region, now);
            }

            let Some(extent) = voxels.extent(cell.space) else {
                log::debug!("dropping {cell}: space {} removed", cell.space);
                m.dropped_space_removed += 1;
                continue;
            };
            if !self.ensure_loaded(region, now, loader, m) {
                m.skipped_unavailable += 1;
                continue;
            }

            for next in cell.neighbours() {
                if m.converted >= self.budget {
                    break;
                }
                if !extent.contains(next.y) {
                    continue;
                }
                let next_region = next.region();
                if next_region != region && !self.ensure_loaded(next_region, now, loader, m) {
                    continue;
                }
                if self.frontier.enqueue(next) {
                    m.enqueued += 1;
                    self.residency.note_work_arrived(next_region);
                }
                match self.policy.try_convert(voxels, next) {
                    Conversion::Converted => {
                        m.converted += 1;
                        self.infected.insert(next_region);
                    }
                    Conversion::WriteRejected => m.write_rejected += 1,
                    _ => {}
                }
            }
        }
    }

    fn ensure_loaded(
        &mut self,
        region: RegionKey,
        now: TickId,
        loader: &mut dyn RegionLoader,
        m: &mut CycleMetrics,
    ) -> bool {
        let pending = self.frontier.pending(region);
        match self.residency.ensure_loaded(region, pending, now, loader) {
            LoadOutcome::Loaded => {
                m.regions_loaded += 1;
                true
            }
            LoadOutcome::AlreadyResident => true,
            LoadOutcome::Unavailable(_) => false,
        }
    }

    /// Release every region the engine holds and discard all spread state.
    ///
    /// Configuration (budget, interval, policy, enable flag) is kept.
    /// Returns how many regions were released.
    pub fn reset(&mut self, loader: &mut dyn RegionLoader) -> usize {
        let released = self.residency.release_all(loader);
        self.frontier.clear();
        self.infected.clear();
        self.next_due = Some(TickId(0));
        released
    }

    /// Turn the cycle body on or off. Housekeeping runs regardless.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Change the per-cycle budget, clamped to the valid range.
    pub fn set_budget(&mut self, budget: u32) {
        self.budget = clamp_budget(budget);
    }

    /// Change the cycle interval. The next cycle fires one new interval
    /// after the next poll.
    pub fn set_interval(&mut self, ticks: u32) {
        self.interval_ticks = clamp_interval("cycle interval", ticks);
        self.next_due = None;
    }

    /// Change the release grace period for deadlines set from now on.
    pub fn set_release_grace(&mut self, ticks: u64) {
        self.residency.set_grace_ticks(ticks);
    }

    /// Whether the cycle body is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Current per-cycle budget.
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Current cycle interval in ticks.
    pub fn interval_ticks(&self) -> u32 {
        self.interval_ticks
    }

    /// The conversion policy.
    pub fn policy(&self) -> &ConversionPolicy {
        &self.policy
    }

    /// The wavefront.
    pub fn frontier(&self) -> &SpreadFrontier {
        &self.frontier
    }

    /// Region residency bookkeeping.
    pub fn residency(&self) -> &RegionLifecycleManager {
        &self.residency
    }

    /// Regions holding at least one converted voxel.
    pub fn infected(&self) -> &InfectedRegionIndex {
        &self.infected
    }
}
