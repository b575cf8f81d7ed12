//! Per-cycle and cumulative metrics for the spread engine.
//!
//! [`CycleMetrics`] captures what one cycle did; [`EngineStats`] folds
//! them into lifetime totals for telemetry.

/// Counts collected during a single spread cycle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CycleMetrics {
    /// Whether the cycle body ran (false while the engine is disabled;
    /// housekeeping runs either way).
    pub ran_body: bool,
    /// Voxels popped from the frontier.
    pub dequeued: u32,
    /// Neighbours newly added to the frontier.
    pub enqueued: u32,
    /// Successful conversions. Never exceeds the cycle's budget.
    pub converted: u32,
    /// Conversions refused by the voxel accessor.
    pub write_rejected: u32,
    /// Dequeued voxels whose region could not be loaded.
    pub skipped_unavailable: u32,
    /// Dequeued voxels whose space no longer exists.
    pub dropped_space_removed: u32,
    /// Regions the engine loaded this cycle.
    pub regions_loaded: u32,
    /// Engine-loaded regions released by housekeeping.
    pub regions_released: u32,
    /// Engine-loaded regions forgotten because they were no longer resident.
    pub regions_forgotten: u32,
    /// Wall-clock time for the cycle, in microseconds.
    pub elapsed_us: u64,
}

/// Counts collected during a single area effect pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectMetrics {
    /// Actors examined.
    pub actors_scanned: u32,
    /// Effects handed to the applier.
    pub effects_applied: u32,
}

/// Lifetime totals, reset only by a world reset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Cycles executed, including disabled ones.
    pub cycles: u64,
    /// Effect passes executed.
    pub effect_passes: u64,
    /// Total successful conversions.
    pub converted: u64,
    /// Total frontier pops.
    pub dequeued: u64,
    /// Total dequeued voxels skipped because their region was unavailable.
    pub skipped_unavailable: u64,
    /// Total conversions refused by the voxel accessor.
    pub write_rejected: u64,
    /// Total dequeued voxels dropped because their space was removed.
    pub dropped_space_removed: u64,
    /// Total regions loaded by the engine.
    pub regions_loaded: u64,
    /// Total regions released by the engine.
    pub regions_released: u64,
    /// Total engine-loaded regions forgotten after leaving residency.
    pub regions_forgotten: u64,
    /// Total effects applied.
    pub effects_applied: u64,
    /// Metrics from the most recent cycle.
    pub last_cycle: CycleMetrics,
}

impl EngineStats {
    /// Fold one cycle into the totals.
    pub fn record_cycle(&mut self, m: &CycleMetrics) {
        self.cycles += 1;
        self.converted += u64::from(m.converted);
        self.dequeued += u64::from(m.dequeued);
        self.skipped_unavailable += u64::from(m.skipped_unavailable);
        self.write_rejected += u64::from(m.write_rejected);
        self.dropped_space_removed += u64::from(m.dropped_space_removed);
        self.regions_loaded += u64::from(m.regions_loaded);
        self.regions_released += u64::from(m.regions_released);
        self.regions_forgotten += u64::from(m.regions_forgotten);
        self.last_cycle = m.clone();
    }

    /// Fold one effect pass into the totals.
    pub fn record_effect(&mut self, m: &EffectMetrics) {
        self.effect_passes += 1;
        self.effects_applied += u64::from(m.effects_applied);
    }
}
