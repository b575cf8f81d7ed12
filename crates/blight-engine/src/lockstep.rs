//! Lockstep (synchronous) spread world.
//!
//! [`LockstepSpreadWorld`] is the primary host-facing API. The host calls
//! [`step()`](LockstepSpreadWorld::step) once per host tick; the world
//! runs the spread cycle and the area effect on their own intervals and
//! reports what happened.
//!
//! # Ownership model
//!
//! `LockstepSpreadWorld` is [`Send`] (can be moved onto a tick thread)
//! but not [`Sync`]. All mutating methods take `&mut self`, so two
//! cycles can never interleave and every frontier, residency, and index
//! update is serialized by construction.
//!
//! # Shutdown
//!
//! [`shutdown()`](LockstepSpreadWorld::shutdown) releases every region
//! the engine loaded and discards all spread state. Nothing persists
//! across shutdown.

use blight_core::{Host, RegionKey, TickId, VoxelKey};

use crate::config::{ConfigError, EngineConfig};
use crate::cycle::SpreadCycleScheduler;
use crate::effect::AreaEffectScheduler;
use crate::metrics::{CycleMetrics, EffectMetrics, EngineStats};

// Compile-time assertion: LockstepSpreadWorld is Send.
// Fails to compile if any collaborator box loses its Send bound.
const _: () = {
    #[allow(dead_code)]
    fn assert_send<T: Send>() {}
    #[allow(dead_code)]
    fn check() {
        assert_send::<LockstepSpreadWorld>();
    }
};

// ── StepReport ──────────────────────────────────────────────────

/// Result of one [`LockstepSpreadWorld::step()`] call.
#[derive(Clone, Debug, PartialEq)]
pub struct StepReport {
    /// The tick that was executed.
    pub tick: TickId,
    /// Spread cycle metrics, if a cycle was due this tick.
    pub cycle: Option<CycleMetrics>,
    /// Effect pass metrics, if a pass was due and enabled.
    pub effect: Option<EffectMetrics>,
}

// ── LockstepSpreadWorld ─────────────────────────────────────────

/// Single-threaded spread world for lockstep execution.
///
/// # Example
///
/// ```ignore
/// let mut world = LockstepSpreadWorld::new(EngineConfig::default(), host)?;
/// world.seed(VoxelKey::new(SpaceId(0), 0, 64, 0));
/// for _ in 0..1000 {
///     let report = world.step();
/// }
/// world.shutdown();
/// ```
pub struct LockstepSpreadWorld {
    host: Host,
    spread: SpreadCycleScheduler,
    effects: AreaEffectScheduler,
    current_tick: TickId,
    stats: EngineStats,
    stopped: bool,
}

impl LockstepSpreadWorld {
    /// Create a world driving `host`'s collaborators.
    ///
    /// Out-of-range tunables are clamped; only an invalid tick rate is
    /// rejected.
    pub fn new(config: EngineConfig, host: Host) -> Result<Self, ConfigError> {
        config.validate()?;
        let config = config.sanitized();
        Ok(Self {
            host,
            spread: SpreadCycleScheduler::new(&config.spread),
            effects: AreaEffectScheduler::new(&config.effect),
            current_tick: TickId(0),
            stats: EngineStats::default(),
            stopped: false,
        })
    }

    /// Execute one host tick.
    ///
    /// Runs the spread cycle if due, then the effect pass if due. After
    /// shutdown this is a no-op that reports the unchanged tick.
    pub fn step(&mut self) -> StepReport {
        if self.stopped {
            return StepReport {
                tick: self.current_tick,
                cycle: None,
                effect: None,
            };
        }
        let tick = self.current_tick.after(1);
        self.current_tick = tick;

        let cycle = self.spread.poll(
            tick,
            self.host.regions.as_mut(),
            self.host.voxels.as_mut(),
        );
        if let Some(m) = &cycle {
            self.stats.record_cycle(m);
        }

        let target = self.spread.policy().target;
        let effect = self
            .effects
            .poll(tick, self.spread.infected(), target, &mut self.host);
        if let Some(m) = &effect {
            self.stats.record_effect(m);
        }

        StepReport {
            tick,
            cycle,
            effect,
        }
    }

    /// Seed the spread at `voxel`.
    ///
    /// Returns `false` if the world is shut down, the voxel was seeded or
    /// reached before, or it lies outside its space.
    pub fn seed(&mut self, voxel: VoxelKey) -> bool {
        if self.stopped {
            return false;
        }
        let accepted = self.spread.seed(voxel, self.host.voxels.as_ref());
        if accepted {
            log::debug!("seeded {voxel}");
        }
        accepted
    }

    /// Seed several voxels. Returns how many were accepted.
    pub fn seed_many(&mut self, voxels: impl IntoIterator<Item = VoxelKey>) -> usize {
        voxels.into_iter().filter(|v| self.seed(*v)).count()
    }

    /// Turn conversion on or off. Housekeeping keeps running either way.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.spread.set_enabled(enabled);
    }

    /// Change the per-cycle conversion budget (clamped).
    pub fn set_budget(&mut self, budget: u32) {
        self.spread.set_budget(budget);
    }

    /// Change the cycle interval (clamped). Takes effect from the next step.
    pub fn set_cycle_interval(&mut self, ticks: u32) {
        self.spread.set_interval(ticks);
    }

    /// Turn the area effect on or off.
    pub fn set_effect_enabled(&mut self, enabled: bool) {
        self.effects.set_enabled(enabled);
    }

    /// Change the area effect interval (clamped).
    pub fn set_effect_interval(&mut self, ticks: u32) {
        self.effects.set_interval(ticks);
    }

    /// Change the region release grace period.
    pub fn set_release_grace(&mut self, ticks: u64) {
        self.spread.set_release_grace(ticks);
    }

    /// Voxels waiting in the frontier.
    pub fn frontier_size(&self) -> usize {
        self.spread.frontier().len()
    }

    /// Regions holding at least one converted voxel.
    pub fn infected_region_count(&self) -> usize {
        self.spread.infected().len()
    }

    /// Whether `region` holds a converted voxel.
    pub fn is_infected(&self, region: RegionKey) -> bool {
        self.spread.infected().contains(region)
    }

    /// Regions the engine currently holds resident.
    pub fn engine_loaded_regions(&self) -> usize {
        self.spread.residency().engine_loaded_count()
    }

    /// The last executed tick (0 before the first step).
    pub fn current_tick(&self) -> TickId {
        self.current_tick
    }

    /// Cumulative statistics since construction or the last reset.
    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    /// Metrics from the most recent cycle.
    pub fn last_cycle_metrics(&self) -> &CycleMetrics {
        &self.stats.last_cycle
    }

    /// Read-only view of the spread scheduler.
    pub fn scheduler(&self) -> &SpreadCycleScheduler {
        &self.spread
    }

    /// Read-only view of the area effect scheduler.
    pub fn effect_scheduler(&self) -> &AreaEffectScheduler {
        &self.effects
    }

    /// Discard all spread state and release engine-loaded regions.
    ///
    /// Configuration and the tick counter are kept. Returns how many
    /// regions were released.
    pub fn reset(&mut self) -> usize {
        let released = self.spread.reset(self.host.regions.as_mut());
        self.effects.reset();
        self.stats = EngineStats::default();
        log::debug!("reset at tick {}: released {released} regions", self.current_tick);
        released
    }

    /// Reset, then stop: later steps are no-ops and seeds are refused.
    ///
    /// Idempotent. Returns how many regions were released.
    pub fn shutdown(&mut self) -> usize {
        if self.stopped {
            return 0;
        }
        let released = self.reset();
        self.stopped = true;
        log::debug!("shut down at tick {}", self.current_tick);
        released
    }

    /// Whether [`shutdown()`](Self::shutdown) has been called.
    pub fn is_shut_down(&self) -> bool {
        self.stopped
    }

    /// Shut down and hand the collaborators back.
    pub fn into_host(mut self) -> Host {
        self.shutdown();
        self.host
    }
}

impl std::fmt::Debug for LockstepSpreadWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockstepSpreadWorld")
            .field("current_tick", &self.current_tick)
            .field("frontier_size", &self.frontier_size())
            .field("infected_regions", &self.infected_region_count())
            .field("stopped", &self.stopped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{EffectConfig, SpreadConfig};
    use blight_core::{ActorId, CellState};
    use blight_test_utils::{open_world, SharedWorld, TEST_SPACE};

    fn v(x: i32, y: i32, z: i32) -> VoxelKey {
        VoxelKey::new(TEST_SPACE, x, y, z)
    }

    fn world_with(config: EngineConfig) -> (SharedWorld, LockstepSpreadWorld) {
        let shared = open_world();
        let world = LockstepSpreadWorld::new(config, shared.host()).unwrap();
        (shared, world)
    }

    // ── Basic lifecycle ─────────────────────────────────────────

    #[test]
    fn new_world_starts_at_tick_zero() {
        let (_, world) = world_with(EngineConfig::default());
        assert_eq!(world.current_tick(), TickId(0));
        assert_eq!(world.frontier_size(), 0);
        assert!(!world.is_shut_down());
    }

    #[test]
    fn invalid_tick_rate_rejected() {
        let shared = open_world();
        let cfg = EngineConfig {
            tick_rate_hz: Some(0.0),
            ..EngineConfig::default()
        };
        match LockstepSpreadWorld::new(cfg, shared.host()) {
            Err(ConfigError::InvalidTickRate { .. }) => {}
            other => panic!("expected InvalidTickRate, got {other:?}"),
        }
    }

    #[test]
    fn step_advances_tick_and_spreads() {
        let (shared, mut world) = world_with(EngineConfig::default());
        assert!(world.seed(v(0, 0, 0)));
        let report = world.step();
        assert_eq!(report.tick, TickId(1));
        let cycle = report.cycle.unwrap();
        assert_eq!(cycle.converted, 100);
        assert!(report.effect.is_none());
        assert_eq!(shared.lock().cells_in_state(CellState::INFECTED).len(), 100);
        assert_eq!(world.stats().converted, 100);
        assert!(world.is_infected(v(0, 0, 0).region()));
    }

    #[test]
    fn cycle_interval_gates_steps() {
        let (_, mut world) = world_with(EngineConfig {
            spread: SpreadConfig {
                cycle_interval_ticks: 4,
                ..SpreadConfig::default()
            },
            ..EngineConfig::default()
        });
        let fired = (0..12).filter(|_| world.step().cycle.is_some()).count();
        assert_eq!(fired, 3);
        assert_eq!(world.stats().cycles, 3);
    }

    #[test]
    fn set_budget_applies_next_cycle() {
        let (_, mut world) = world_with(EngineConfig::default());
        world.seed(v(0, 0, 0));
        world.set_budget(7);
        assert_eq!(world.step().cycle.unwrap().converted, 7);
        world.set_budget(0);
        assert_eq!(world.step().cycle.unwrap().converted, 1);
    }

    #[test]
    fn effect_runs_once_enabled() {
        let (shared, mut world) = world_with(EngineConfig {
            effect: EffectConfig {
                interval_ticks: 1,
                ..EffectConfig::default()
            },
            ..EngineConfig::default()
        });
        shared.lock().add_actor(ActorId(1), v(1, 1, 0));
        world.seed(v(0, 0, 0));
        world.step();
        assert!(shared.lock().applied().is_empty());

        world.set_effect_enabled(true);
        world.step();
        world.step();
        assert!(shared.lock().applied_to(ActorId(1)) >= 1);
        assert!(world.stats().effect_passes >= 1);
    }

    // ── Reset and shutdown ──────────────────────────────────────

    #[test]
    fn reset_releases_regions_and_keeps_config() {
        let (shared, mut world) = world_with(EngineConfig::default());
        world.set_budget(40);
        world.seed(v(0, 0, 0));
        world.step();
        assert!(world.engine_loaded_regions() > 0);

        let released = world.reset();
        assert!(released > 0);
        assert_eq!(shared.lock().resident_count(), 0);
        assert_eq!(world.frontier_size(), 0);
        assert_eq!(world.infected_region_count(), 0);
        assert_eq!(world.stats(), &EngineStats::default());

        assert!(world.seed(v(0, 0, 0)));
        assert_eq!(world.step().cycle.unwrap().converted, 40);
    }

    #[test]
    fn shutdown_stops_everything() {
        let (shared, mut world) = world_with(EngineConfig::default());
        world.seed(v(0, 0, 0));
        world.step();
        world.shutdown();
        assert!(world.is_shut_down());
        assert_eq!(shared.lock().resident_count(), 0);
        assert!(!world.seed(v(5, 0, 5)));

        let writes = shared.lock().writes().len();
        let tick = world.current_tick();
        let report = world.step();
        assert_eq!(report.tick, tick);
        assert!(report.cycle.is_none());
        assert_eq!(shared.lock().writes().len(), writes);
        assert_eq!(world.shutdown(), 0);
    }

    #[test]
    fn into_host_returns_collaborators() {
        let (shared, mut world) = world_with(EngineConfig::default());
        world.seed(v(0, 0, 0));
        world.step();
        let host = world.into_host();
        assert_eq!(shared.lock().resident_count(), 0);
        assert!(!host.regions.is_resident(v(0, 0, 0).region()));
    }

    #[test]
    fn debug_output_names_the_world() {
        let (_, world) = world_with(EngineConfig::default());
        assert!(format!("{world:?}").contains("LockstepSpreadWorld"));
    }
}
