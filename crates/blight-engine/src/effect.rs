//! Periodic area effect over infected regions.
//!
//! A pure read-side consumer of the [`InfectedRegionIndex`]: it never
//! touches the frontier, residency, or the index itself, and it never
//! pages regions in. Actors standing in regions that are not resident
//! are skipped for that pass.

use blight_core::{CellState, Host, TickId};
use blight_spread::InfectedRegionIndex;

use crate::config::{clamp_interval, EffectConfig, EffectPlacement};
use crate::metrics::EffectMetrics;

/// Applies the configured effect to actors on converted ground.
#[derive(Debug)]
pub struct AreaEffectScheduler {
    config: EffectConfig,
    /// `None` after an interval change: re-phase on the next poll.
    next_due: Option<TickId>,
}

impl AreaEffectScheduler {
    /// Build a scheduler from (sanitized) configuration.
    pub fn new(config: &EffectConfig) -> Self {
        Self {
            config: config.clone().sanitized(),
            next_due: Some(TickId(0)),
        }
    }

    /// Run a pass if one is due at `now`.
    ///
    /// Returns `None` when no pass was due, or when the effect is disabled.
    pub fn poll(
        &mut self,
        now: TickId,
        index: &InfectedRegionIndex,
        target: CellState,
        host: &mut Host,
    ) -> Option<EffectMetrics> {
        if !self.config.enabled {
            return None;
        }
        let interval = u64::from(self.config.interval_ticks);
        let due = *self.next_due.get_or_insert(now.after(interval));
        if now < due {
            return None;
        }
        self.next_due = Some(now.after(interval));
        Some(self.run(index, target, host))
    }

    /// Run one pass unconditionally.
    pub fn run(
        &self,
        index: &InfectedRegionIndex,
        target: CellState,
        host: &mut Host,
    ) -> EffectMetrics {
        let mut m = EffectMetrics::default();
        if index.is_empty() {
            return m;
        }
        for (actor, at) in host.actors.actors() {
            m.actors_scanned += 1;
            let probe = match self.config.placement {
                EffectPlacement::StandingOn => at.below(),
                EffectPlacement::Inside => at,
            };
            let region = probe.region();
            if !index.contains(region) || !host.regions.is_resident(region) {
                continue;
            }
            match host.voxels.extent(probe.space) {
                Some(extent) if extent.contains(probe.y) => {}
                _ => continue,
            }
            if host.voxels.read(probe) == Some(target) {
                host.effects.apply(actor, &self.config.effect);
                m.effects_applied += 1;
            }
        }
        if m.effects_applied > 0 {
            log::trace!(
                "applied {} to {}/{} actors",
                self.config.effect,
                m.effects_applied,
                m.actors_scanned,
            );
        }
        m
    }

    /// Turn the effect on or off. Re-enabling restarts the phase.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.config.enabled {
            self.next_due = None;
        }
        self.config.enabled = enabled;
    }

    /// Change the pass interval. The next pass fires one new interval
    /// after the next poll.
    pub fn set_interval(&mut self, ticks: u32) {
        self.config.interval_ticks = clamp_interval("effect interval", ticks);
        self.next_due = None;
    }

    /// Whether the effect is enabled.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Current configuration.
    pub fn config(&self) -> &EffectConfig {
        &self.config
    }

    /// Forget the phase. The next poll starts a fresh interval.
    pub fn reset(&mut self) {
        self.next_due = Some(TickId(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blight_core::{ActorId, SpaceId, VoxelKey};
    use blight_test_utils::fixtures::TEST_EXTENT;
    use blight_test_utils::{open_world, SharedWorld, TEST_SPACE};

    fn v(x: i32, y: i32, z: i32) -> VoxelKey {
        VoxelKey::new(TEST_SPACE, x, y, z)
    }

    fn enabled(placement: EffectPlacement) -> AreaEffectScheduler {
        AreaEffectScheduler::new(&EffectConfig {
            enabled: true,
            interval_ticks: 1,
            placement,
            ..EffectConfig::default()
        })
    }

    /// World with (0,0,0) converted, its region resident and indexed.
    fn infected_floor() -> (SharedWorld, InfectedRegionIndex) {
        let world = open_world();
        let floor = v(0, 0, 0);
        {
            let mut w = world.lock();
            w.set(floor, CellState::INFECTED);
            w.make_resident(floor.region());
        }
        let mut index = InfectedRegionIndex::new();
        index.insert(floor.region());
        (world, index)
    }

    // ── Gating ──────────────────────────────────────────────────

    #[test]
    fn actor_standing_on_converted_voxel_is_affected() {
        let (world, index) = infected_floor();
        world.lock().add_actor(ActorId(1), v(0, 1, 0));
        world.lock().add_actor(ActorId(2), v(3, 1, 3));
        let mut host = world.host();
        let m = enabled(EffectPlacement::StandingOn).run(&index, CellState::INFECTED, &mut host);
        assert_eq!(m.actors_scanned, 2);
        assert_eq!(m.effects_applied, 1);
        assert_eq!(world.lock().applied_to(ActorId(1)), 1);
        assert_eq!(world.lock().applied_to(ActorId(2)), 0);
    }

    #[test]
    fn inside_placement_checks_own_voxel() {
        let (world, index) = infected_floor();
        world.lock().add_actor(ActorId(1), v(0, 0, 0));
        world.lock().add_actor(ActorId(2), v(0, 1, 0));
        let mut host = world.host();
        enabled(EffectPlacement::Inside).run(&index, CellState::INFECTED, &mut host);
        assert_eq!(world.lock().applied_to(ActorId(1)), 1);
        assert_eq!(world.lock().applied_to(ActorId(2)), 0);
    }

    #[test]
    fn converted_voxel_outside_index_is_ignored() {
        let (world, _) = infected_floor();
        world.lock().add_actor(ActorId(1), v(0, 1, 0));
        let mut index = InfectedRegionIndex::new();
        index.insert(v(100, 0, 100).region());
        let mut host = world.host();
        let m = enabled(EffectPlacement::StandingOn).run(&index, CellState::INFECTED, &mut host);
        assert_eq!(m.effects_applied, 0);
    }

    #[test]
    fn empty_index_is_a_noop() {
        let (world, _) = infected_floor();
        world.lock().add_actor(ActorId(1), v(0, 1, 0));
        let mut host = world.host();
        let m = enabled(EffectPlacement::StandingOn).run(
            &InfectedRegionIndex::new(),
            CellState::INFECTED,
            &mut host,
        );
        assert_eq!(m, EffectMetrics::default());
    }

    #[test]
    fn non_resident_regions_are_skipped_without_loading() {
        let (world, index) = infected_floor();
        world.lock().add_actor(ActorId(1), v(0, 1, 0));
        world.lock().evict(v(0, 0, 0).region());
        let mut host = world.host();
        let m = enabled(EffectPlacement::StandingOn).run(&index, CellState::INFECTED, &mut host);
        assert_eq!(m.effects_applied, 0);
        assert!(world.lock().loads().is_empty());
        assert_eq!(world.lock().residency_violations(), 0);
    }

    #[test]
    fn probe_below_extent_is_skipped() {
        let world = open_world();
        let bottom = v(0, TEST_EXTENT.min_y, 0);
        world.lock().make_resident(bottom.region());
        world.lock().add_actor(ActorId(1), bottom);
        let mut index = InfectedRegionIndex::new();
        index.insert(bottom.region());
        let mut host = world.host();
        let m = enabled(EffectPlacement::StandingOn).run(&index, CellState::INFECTED, &mut host);
        assert_eq!(m.effects_applied, 0);
    }

    #[test]
    fn removed_space_actor_is_skipped() {
        let (world, mut index) = infected_floor();
        let elsewhere = VoxelKey::new(SpaceId(9), 0, 1, 0);
        world.lock().add_actor(ActorId(1), elsewhere);
        index.insert(elsewhere.below().region());
        world.lock().make_resident(elsewhere.below().region());
        let mut host = world.host();
        let m = enabled(EffectPlacement::StandingOn).run(&index, CellState::INFECTED, &mut host);
        assert_eq!(m.effects_applied, 0);
    }

    // ── Scheduling ──────────────────────────────────────────────

    #[test]
    fn disabled_never_fires() {
        let (world, index) = infected_floor();
        world.lock().add_actor(ActorId(1), v(0, 1, 0));
        let mut host = world.host();
        let mut s = AreaEffectScheduler::new(&EffectConfig::default());
        for t in 0..50 {
            assert!(s.poll(TickId(t), &index, CellState::INFECTED, &mut host).is_none());
        }
        assert!(world.lock().applied().is_empty());
    }

    #[test]
    fn fires_on_its_own_interval() {
        let (world, index) = infected_floor();
        world.lock().add_actor(ActorId(1), v(0, 1, 0));
        let mut host = world.host();
        let mut s = AreaEffectScheduler::new(&EffectConfig {
            enabled: true,
            interval_ticks: 20,
            ..EffectConfig::default()
        });
        let fired = (0..45)
            .filter(|&t| {
                s.poll(TickId(t), &index, CellState::INFECTED, &mut host)
                    .is_some()
            })
            .count();
        assert_eq!(fired, 3);
        assert_eq!(world.lock().applied_to(ActorId(1)), 3);
    }

    #[test]
    fn reenabling_restarts_phase() {
        let (world, index) = infected_floor();
        let mut host = world.host();
        let mut s = AreaEffectScheduler::new(&EffectConfig::default());
        s.set_interval(5);
        s.set_enabled(true);
        assert!(s.poll(TickId(100), &index, CellState::INFECTED, &mut host).is_none());
        assert!(s.poll(TickId(105), &index, CellState::INFECTED, &mut host).is_some());
    }
}
