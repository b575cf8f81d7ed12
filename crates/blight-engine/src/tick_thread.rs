//! Tick loop and command channel draining for the threaded driver.
//!
//! The tick thread owns the [`LockstepSpreadWorld`] exclusively (moved in
//! via `thread::spawn`), so every mutation of spread state happens on one
//! thread. Commands arrive over a bounded crossbeam channel; read-side
//! counters go back out through atomics published at the end of each tick.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use crate::lockstep::LockstepSpreadWorld;
use crate::realtime::EngineCommand;

/// Counters the tick thread publishes after every tick.
#[derive(Debug, Default)]
pub(crate) struct Published {
    pub tick: AtomicU64,
    pub frontier_size: AtomicU64,
    pub infected_regions: AtomicU64,
    pub engine_loaded_regions: AtomicU64,
    pub converted_total: AtomicU64,
    pub panics: AtomicU64,
}

impl Published {
    fn publish(&self, world: &LockstepSpreadWorld) {
        self.frontier_size
            .store(world.frontier_size() as u64, Ordering::Relaxed);
        self.infected_regions
            .store(world.infected_region_count() as u64, Ordering::Relaxed);
        self.engine_loaded_regions
            .store(world.engine_loaded_regions() as u64, Ordering::Relaxed);
        self.converted_total
            .store(world.stats().converted, Ordering::Relaxed);
        // Tick last: a reader that sees tick N sees the counters from N.
        self.tick.store(world.current_tick().0, Ordering::Release);
    }
}

/// What the tick thread hands back when it exits.
pub(crate) struct TickThreadExit {
    pub world: LockstepSpreadWorld,
    pub regions_released: usize,
}

/// State held by the tick thread's main loop.
pub(crate) struct TickThreadState {
    world: LockstepSpreadWorld,
    cmd_rx: Receiver<EngineCommand>,
    shutdown_flag: Arc<AtomicBool>,
    tick_stopped: Arc<AtomicBool>,
    published: Arc<Published>,
    tick_budget: Duration,
}

impl TickThreadState {
    pub fn new(
        world: LockstepSpreadWorld,
        cmd_rx: Receiver<EngineCommand>,
        shutdown_flag: Arc<AtomicBool>,
        tick_stopped: Arc<AtomicBool>,
        published: Arc<Published>,
        tick_rate_hz: f64,
    ) -> Self {
        Self {
            world,
            cmd_rx,
            shutdown_flag,
            tick_stopped,
            published,
            tick_budget: Duration::from_secs_f64(1.0 / tick_rate_hz),
        }
    }

    /// Main tick loop. Runs until `shutdown_flag` is set.
    ///
    /// Shuts the world down on the way out (releasing engine-loaded
    /// regions on the thread that owns the host) and returns it.
    pub fn run(mut self) -> TickThreadExit {
        self.published.publish(&self.world);
        loop {
            if self.shutdown_flag.load(Ordering::Acquire) {
                break;
            }
            let tick_start = Instant::now();

            // 1. Apply commands in arrival order.
            self.drain_command_channel();

            // 2. Step. A panic escaping the tick body is logged and the
            //    loop carries on with the next tick.
            let step = panic::catch_unwind(AssertUnwindSafe(|| self.world.step()));
            if let Err(payload) = step {
                self.published.panics.fetch_add(1, Ordering::Relaxed);
                log::error!(
                    "spread tick {} panicked: {}",
                    self.world.current_tick(),
                    panic_message(payload.as_ref()),
                );
            }

            // 3. Publish read-side counters.
            self.published.publish(&self.world);

            // 4. Sleep for the rest of the budget. park_timeout lets
            //    shutdown wake us immediately via unpark().
            if let Some(remaining) = self.tick_budget.checked_sub(tick_start.elapsed()) {
                thread::park_timeout(remaining);
            }
        }

        let regions_released = self.world.shutdown();
        self.published.publish(&self.world);
        self.tick_stopped.store(true, Ordering::Release);
        TickThreadExit {
            world: self.world,
            regions_released,
        }
    }

    /// Apply every pending command.
    fn drain_command_channel(&mut self) {
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            apply(&mut self.world, cmd);
        }
    }
}

fn apply(world: &mut LockstepSpreadWorld, cmd: EngineCommand) {
    match cmd {
        EngineCommand::Seed(voxels) => {
            world.seed_many(voxels);
        }
        EngineCommand::SetEnabled(enabled) => world.set_enabled(enabled),
        EngineCommand::SetBudget(budget) => world.set_budget(budget),
        EngineCommand::SetCycleInterval(ticks) => world.set_cycle_interval(ticks),
        EngineCommand::SetEffectEnabled(enabled) => world.set_effect_enabled(enabled),
        EngineCommand::SetEffectInterval(ticks) => world.set_effect_interval(ticks),
        EngineCommand::SetReleaseGrace(ticks) => world.set_release_grace(ticks),
        EngineCommand::Reset => {
            world.reset();
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}
