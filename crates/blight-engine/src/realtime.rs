//! Threaded `RealtimeSpreadWorld` API and shutdown state machine.
//!
//! For hosts whose game loop lives on another thread: the spread world
//! runs on a dedicated `blight-tick` thread at a fixed rate, and the host
//! talks to it only through a command channel and published counters.
//!
//! # Architecture
//!
//! ```text
//! Host Thread(s)                   Tick Thread
//!     |                                |
//!     |--seed()/set_budget()---------->| cmd_rx.try_recv()
//!     |   [cmd_tx: bounded(64)]        | apply commands in order
//!     |                                | world.step()  (catch_unwind)
//!     |                                | publish counters
//!     |<--frontier_size()--------------| park_timeout(budget - elapsed)
//!     |   [atomics]                    |
//! ```
//!
//! The tick thread is the single writer of all spread state. Commands
//! submitted before tick N's drain take effect at tick N, in the order
//! they were sent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use blight_core::{Host, TickId, VoxelKey};

use crate::config::{ConfigError, EngineConfig};
use crate::lockstep::LockstepSpreadWorld;
use crate::tick_thread::{Published, TickThreadExit, TickThreadState};

/// Capacity of the host → tick thread command channel.
pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

// ── Commands ─────────────────────────────────────────────────────

/// A request drained by the tick thread at the start of a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum EngineCommand {
    /// Seed the spread at each voxel.
    Seed(Vec<VoxelKey>),
    /// Turn conversion on or off.
    SetEnabled(bool),
    /// Change the per-cycle budget (clamped).
    SetBudget(u32),
    /// Change the cycle interval (clamped).
    SetCycleInterval(u32),
    /// Turn the area effect on or off.
    SetEffectEnabled(bool),
    /// Change the area effect interval (clamped).
    SetEffectInterval(u32),
    /// Change the region release grace period.
    SetReleaseGrace(u64),
    /// Discard all spread state and release engine-loaded regions.
    Reset,
}

// ── Error types ──────────────────────────────────────────────────

/// Error submitting a command to the tick thread.
#[derive(Debug, PartialEq, Eq)]
pub enum SubmitError {
    /// The tick thread has shut down.
    Shutdown,
    /// The command channel is full (back-pressure).
    ChannelFull,
}

impl std::fmt::Display for SubmitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shutdown => write!(f, "tick thread has shut down"),
            Self::ChannelFull => write!(f, "command channel full"),
        }
    }
}

impl std::error::Error for SubmitError {}

// ── ShutdownReport ───────────────────────────────────────────────

/// Report from [`RealtimeSpreadWorld::shutdown()`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Total time spent in the shutdown sequence.
    pub total_ms: u64,
    /// Whether the tick thread was joined successfully.
    pub tick_joined: bool,
    /// Engine-loaded regions released on the way down.
    pub regions_released: usize,
}

// ── ShutdownState ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShutdownState {
    Running,
    Draining,
    Dropped,
}

// ── RealtimeSpreadWorld ──────────────────────────────────────────

/// Spread world stepped by a background thread at a fixed rate.
pub struct RealtimeSpreadWorld {
    cmd_tx: Option<crossbeam_channel::Sender<EngineCommand>>,
    shutdown_flag: Arc<AtomicBool>,
    tick_stopped: Arc<AtomicBool>,
    published: Arc<Published>,
    tick_thread: Option<JoinHandle<TickThreadExit>>,
    state: ShutdownState,
    /// Recovered from the tick thread on shutdown, for `into_host()`.
    /// Wrapped in Mutex so the world is Sync (the host collaborators are
    /// Send but not Sync). Never contended.
    recovered: Mutex<Option<LockstepSpreadWorld>>,
    tick_rate_hz: f64,
}

impl RealtimeSpreadWorld {
    /// Build the world and spawn the tick thread.
    ///
    /// `host` is moved onto the tick thread; get it back with
    /// [`into_host()`](Self::into_host).
    pub fn new(config: EngineConfig, host: Host) -> Result<Self, ConfigError> {
        config.validate()?;
        let tick_rate_hz = config.resolved_tick_rate_hz();
        let world = LockstepSpreadWorld::new(config, host)?;

        let shutdown_flag = Arc::new(AtomicBool::new(false));
        let tick_stopped = Arc::new(AtomicBool::new(false));
        let published = Arc::new(Published::default());
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(COMMAND_CHANNEL_CAPACITY);

        let tick_shutdown = Arc::clone(&shutdown_flag);
        let tick_stopped_flag = Arc::clone(&tick_stopped);
        let tick_published = Arc::clone(&published);
        let tick_thread = thread::Builder::new()
            .name("blight-tick".into())
            .spawn(move || {
                TickThreadState::new(
                    world,
                    cmd_rx,
                    tick_shutdown,
                    tick_stopped_flag,
                    tick_published,
                    tick_rate_hz,
                )
                .run()
            })
            .map_err(|e| ConfigError::ThreadSpawnFailed {
                reason: format!("tick thread: {e}"),
            })?;
        log::debug!("tick thread started at {tick_rate_hz} Hz");

        Ok(Self {
            cmd_tx: Some(cmd_tx),
            shutdown_flag,
            tick_stopped,
            published,
            tick_thread: Some(tick_thread),
            state: ShutdownState::Running,
            recovered: Mutex::new(None),
            tick_rate_hz,
        })
    }

    /// Queue a command for the next tick. Never blocks.
    pub fn submit(&self, cmd: EngineCommand) -> Result<(), SubmitError> {
        let cmd_tx = self.cmd_tx.as_ref().ok_or(SubmitError::Shutdown)?;
        cmd_tx.try_send(cmd).map_err(|e| match e {
            crossbeam_channel::TrySendError::Full(_) => SubmitError::ChannelFull,
            crossbeam_channel::TrySendError::Disconnected(_) => SubmitError::Shutdown,
        })
    }

    /// Seed the spread at `voxel`.
    pub fn seed(&self, voxel: VoxelKey) -> Result<(), SubmitError> {
        self.submit(EngineCommand::Seed(vec![voxel]))
    }

    /// Seed several voxels in one command.
    pub fn seed_many(&self, voxels: Vec<VoxelKey>) -> Result<(), SubmitError> {
        self.submit(EngineCommand::Seed(voxels))
    }

    /// Turn conversion on or off.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), SubmitError> {
        self.submit(EngineCommand::SetEnabled(enabled))
    }

    /// Change the per-cycle budget (clamped on the tick thread).
    pub fn set_budget(&self, budget: u32) -> Result<(), SubmitError> {
        self.submit(EngineCommand::SetBudget(budget))
    }

    /// Change the cycle interval (clamped on the tick thread).
    pub fn set_cycle_interval(&self, ticks: u32) -> Result<(), SubmitError> {
        self.submit(EngineCommand::SetCycleInterval(ticks))
    }

    /// Turn the area effect on or off.
    pub fn set_effect_enabled(&self, enabled: bool) -> Result<(), SubmitError> {
        self.submit(EngineCommand::SetEffectEnabled(enabled))
    }

    /// Change the area effect interval (clamped on the tick thread).
    pub fn set_effect_interval(&self, ticks: u32) -> Result<(), SubmitError> {
        self.submit(EngineCommand::SetEffectInterval(ticks))
    }

    /// Change the release grace period for engine-loaded regions.
    pub fn set_release_grace(&self, ticks: u64) -> Result<(), SubmitError> {
        self.submit(EngineCommand::SetReleaseGrace(ticks))
    }

    /// Discard all spread state at the next tick.
    pub fn reset(&self) -> Result<(), SubmitError> {
        self.submit(EngineCommand::Reset)
    }

    /// Frontier size as of the last completed tick.
    pub fn frontier_size(&self) -> usize {
        self.published.frontier_size.load(Ordering::Relaxed) as usize
    }

    /// Infected region count as of the last completed tick.
    pub fn infected_region_count(&self) -> usize {
        self.published.infected_regions.load(Ordering::Relaxed) as usize
    }

    /// Regions held by the engine as of the last completed tick.
    pub fn engine_loaded_regions(&self) -> usize {
        self.published.engine_loaded_regions.load(Ordering::Relaxed) as usize
    }

    /// Total conversions since start or the last reset.
    pub fn converted_total(&self) -> u64 {
        self.published.converted_total.load(Ordering::Relaxed)
    }

    /// The last completed tick.
    pub fn current_tick(&self) -> TickId {
        TickId(self.published.tick.load(Ordering::Acquire))
    }

    /// Tick bodies that panicked and were skipped.
    pub fn panic_count(&self) -> u64 {
        self.published.panics.load(Ordering::Relaxed)
    }

    /// The rate the tick thread runs at.
    pub fn tick_rate_hz(&self) -> f64 {
        self.tick_rate_hz
    }

    /// Stop the tick thread and release engine-loaded regions.
    ///
    /// 1. **Running → Draining (≤100ms):** set the shutdown flag, unpark
    ///    the tick thread (wakes it from its budget sleep immediately),
    ///    and wait for it to acknowledge.
    /// 2. **Draining → Dropped:** close the command channel and join.
    ///
    /// Idempotent: later calls return an empty report.
    pub fn shutdown(&mut self) -> ShutdownReport {
        if self.state == ShutdownState::Dropped {
            return ShutdownReport {
                total_ms: 0,
                tick_joined: true,
                regions_released: 0,
            };
        }

        let start = Instant::now();

        // Phase 1: Running → Draining
        self.state = ShutdownState::Draining;
        self.shutdown_flag.store(true, Ordering::Release);
        if let Some(handle) = &self.tick_thread {
            handle.thread().unpark();
        }
        let drain_deadline = Instant::now() + Duration::from_millis(100);
        while !self.tick_stopped.load(Ordering::Acquire) {
            if Instant::now() > drain_deadline {
                log::warn!("tick thread slow to stop; joining anyway");
                break;
            }
            thread::yield_now();
        }

        // Phase 2: Draining → Dropped
        self.cmd_tx.take();
        self.state = ShutdownState::Dropped;

        let mut regions_released = 0;
        let tick_joined = if let Some(handle) = self.tick_thread.take() {
            match handle.join() {
                Ok(exit) => {
                    regions_released = exit.regions_released;
                    if let Ok(mut slot) = self.recovered.lock() {
                        *slot = Some(exit.world);
                    }
                    true
                }
                Err(_) => {
                    log::error!("tick thread panicked outside a tick body");
                    false
                }
            }
        } else {
            true
        };

        let total_ms = start.elapsed().as_millis() as u64;
        log::debug!("shutdown in {total_ms}ms, released {regions_released} regions");
        ShutdownReport {
            total_ms,
            tick_joined,
            regions_released,
        }
    }

    /// Shut down and hand the collaborators back.
    pub fn into_host(mut self) -> Result<Host, ConfigError> {
        self.shutdown();
        let world = self
            .recovered
            .lock()
            .ok()
            .and_then(|mut slot| slot.take())
            .ok_or(ConfigError::EngineRecoveryFailed)?;
        Ok(world.into_host())
    }
}

impl Drop for RealtimeSpreadWorld {
    fn drop(&mut self) {
        if self.state != ShutdownState::Dropped {
            self.shutdown();
        }
    }
}

impl std::fmt::Debug for RealtimeSpreadWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeSpreadWorld")
            .field("state", &self.state)
            .field("tick_rate_hz", &self.tick_rate_hz)
            .field("current_tick", &self.current_tick())
            .finish()
    }
}
