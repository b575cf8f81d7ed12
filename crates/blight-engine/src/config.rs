//! Engine configuration, clamping, and error types.
//!
//! Out-of-range tunables (zero budget, zero interval) are never errors:
//! [`sanitized()`](SpreadConfig::sanitized) and the world setters clamp
//! them to a safe minimum and log a warning. Only the threaded driver's
//! tick rate is validated strictly, because a bad rate cannot be turned
//! into a sleep duration.

use std::error::Error;
use std::fmt;

use blight_core::EffectSpec;
use blight_spread::ConversionPolicy;

/// Smallest per-cycle conversion budget.
pub const MIN_BUDGET: u32 = 1;

/// Largest per-cycle conversion budget.
pub const MAX_BUDGET: u32 = 1_000_000;

/// Frontier pops allowed per cycle, as a multiple of the budget.
pub const DEQUEUE_CEILING_FACTOR: u32 = 64;

/// Smallest cycle or effect interval, in ticks.
pub const MIN_INTERVAL_TICKS: u32 = 1;

/// Default tick rate for [`RealtimeSpreadWorld`](crate::realtime::RealtimeSpreadWorld).
pub const DEFAULT_TICK_RATE_HZ: f64 = 20.0;

/// Clamp a budget into `[MIN_BUDGET, MAX_BUDGET]`, warning if it moved.
pub fn clamp_budget(budget: u32) -> u32 {
    let clamped = budget.clamp(MIN_BUDGET, MAX_BUDGET);
    if clamped != budget {
        log::warn!("budget {budget} out of range, clamped to {clamped}");
    }
    clamped
}

/// Clamp an interval to at least [`MIN_INTERVAL_TICKS`], warning if it moved.
pub fn clamp_interval(what: &str, ticks: u32) -> u32 {
    let clamped = ticks.max(MIN_INTERVAL_TICKS);
    if clamped != ticks {
        log::warn!("{what} {ticks} out of range, clamped to {clamped}");
    }
    clamped
}

// ── SpreadConfig ───────────────────────────────────────────────────

/// Configuration for the spread cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct SpreadConfig {
    /// Global enable flag. When off, cycles skip conversion but region
    /// housekeeping still runs. Default: true.
    pub enabled: bool,
    /// Ticks between cycles. Default: 1. Minimum: 1.
    pub cycle_interval_ticks: u32,
    /// Maximum successful conversions per cycle. Default: 100.
    /// Clamped to `[MIN_BUDGET, MAX_BUDGET]`.
    pub budget: u32,
    /// Ticks an engine-loaded region must stay work-free before it is
    /// released. Default: 200.
    pub release_grace_ticks: u64,
    /// Conversion target and exclusion rules.
    pub policy: ConversionPolicy,
}

impl Default for SpreadConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cycle_interval_ticks: 1,
            budget: 100,
            release_grace_ticks: 200,
            policy: ConversionPolicy::default(),
        }
    }
}

impl SpreadConfig {
    /// Clamp every out-of-range tunable to its safe minimum.
    pub fn sanitized(mut self) -> Self {
        self.budget = clamp_budget(self.budget);
        self.cycle_interval_ticks = clamp_interval("cycle interval", self.cycle_interval_ticks);
        self
    }
}

// ── EffectConfig ───────────────────────────────────────────────────

/// Where an actor must be for the area effect to apply.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EffectPlacement {
    /// The voxel directly beneath the actor is converted.
    #[default]
    StandingOn,
    /// The actor's own voxel is converted.
    Inside,
}

/// Configuration for the area effect task.
#[derive(Clone, Debug, PartialEq)]
pub struct EffectConfig {
    /// Effect enable flag, independent of the spread flag. Default: false.
    pub enabled: bool,
    /// Ticks between effect passes. Default: 20. Minimum: 1.
    pub interval_ticks: u32,
    /// The effect applied to qualifying actors.
    pub effect: EffectSpec,
    /// Positional condition. Default: [`EffectPlacement::StandingOn`].
    pub placement: EffectPlacement,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval_ticks: 20,
            effect: EffectSpec::default(),
            placement: EffectPlacement::StandingOn,
        }
    }
}

impl EffectConfig {
    /// Clamp every out-of-range tunable to its safe minimum.
    pub fn sanitized(mut self) -> Self {
        self.interval_ticks = clamp_interval("effect interval", self.interval_ticks);
        if self.effect.duration_ticks == 0 {
            log::warn!("effect duration 0 out of range, clamped to 1");
            self.effect.duration_ticks = 1;
        }
        self
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Errors detected when constructing a world.
#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// tick_rate_hz is NaN, infinite, zero, negative, or subnormal.
    InvalidTickRate {
        /// The invalid value.
        value: f64,
    },
    /// The tick thread could not be spawned.
    ThreadSpawnFailed {
        /// Description of the failure.
        reason: String,
    },
    /// The world could not be recovered from the tick thread (it panicked).
    EngineRecoveryFailed,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTickRate { value } => {
                write!(f, "tick_rate_hz must be finite and positive, got {value}")
            }
            Self::ThreadSpawnFailed { reason } => write!(f, "thread spawn failed: {reason}"),
            Self::EngineRecoveryFailed => {
                write!(f, "world could not be recovered from tick thread")
            }
        }
    }
}

impl Error for ConfigError {}

// ── EngineConfig ───────────────────────────────────────────────────

/// Complete configuration for a spread world.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EngineConfig {
    /// Spread cycle settings.
    pub spread: SpreadConfig,
    /// Area effect settings.
    pub effect: EffectConfig,
    /// Target tick rate for the threaded driver. `None` uses
    /// [`DEFAULT_TICK_RATE_HZ`]. Ignored by the lockstep driver.
    pub tick_rate_hz: Option<f64>,
}

impl EngineConfig {
    /// Check the invariants that cannot be clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // The reciprocal must also be finite: a subnormal rate gives
        // 1.0/hz = inf, which panics in Duration::from_secs_f64.
        if let Some(hz) = self.tick_rate_hz {
            if !hz.is_finite() || hz <= 0.0 || !(1.0 / hz).is_finite() {
                return Err(ConfigError::InvalidTickRate { value: hz });
            }
        }
        Ok(())
    }

    /// Clamp every out-of-range tunable.
    pub fn sanitized(self) -> Self {
        Self {
            spread: self.spread.sanitized(),
            effect: self.effect.sanitized(),
            tick_rate_hz: self.tick_rate_hz,
        }
    }

    /// The tick rate the threaded driver will run at.
    pub fn resolved_tick_rate_hz(&self) -> f64 {
        self.tick_rate_hz.unwrap_or(DEFAULT_TICK_RATE_HZ)
    }
}
