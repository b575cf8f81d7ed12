//! Scheduling for the Blight spread engine.
//!
//! Drives the spread cycle and the area effect on fixed tick intervals.
//! Supports lockstep mode ([`LockstepSpreadWorld`], stepped by the host's
//! own loop) and threaded mode ([`RealtimeSpreadWorld`], stepped by a
//! background thread at a fixed rate).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod cycle;
pub mod effect;
pub mod lockstep;
pub mod metrics;
pub mod realtime;
pub(crate) mod tick_thread;

pub use config::{ConfigError, EffectConfig, EffectPlacement, EngineConfig, SpreadConfig};
pub use cycle::SpreadCycleScheduler;
pub use effect::AreaEffectScheduler;
pub use lockstep::{LockstepSpreadWorld, StepReport};
pub use metrics::{CycleMetrics, EffectMetrics, EngineStats};
pub use realtime::{EngineCommand, RealtimeSpreadWorld, ShutdownReport, SubmitError};
