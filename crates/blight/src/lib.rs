//! Blight: a bounded-rate spread engine for sparse voxel worlds.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all Blight sub-crates. For most hosts, adding `blight` as a single
//! dependency is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use blight::prelude::*;
//! use blight_test_utils::open_world;
//!
//! // The mock world implements every collaborator trait; a real host
//! // plugs in its own region loader, voxel accessor, and actor hooks.
//! let shared = open_world();
//! let mut world = LockstepSpreadWorld::new(EngineConfig::default(), shared.host()).unwrap();
//!
//! world.seed(VoxelKey::new(SpaceId(0), 0, 0, 0));
//! let report = world.step();
//! assert_eq!(report.tick, TickId(1));
//! assert_eq!(report.cycle.unwrap().converted, 100);
//!
//! world.shutdown();
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `blight-core` | Keys, cell state, effects, errors, collaborator traits |
//! | [`spread`] | `blight-spread` | Frontier, region residency, infected index, conversion policy |
//! | [`engine`] | `blight-engine` | Cycle and effect scheduling, lockstep and threaded worlds |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types, traits, and IDs (`blight-core`).
///
/// Contains voxel and region keys, [`types::CellState`], effect specs,
/// [`types::SpreadError`], and the collaborator traits a host implements
/// ([`types::RegionLoader`], [`types::VoxelAccessor`],
/// [`types::ActorLocator`], [`types::EffectApplier`]).
pub use blight_core as types;

/// Spread data structures (`blight-spread`).
///
/// Most hosts never touch these directly; the engine owns them.
pub use blight_spread as spread;

/// Scheduling and world drivers (`blight-engine`).
///
/// [`engine::LockstepSpreadWorld`] for hosts that step the engine from
/// their own loop, [`engine::RealtimeSpreadWorld`] for a dedicated tick
/// thread.
pub use blight_engine as engine;

/// Common imports for typical Blight usage.
///
/// ```rust
/// use blight::prelude::*;
/// ```
///
/// This imports the world drivers, their configuration, the key types,
/// and the collaborator traits.
pub mod prelude {
    // Core types and traits
    pub use blight_core::{
        ActorId, ActorLocator, CellState, EffectApplier, EffectKind, EffectSpec, Host,
        RegionKey, RegionLoader, SpaceId, TickId, VerticalExtent, VoxelAccessor, VoxelKey,
    };

    // Errors
    pub use blight_core::SpreadError;
    pub use blight_engine::{ConfigError, SubmitError};

    // Engine
    pub use blight_engine::{
        CycleMetrics, EffectConfig, EffectPlacement, EngineConfig, LockstepSpreadWorld,
        RealtimeSpreadWorld, SpreadConfig, StepReport,
    };

    // Policy
    pub use blight_spread::ConversionPolicy;
}
