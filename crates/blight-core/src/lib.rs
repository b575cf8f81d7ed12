//! Core types and traits for the Blight spread engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the value types every other crate keys on (voxels, regions, spaces,
//! ticks), the cell state written by conversion, the status effect
//! description, error types, and the collaborator traits a host
//! implements to give the engine access to its world.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod cell;
pub mod effect;
pub mod error;
pub mod id;
pub mod traits;

pub use cell::{CellState, VerticalExtent};
pub use effect::{EffectKind, EffectSpec};
pub use error::SpreadError;
pub use id::{ActorId, RegionKey, SpaceId, TickId, VoxelKey, REGION_SPAN};
pub use traits::{ActorLocator, EffectApplier, Host, RegionLoader, VoxelAccessor};
