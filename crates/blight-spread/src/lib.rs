//! Wavefront, region residency, and conversion policy.
//!
//! The building blocks the cycle scheduler drives each tick:
//!
//! - [`SpreadFrontier`]: FIFO wavefront with a lifetime dedup set and
//!   per-region pending-work counts.
//! - [`RegionLifecycleManager`]: loads regions on demand and releases the
//!   ones the engine loaded after an idle grace period.
//! - [`InfectedRegionIndex`]: regions holding at least one converted voxel.
//! - [`ConversionPolicy`]: the idempotent per-cell conversion rule.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod convert;
pub mod frontier;
pub mod index;
pub mod residency;

pub use convert::{Conversion, ConversionPolicy};
pub use frontier::SpreadFrontier;
pub use index::InfectedRegionIndex;
pub use residency::{HousekeepingOutcome, LoadOutcome, RegionLifecycleManager};
