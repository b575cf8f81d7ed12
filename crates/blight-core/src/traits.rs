//! Collaborator traits implemented by the host.
//!
//! The engine is agnostic to how regions are paged in, where voxel
//! state lives, or what an actor is. Hosts implement these four traits
//! over their own world representation. All of them are `Send` so a
//! host can move its collaborators onto a dedicated tick thread.

use std::fmt;

use crate::cell::{CellState, VerticalExtent};
use crate::effect::EffectSpec;
use crate::error::SpreadError;
use crate::id::{ActorId, RegionKey, SpaceId, VoxelKey};

/// Pages regions in and out of residency.
pub trait RegionLoader: Send {
    /// Make `region` resident. Must complete or fail within the call.
    ///
    /// Returns [`SpreadError::ResourceUnavailable`] or
    /// [`SpreadError::SpaceRemoved`] on failure.
    fn load(&mut self, region: RegionKey) -> Result<(), SpreadError>;

    /// Release a region previously loaded through [`load`](Self::load).
    fn release(&mut self, region: RegionKey);

    /// Whether `region` is currently resident, by any means.
    ///
    /// Regions of removed spaces are never resident.
    fn is_resident(&self, region: RegionKey) -> bool;
}

/// Reads and writes single voxels.
///
/// Only called for voxels whose region is resident.
pub trait VoxelAccessor: Send {
    /// Vertical bounds of `space`, or `None` if the space no longer exists.
    fn extent(&self, space: SpaceId) -> Option<VerticalExtent>;

    /// Current state of `voxel`, or `None` if its space no longer exists.
    fn read(&self, voxel: VoxelKey) -> Option<CellState>;

    /// Overwrite the state of `voxel`.
    ///
    /// Returns [`SpreadError::WriteRejected`] if the write is structurally
    /// impossible.
    fn write(&mut self, voxel: VoxelKey, state: CellState) -> Result<(), SpreadError>;

    /// Whether `voxel` belongs to a category the conversion policy may
    /// exclude (e.g. a container-like cell).
    fn is_excluded_category(&self, voxel: VoxelKey) -> bool;
}

/// Enumerates the actors eligible for area effects.
pub trait ActorLocator: Send {
    /// Every currently active actor with the voxel it occupies (feet).
    fn actors(&self) -> Vec<(ActorId, VoxelKey)>;
}

/// Applies status effects to actors.
pub trait EffectApplier: Send {
    /// Apply `effect` to `actor`, refreshing it if already active.
    fn apply(&mut self, actor: ActorId, effect: &EffectSpec);
}

/// The four collaborators a world driver needs, boxed for ownership.
///
/// Single-threaded drivers borrow the pieces per tick; the threaded
/// driver moves the whole bundle onto its tick thread.
pub struct Host {
    /// Region residency.
    pub regions: Box<dyn RegionLoader>,
    /// Voxel storage.
    pub voxels: Box<dyn VoxelAccessor>,
    /// Actor roster for area effects.
    pub actors: Box<dyn ActorLocator>,
    /// Effect sink for area effects.
    pub effects: Box<dyn EffectApplier>,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
