//! Test utilities and mock collaborators for Blight development.
//!
//! [`MockWorld`] is an in-memory voxel world with region residency,
//! actors, and an effect log. [`SharedWorld`] wraps it in an
//! `Arc<Mutex<_>>` and implements all four collaborator traits, so a
//! test can hand clones to the engine while keeping one for assertions.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use blight_core::{
    ActorId, ActorLocator, CellState, EffectApplier, EffectSpec, Host, RegionKey, RegionLoader,
    SpaceId, SpreadError, VerticalExtent, VoxelAccessor, VoxelKey,
};

pub use fixtures::{open_world, TEST_SPACE};

/// In-memory world backing the mock collaborators.
///
/// Cells that were never [`set`](MockWorld::set) read as the space's
/// fill state. Reads and writes on non-resident regions are counted in
/// [`residency_violations`](MockWorld::residency_violations) rather than
/// failing, so tests can assert the engine never touches them.
#[derive(Debug, Default)]
pub struct MockWorld {
    spaces: HashMap<SpaceId, (VerticalExtent, CellState)>,
    cells: HashMap<VoxelKey, CellState>,
    excluded: HashSet<VoxelKey>,
    read_only: HashSet<VoxelKey>,
    resident: HashSet<RegionKey>,
    failing: HashSet<RegionKey>,
    loads: Vec<RegionKey>,
    releases: Vec<RegionKey>,
    writes: Vec<VoxelKey>,
    residency_violations: usize,
    actors: Vec<(ActorId, VoxelKey)>,
    applied: Vec<(ActorId, EffectSpec)>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a space with its extent and the state unset cells read as.
    pub fn add_space(&mut self, space: SpaceId, extent: VerticalExtent, fill: CellState) {
        self.spaces.insert(space, (extent, fill));
    }

    /// Remove a space: its regions stop being resident and every
    /// subsequent read, write, or load reports it as gone.
    pub fn remove_space(&mut self, space: SpaceId) {
        self.spaces.remove(&space);
        self.resident.retain(|r| r.space != space);
    }

    pub fn set(&mut self, voxel: VoxelKey, state: CellState) {
        self.cells.insert(voxel, state);
    }

    /// Current state, bypassing residency checks.
    pub fn state(&self, voxel: VoxelKey) -> Option<CellState> {
        let (_, fill) = self.spaces.get(&voxel.space)?;
        Some(self.cells.get(&voxel).copied().unwrap_or(*fill))
    }

    /// Mark a voxel as an excluded category (container-like).
    pub fn exclude(&mut self, voxel: VoxelKey) {
        self.excluded.insert(voxel);
    }

    /// Make every write to `voxel` fail with `WriteRejected`.
    pub fn reject_writes(&mut self, voxel: VoxelKey) {
        self.read_only.insert(voxel);
    }

    /// Make every load of `region` fail with `ResourceUnavailable`.
    pub fn fail_region(&mut self, region: RegionKey) {
        self.failing.insert(region);
    }

    pub fn heal_region(&mut self, region: RegionKey) {
        self.failing.remove(&region);
    }

    /// Make a region resident without going through `load`, as if some
    /// unrelated activity owned it.
    pub fn make_resident(&mut self, region: RegionKey) {
        self.resident.insert(region);
    }

    /// Drop residency without going through `release`.
    pub fn evict(&mut self, region: RegionKey) {
        self.resident.remove(&region);
    }

    pub fn is_resident(&self, region: RegionKey) -> bool {
        self.resident.contains(&region)
    }

    pub fn resident_count(&self) -> usize {
        self.resident.len()
    }

    /// Every successful `load`, in call order.
    pub fn loads(&self) -> &[RegionKey] {
        &self.loads
    }

    /// Every `release`, in call order.
    pub fn releases(&self) -> &[RegionKey] {
        &self.releases
    }

    /// Every successful write, in call order.
    pub fn writes(&self) -> &[VoxelKey] {
        &self.writes
    }

    pub fn residency_violations(&self) -> usize {
        self.residency_violations
    }

    /// All cells currently holding `state`, sorted.
    pub fn cells_in_state(&self, state: CellState) -> Vec<VoxelKey> {
        let mut out: Vec<VoxelKey> = self
            .cells
            .iter()
            .filter(|(_, s)| **s == state)
            .map(|(k, _)| *k)
            .collect();
        out.sort();
        out
    }

    pub fn add_actor(&mut self, actor: ActorId, at: VoxelKey) {
        self.actors.push((actor, at));
    }

    pub fn move_actor(&mut self, actor: ActorId, to: VoxelKey) {
        if let Some(entry) = self.actors.iter_mut().find(|(a, _)| *a == actor) {
            entry.1 = to;
        }
    }

    /// Every effect application, in call order.
    pub fn applied(&self) -> &[(ActorId, EffectSpec)] {
        &self.applied
    }

    pub fn applied_to(&self, actor: ActorId) -> usize {
        self.applied.iter().filter(|(a, _)| *a == actor).count()
    }

    fn check_resident(&mut self, voxel: VoxelKey) {
        if !self.resident.contains(&voxel.region()) {
            self.residency_violations += 1;
        }
    }
}

/// Cloneable handle over a [`MockWorld`] implementing every collaborator
/// trait.
///
/// Each trait call takes the lock for its own duration only, so clones
/// can be passed simultaneously as `&mut dyn RegionLoader` and
/// `&mut dyn VoxelAccessor`.
#[derive(Clone, Debug, Default)]
pub struct SharedWorld {
    inner: Arc<Mutex<MockWorld>>,
}

impl SharedWorld {
    pub fn new(world: MockWorld) -> Self {
        Self {
            inner: Arc::new(Mutex::new(world)),
        }
    }

    /// Lock the world for setup or inspection.
    pub fn lock(&self) -> MutexGuard<'_, MockWorld> {
        self.inner.lock().unwrap()
    }

    /// Bundle clones of this handle as a [`Host`].
    pub fn host(&self) -> Host {
        Host {
            regions: Box::new(self.clone()),
            voxels: Box::new(self.clone()),
            actors: Box::new(self.clone()),
            effects: Box::new(self.clone()),
        }
    }
}

impl RegionLoader for SharedWorld {
    fn load(&mut self, region: RegionKey) -> Result<(), SpreadError> {
        let mut w = self.lock();
        if !w.spaces.contains_key(&region.space) {
            return Err(SpreadError::SpaceRemoved {
                space: region.space,
            });
        }
        if w.failing.contains(&region) {
            return Err(SpreadError::ResourceUnavailable {
                region,
                reason: "mock load failure".into(),
            });
        }
        w.resident.insert(region);
        w.loads.push(region);
        Ok(())
    }

    fn release(&mut self, region: RegionKey) {
        let mut w = self.lock();
        w.resident.remove(&region);
        w.releases.push(region);
    }

    fn is_resident(&self, region: RegionKey) -> bool {
        self.lock().resident.contains(&region)
    }
}

impl VoxelAccessor for SharedWorld {
    fn extent(&self, space: SpaceId) -> Option<VerticalExtent> {
        self.lock().spaces.get(&space).map(|(e, _)| *e)
    }

    fn read(&self, voxel: VoxelKey) -> Option<CellState> {
        let mut w = self.lock();
        w.check_resident(voxel);
        w.state(voxel)
    }

    fn write(&mut self, voxel: VoxelKey, state: CellState) -> Result<(), SpreadError> {
        let mut w = self.lock();
        if !w.spaces.contains_key(&voxel.space) {
            return Err(SpreadError::SpaceRemoved { space: voxel.space });
        }
        w.check_resident(voxel);
        if w.read_only.contains(&voxel) {
            return Err(SpreadError::WriteRejected { voxel });
        }
        w.cells.insert(voxel, state);
        w.writes.push(voxel);
        Ok(())
    }

    fn is_excluded_category(&self, voxel: VoxelKey) -> bool {
        self.lock().excluded.contains(&voxel)
    }
}

impl ActorLocator for SharedWorld {
    fn actors(&self) -> Vec<(ActorId, VoxelKey)> {
        self.lock().actors.clone()
    }
}

impl EffectApplier for SharedWorld {
    fn apply(&mut self, actor: ActorId, effect: &EffectSpec) {
        self.lock().applied.push((actor, effect.clone()));
    }
}
