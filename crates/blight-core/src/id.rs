//! Strongly-typed identifiers and the voxel/region key types.

use smallvec::{smallvec, SmallVec};
use std::fmt;

/// Lateral width, in voxels, of one region along both X and Z.
///
/// A region spans `REGION_SPAN × REGION_SPAN` columns and the full
/// vertical extent of its space.
pub const REGION_SPAN: i32 = 16;

/// Identifies a space (one independent voxel grid, e.g. a world or
/// dimension) known to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SpaceId(pub u32);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SpaceId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Identifies an actor (player, creature) that can receive a status effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActorId(pub u64);

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ActorId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Monotonically increasing host tick counter.
///
/// All engine timestamps (cycle phases, release deadlines) are measured
/// in host ticks rather than wall-clock time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TickId(pub u64);

impl TickId {
    /// The tick `ticks` after this one, saturating at `u64::MAX`.
    pub fn after(self, ticks: u64) -> Self {
        Self(self.0.saturating_add(ticks))
    }
}

impl fmt::Display for TickId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for TickId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identity of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VoxelKey {
    /// Owning space.
    pub space: SpaceId,
    /// Lateral X coordinate.
    pub x: i32,
    /// Vertical coordinate.
    pub y: i32,
    /// Lateral Z coordinate.
    pub z: i32,
}

impl VoxelKey {
    /// Construct a key from its parts.
    pub const fn new(space: SpaceId, x: i32, y: i32, z: i32) -> Self {
        Self { space, x, y, z }
    }

    /// The region containing this voxel, [`REGION_SPAN`] cells on a side.
    ///
    /// Uses floor division, so `x = -1` lies in region `-1`, not `0`.
    pub fn region(&self) -> RegionKey {
        RegionKey {
            space: self.space,
            rx: self.x.div_euclid(REGION_SPAN),
            rz: self.z.div_euclid(REGION_SPAN),
        }
    }

    /// The voxel offset by `(dx, dy, dz)`, wrapping on `i32` overflow.
    pub fn offset(&self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            space: self.space,
            x: self.x.wrapping_add(dx),
            y: self.y.wrapping_add(dy),
            z: self.z.wrapping_add(dz),
        }
    }

    /// The voxel directly beneath this one.
    pub fn below(&self) -> Self {
        self.offset(0, -1, 0)
    }

    /// The six axis-aligned neighbours in the fixed order
    /// +X, −X, +Y, −Y, +Z, −Z.
    ///
    /// Callers are responsible for discarding vertical neighbours that
    /// fall outside the space's extent.
    pub fn neighbours(&self) -> SmallVec<[VoxelKey; 6]> {
        smallvec![
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }

    /// Manhattan distance to `other`, ignoring the space.
    pub fn manhattan(&self, other: &VoxelKey) -> u64 {
        let dx = (i64::from(self.x) - i64::from(other.x)).unsigned_abs();
        let dy = (i64::from(self.y) - i64::from(other.y)).unsigned_abs();
        let dz = (i64::from(self.z) - i64::from(other.z)).unsigned_abs();
        dx + dy + dz
    }
}

impl fmt::Display for VoxelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:({}, {}, {})", self.space, self.x, self.y, self.z)
    }
}

/// Identity of a coarse region: a `REGION_SPAN × REGION_SPAN` column
/// covering the full vertical extent of one space.
///
/// Regions are the unit of residency: a voxel can only be read or
/// written while its region is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegionKey {
    /// Owning space.
    pub space: SpaceId,
    /// Region X index (`voxel.x.div_euclid(REGION_SPAN)`).
    pub rx: i32,
    /// Region Z index (`voxel.z.div_euclid(REGION_SPAN)`).
    pub rz: i32,
}

impl RegionKey {
    /// Construct a key from its parts.
    pub const fn new(space: SpaceId, rx: i32, rz: i32) -> Self {
        Self { space, rx, rz }
    }

    /// Whether `voxel` lies inside this region.
    pub fn contains(&self, voxel: &VoxelKey) -> bool {
        voxel.region() == *self
    }
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:[{}, {}]", self.space, self.rx, self.rz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: SpaceId = SpaceId(0);

    #[test]
    fn region_of_positive_coords() {
        let k = VoxelKey::new(S, 17, 64, 31);
        assert_eq!(k.region(), RegionKey::new(S, 1, 1));
        let k = VoxelKey::new(S, 0, 0, 15);
        assert_eq!(k.region(), RegionKey::new(S, 0, 0));
    }

    #[test]
    fn region_of_negative_coords_floors() {
        let k = VoxelKey::new(S, -1, 0, -16);
        assert_eq!(k.region(), RegionKey::new(S, -1, -1));
        let k = VoxelKey::new(S, -17, 0, -15);
        assert_eq!(k.region(), RegionKey::new(S, -2, -1));
    }

    #[test]
    fn region_ignores_y() {
        let a = VoxelKey::new(S, 3, -64, 3);
        let b = VoxelKey::new(S, 3, 319, 3);
        assert_eq!(a.region(), b.region());
    }

    #[test]
    fn neighbours_fixed_order() {
        let k = VoxelKey::new(S, 0, 0, 0);
        let n = k.neighbours();
        assert_eq!(
            n.as_slice(),
            &[
                VoxelKey::new(S, 1, 0, 0),
                VoxelKey::new(S, -1, 0, 0),
                VoxelKey::new(S, 0, 1, 0),
                VoxelKey::new(S, 0, -1, 0),
                VoxelKey::new(S, 0, 0, 1),
                VoxelKey::new(S, 0, 0, -1),
            ]
        );
        assert!(n.iter().all(|m| m.manhattan(&k) == 1));
    }

    #[test]
    fn region_contains_matches_region_of() {
        let r = RegionKey::new(S, -1, 2);
        assert!(r.contains(&VoxelKey::new(S, -16, 5, 32)));
        assert!(r.contains(&VoxelKey::new(S, -1, 5, 47)));
        assert!(!r.contains(&VoxelKey::new(S, 0, 5, 32)));
        assert!(!r.contains(&VoxelKey::new(SpaceId(1), -1, 5, 32)));
    }

    #[test]
    fn tick_after_saturates() {
        assert_eq!(TickId(5).after(10), TickId(15));
        assert_eq!(TickId(u64::MAX - 1).after(10), TickId(u64::MAX));
    }

    #[test]
    fn display_formats() {
        assert_eq!(VoxelKey::new(S, 1, -2, 3).to_string(), "0:(1, -2, 3)");
        assert_eq!(RegionKey::new(SpaceId(2), -1, 4).to_string(), "2:[-1, 4]");
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn region_covers_span(x in -10_000i32..10_000, z in -10_000i32..10_000) {
                let r = VoxelKey::new(S, x, 0, z).region();
                prop_assert!(r.rx * REGION_SPAN <= x && x < (r.rx + 1) * REGION_SPAN);
                prop_assert!(r.rz * REGION_SPAN <= z && z < (r.rz + 1) * REGION_SPAN);
            }
        }
    }
}
