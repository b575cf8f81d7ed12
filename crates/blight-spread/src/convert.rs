//! Per-cell conversion rule.
//!
//! Conversion is idempotent: evaluating a voxel that is already in the
//! target state is a no-op that writes nothing, so the cycle can safely
//! re-evaluate any voxel any number of times.

use blight_core::{CellState, SpreadError, VoxelAccessor, VoxelKey};

/// Why a conversion attempt did or did not write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Conversion {
    /// The voxel was written to the target state.
    Converted,
    /// Already in the target state.
    AlreadyTarget,
    /// Empty space, and the policy does not convert empty space.
    EmptySpace,
    /// Excluded category (container-like), and the policy skips those.
    Excluded,
    /// The write was structurally impossible.
    WriteRejected,
    /// The voxel's space no longer exists.
    SpaceRemoved,
}

impl Conversion {
    /// Whether this attempt consumed budget.
    pub fn is_converted(self) -> bool {
        self == Self::Converted
    }
}

/// What to convert voxels into, and which voxels to leave alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversionPolicy {
    /// State written on conversion.
    pub target: CellState,
    /// Convert empty space too. When `false`, empty voxels are skipped.
    pub convert_empty: bool,
    /// Skip voxels the accessor reports as an excluded category.
    pub exclude_special: bool,
}

impl Default for ConversionPolicy {
    fn default() -> Self {
        Self {
            target: CellState::INFECTED,
            convert_empty: false,
            exclude_special: true,
        }
    }
}

impl ConversionPolicy {
    /// Convert `voxel` unless it is already converted or excluded.
    ///
    /// The voxel's region must be resident.
    pub fn try_convert(&self, voxels: &mut dyn VoxelAccessor, voxel: VoxelKey) -> Conversion {
        let Some(state) = voxels.read(voxel) else {
            return Conversion::SpaceRemoved;
        };
        if state == self.target {
            return Conversion::AlreadyTarget;
        }
        if state.is_empty() && !self.convert_empty {
            return Conversion::EmptySpace;
        }
        if self.exclude_special && voxels.is_excluded_category(voxel) {
            return Conversion::Excluded;
        }
        match voxels.write(voxel, self.target) {
            Ok(()) => Conversion::Converted,
            Err(SpreadError::SpaceRemoved { .. }) => Conversion::SpaceRemoved,
            Err(err) => {
                log::trace!("{err}");
                Conversion::WriteRejected
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blight_core::VoxelAccessor;
    use blight_test_utils::fixtures::STONE;
    use blight_test_utils::{open_world, TEST_SPACE};

    fn resident_voxel(world: &blight_test_utils::SharedWorld, x: i32) -> VoxelKey {
        let k = VoxelKey::new(TEST_SPACE, x, 0, 0);
        world.lock().make_resident(k.region());
        k
    }

    #[test]
    fn converts_once_then_noops() {
        let mut world = open_world();
        let k = resident_voxel(&world, 0);
        let policy = ConversionPolicy::default();
        assert_eq!(policy.try_convert(&mut world, k), Conversion::Converted);
        assert_eq!(policy.try_convert(&mut world, k), Conversion::AlreadyTarget);
        assert_eq!(world.lock().writes().len(), 1);
        assert_eq!(world.read(k), Some(CellState::INFECTED));
    }

    #[test]
    fn empty_space_respects_flag() {
        let mut world = open_world();
        let k = resident_voxel(&world, 1);
        world.lock().set(k, CellState::EMPTY);

        let skip = ConversionPolicy::default();
        assert_eq!(skip.try_convert(&mut world, k), Conversion::EmptySpace);

        let fill = ConversionPolicy {
            convert_empty: true,
            ..ConversionPolicy::default()
        };
        assert_eq!(fill.try_convert(&mut world, k), Conversion::Converted);
    }

    #[test]
    fn excluded_category_respects_flag() {
        let mut world = open_world();
        let k = resident_voxel(&world, 2);
        world.lock().exclude(k);

        let policy = ConversionPolicy::default();
        assert_eq!(policy.try_convert(&mut world, k), Conversion::Excluded);
        assert_eq!(world.read(k), Some(STONE));

        let lax = ConversionPolicy {
            exclude_special: false,
            ..ConversionPolicy::default()
        };
        assert_eq!(lax.try_convert(&mut world, k), Conversion::Converted);
    }

    #[test]
    fn rejected_write_is_not_a_conversion() {
        let mut world = open_world();
        let k = resident_voxel(&world, 3);
        world.lock().reject_writes(k);
        let policy = ConversionPolicy::default();
        let outcome = policy.try_convert(&mut world, k);
        assert_eq!(outcome, Conversion::WriteRejected);
        assert!(!outcome.is_converted());
        assert_eq!(world.read(k), Some(STONE));
    }

    #[test]
    fn removed_space_is_reported() {
        let mut world = open_world();
        let k = resident_voxel(&world, 4);
        world.lock().remove_space(TEST_SPACE);
        let policy = ConversionPolicy::default();
        assert_eq!(policy.try_convert(&mut world, k), Conversion::SpaceRemoved);
    }

    #[test]
    fn custom_target() {
        let mut world = open_world();
        let k = resident_voxel(&world, 5);
        let policy = ConversionPolicy {
            target: CellState(42),
            ..ConversionPolicy::default()
        };
        assert!(policy.try_convert(&mut world, k).is_converted());
        assert_eq!(world.read(k), Some(CellState(42)));
    }
}
