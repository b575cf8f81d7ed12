//! Benchmark profiles and utilities for the Blight spread engine.
//!
//! Provides pre-built [`EngineConfig`] profiles for benchmarking and demos:
//!
//! - [`reference_profile`]: budget 100, one cycle per tick (the defaults)
//! - [`stress_profile`]: budget 10K for wide wavefronts
//! - [`seed_grid`]: deterministic seed placement, one per region

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use blight_core::{SpaceId, VoxelKey, REGION_SPAN};
use blight_engine::{EngineConfig, SpreadConfig};

/// Build the reference benchmark profile: budget 100, interval 1.
///
/// Grace is shortened to 20 ticks so release shows up in short runs.
pub fn reference_profile() -> EngineConfig {
    EngineConfig {
        spread: SpreadConfig {
            budget: 100,
            cycle_interval_ticks: 1,
            release_grace_ticks: 20,
            ..SpreadConfig::default()
        },
        ..EngineConfig::default()
    }
}

/// Build the stress benchmark profile: budget 10K.
///
/// Same as [`reference_profile`] at 100x the per-cycle work.
pub fn stress_profile() -> EngineConfig {
    let mut config = reference_profile();
    config.spread.budget = 10_000;
    config
}

/// Place `n * n` seeds on a square grid, one at the centre of each region,
/// starting at region (0, 0) and at height `y`.
pub fn seed_grid(space: SpaceId, n: i32, y: i32) -> Vec<VoxelKey> {
    let half = REGION_SPAN / 2;
    let mut seeds = Vec::with_capacity((n * n).max(0) as usize);
    for i in 0..n {
        for j in 0..n {
            seeds.push(VoxelKey::new(
                space,
                i * REGION_SPAN + half,
                y,
                j * REGION_SPAN + half,
            ));
        }
    }
    seeds
}
