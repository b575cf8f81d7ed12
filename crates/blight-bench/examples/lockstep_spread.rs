//! End-to-end lockstep spread example.
//!
//! Demonstrates: build config → LockstepSpreadWorld → seed → step →
//! enable the area effect → reset → shut down.

use blight_bench::{reference_profile, seed_grid};
use blight_core::{ActorId, SpaceId, VoxelKey};
use blight_engine::LockstepSpreadWorld;
use blight_test_utils::open_world;

fn main() {
    env_logger::init();
    println!("=== Blight Lockstep Spread Example ===\n");

    let shared = open_world();
    let mut config = reference_profile();
    config.effect.interval_ticks = 10;
    let mut world = LockstepSpreadWorld::new(config, shared.host()).unwrap();

    // --- Phase 1: spread from four seeds ---
    println!("Phase 1: 100 ticks from 4 seeds");
    let accepted = world.seed_many(seed_grid(SpaceId(0), 2, 0));
    println!("  seeded {accepted}");

    for _ in 0..100 {
        let report = world.step();
        let tick = report.tick.0;
        if tick % 25 == 0 {
            let cycle = world.last_cycle_metrics();
            println!(
                "  tick {:>3}: converted={:>4}, frontier={:>5}, regions held={:>2}, time={:>5}μs",
                tick,
                world.stats().converted,
                world.frontier_size(),
                world.engine_loaded_regions(),
                cycle.elapsed_us,
            );
        }
    }

    // --- Phase 2: the area effect ---
    println!("\nPhase 2: area effect on two actors");
    {
        let mut w = shared.lock();
        w.add_actor(ActorId(1), VoxelKey::new(SpaceId(0), 8, 1, 8));
        w.add_actor(ActorId(2), VoxelKey::new(SpaceId(0), 500, 1, 500));
    }
    world.set_effect_enabled(true);
    for _ in 0..50 {
        world.step();
    }
    {
        let w = shared.lock();
        println!(
            "  actor 1 affected {} times, actor 2 affected {} times",
            w.applied_to(ActorId(1)),
            w.applied_to(ActorId(2)),
        );
    }

    // --- Phase 3: reset and shut down ---
    let released = world.reset();
    println!("\nReset: released {released} regions");
    world.shutdown();
    println!(
        "Shutdown: {} regions still resident",
        shared.lock().resident_count()
    );
}
