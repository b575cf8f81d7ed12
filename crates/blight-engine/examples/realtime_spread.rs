//! RealtimeSpreadWorld: spread driven by a background tick thread.
//!
//! Demonstrates:
//!   1. Creating a RealtimeSpreadWorld with a `blight-tick` thread
//!   2. Submitting seeds and budget changes over the command channel
//!   3. Reading published counters while ticks happen in the background
//!   4. Graceful shutdown, which releases every region the engine loaded
//!
//! # Lockstep vs. Realtime
//!
//! In **lockstep** mode (`LockstepSpreadWorld`), the host calls `step()`
//! from its own game loop. One call is one host tick.
//!
//! In **realtime** mode (`RealtimeSpreadWorld`), a dedicated thread owns
//! the world and steps it at a fixed rate. The host only sends commands
//! and reads counters, so a slow cycle never stalls the host loop.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example realtime_spread

use std::thread;
use std::time::Duration;

use blight_core::{SpaceId, VoxelKey};
use blight_engine::{EngineConfig, RealtimeSpreadWorld, SpreadConfig};
use blight_test_utils::open_world;

fn main() {
    env_logger::init();

    let shared = open_world();
    let config = EngineConfig {
        spread: SpreadConfig {
            budget: 200,
            release_grace_ticks: 40,
            ..SpreadConfig::default()
        },
        tick_rate_hz: Some(60.0),
        ..EngineConfig::default()
    };
    let mut world = RealtimeSpreadWorld::new(config, shared.host()).unwrap();
    println!("tick thread running at {} Hz", world.tick_rate_hz());

    world.seed(VoxelKey::new(SpaceId(0), 0, 0, 0)).unwrap();

    for i in 0..5 {
        thread::sleep(Duration::from_millis(200));
        println!(
            "  t+{:>4}ms: tick {:>3}, converted {:>5}, frontier {:>5}, regions held {:>2}",
            (i + 1) * 200,
            world.current_tick(),
            world.converted_total(),
            world.frontier_size(),
            world.engine_loaded_regions(),
        );
        if i == 2 {
            println!("  doubling the budget");
            world.set_budget(400).unwrap();
        }
    }

    let report = world.shutdown();
    println!(
        "shutdown in {}ms, released {} regions, {} still resident",
        report.total_ms,
        report.regions_released,
        shared.lock().resident_count(),
    );
}
