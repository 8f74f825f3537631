//! Demonstration of the sampling loop in simulation mode, without reporting.
//!
//! This example shows how to:
//! 1. Build the configuration from the environment
//! 2. Sample simulated readings
//! 3. Derive the busyness score by hand to cross-check a reading
//!
//! Run with: cargo run --example simulated_ticks

use overwatch_sensor::{
    busyness_score,
    config::Config,
    report::LiveUpdate,
    sampler::{Sampler, SimulatedSampler},
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

fn main() {
    println!("Overwatch Sensor - Simulated Ticks Demo");
    println!("=======================================");
    println!();

    let config = Config::from_env().expect("invalid environment");
    println!("Location: {}", config.location_id);
    println!("Would report to: {}", config.api_url);
    println!();

    let mut sampler = Sampler::Simulated(SimulatedSampler::new());

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    for tick in 1..=10 {
        if !running.load(Ordering::SeqCst) {
            break;
        }

        let (reading, frame) = sampler.sample(None).expect("simulated sampling");
        assert!(frame.is_none(), "simulation never produces frames");

        let payload = LiveUpdate::new(&config.location_id, &reading);
        println!(
            "tick {tick}: busyness={} occupancy={} movement={}",
            reading.busyness_score, reading.occupancy, reading.movement_score
        );
        println!(
            "  payload: {}",
            serde_json::to_string(&payload).expect("serialize payload")
        );
        println!(
            "  live-mode derivation would give busyness={}",
            busyness_score(reading.occupancy, reading.movement_score)
        );

        std::thread::sleep(std::time::Duration::from_millis(500));
    }

    println!();
    println!("Demo complete!");
}
