//! Overwatch Sensor CLI
//!
//! Samples room activity at a fixed interval and posts live updates.

use chrono::Utc;
use clap::{Parser, Subcommand};
use overwatch_sensor::{
    config::Config,
    report::BlockingReporter,
    sampler::{Sampler, SimulatedSampler},
    source::{CaptureError, Frame},
    VERSION,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "overwatch-sensor")]
#[command(author = "Overwatch")]
#[command(version = VERSION)]
#[command(about = "Room-activity sensor for the Overwatch live busyness API", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start sampling and reporting
    Start {
        /// Force simulation mode (overrides DUMMY_MODE)
        #[arg(long)]
        simulate: bool,

        /// Force live camera mode (overrides DUMMY_MODE; needs the `live` feature)
        #[arg(long)]
        live: bool,

        /// Endpoint for live updates (overrides API_URL)
        #[arg(long)]
        api_url: Option<String>,

        /// Location identifier (overrides LOCATION_ID)
        #[arg(long)]
        location_id: Option<String>,

        /// Seconds between ticks (overrides UPDATE_INTERVAL_SECS)
        #[arg(long)]
        interval: Option<u64>,

        /// Camera device index (overrides CAMERA_INDEX)
        #[arg(long)]
        camera_index: Option<i32>,

        /// Don't open the live feed window
        #[arg(long)]
        no_display: bool,
    },

    /// Show the resolved configuration
    Config,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            simulate,
            live,
            api_url,
            location_id,
            interval,
            camera_index,
            no_display,
        } => {
            if simulate && live {
                eprintln!("Error: --simulate and --live are mutually exclusive");
                std::process::exit(1);
            }

            let mut config = load_config();
            if simulate {
                config.simulation_mode = true;
            }
            if live {
                config.simulation_mode = false;
            }
            if let Some(url) = api_url {
                config.api_url = url;
            }
            if let Some(id) = location_id {
                config.location_id = id;
            }
            if let Some(secs) = interval {
                config.interval = Duration::from_secs(secs);
            }
            if let Some(index) = camera_index {
                config.camera_index = index;
            }
            if no_display {
                config.display = false;
            }

            cmd_start(&config);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

fn load_config() -> Config {
    match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_start(config: &Config) {
    println!("Overwatch Sensor v{VERSION}");
    println!();
    println!(
        "  Mode: {}",
        if config.simulation_mode {
            "simulated".to_string()
        } else {
            format!("live (camera {})", config.camera_index)
        }
    );
    println!("  Endpoint: {}", config.api_url);
    println!("  Location: {}", config.location_id);
    println!("  Interval: {}s", config.interval.as_secs());
    if !config.simulation_mode {
        println!(
            "  Feed window: {}",
            if config.display { "enabled" } else { "disabled" }
        );
    }
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    let mut sampler = build_sampler(config);

    let reporter = match BlockingReporter::new(config) {
        Ok(reporter) => reporter,
        Err(e) => {
            eprintln!("Error creating reporter: {e}");
            std::process::exit(1);
        }
    };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    // Main sampling loop: sample, report, sleep. The previous frame is the
    // only state carried across ticks.
    let mut previous: Option<Frame> = None;

    while running.load(Ordering::SeqCst) {
        let (reading, frame) = match sampler.sample(previous.take()) {
            Ok(result) => result,
            Err(CaptureError::WindowClosed) => {
                println!("Feed window closed, stopping.");
                break;
            }
            Err(e) => {
                // Capture failure is fatal; the camera is gone.
                eprintln!("Error: {e}");
                break;
            }
        };
        previous = frame;

        println!(
            "[{}] busyness={} occupancy={} movement={}",
            Utc::now().format("%H:%M:%S"),
            reading.busyness_score,
            reading.occupancy,
            reading.movement_score
        );

        // Transport failures are logged and the loop carries on.
        match reporter.report(&reading) {
            Ok(status) => println!("  -> {} HTTP {status}", reporter.api_url()),
            Err(e) => eprintln!("  -> send failed: {e}"),
        }

        sleep_interval(&running, config.interval);
    }

    println!();
    println!("Stopping sensor...");
    sampler.close();
}

/// Build the sampler for the configured mode.
fn build_sampler(config: &Config) -> Sampler {
    if config.simulation_mode {
        return Sampler::Simulated(SimulatedSampler::new());
    }

    #[cfg(feature = "live")]
    {
        use overwatch_sensor::sampler::{LiveSampler, OccupancyEstimator};
        use overwatch_sensor::source::CameraSource;

        match CameraSource::open(config.camera_index, config.display) {
            Ok(source) => Sampler::Live(LiveSampler::new(
                Box::new(source),
                config.motion.clone(),
                OccupancyEstimator::simulated(),
            )),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    #[cfg(not(feature = "live"))]
    {
        eprintln!("Error: live mode requires camera support (build with --features live)");
        std::process::exit(1);
    }
}

/// Fixed delay between ticks, no drift correction. Sleeps in short slices so
/// an interrupt takes effect between ticks rather than mid-sleep.
fn sleep_interval(running: &AtomicBool, interval: Duration) {
    let deadline = Instant::now() + interval;
    while running.load(Ordering::SeqCst) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        thread::sleep((deadline - now).min(Duration::from_millis(100)));
    }
}

fn cmd_config() {
    let config = load_config();

    println!("Configuration");
    println!("=============");
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
