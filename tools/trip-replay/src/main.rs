use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use trip_route::{parse_route, parse_stops, Stop};
use trip_sim::{Phase, SimulationDriver, TripMap, TripState};

mod output;

use output::GeoJsonSurface;

#[derive(Parser, Debug)]
#[command(
    name = "trip-replay",
    author,
    version,
    about = "Replay a simulated vehicle trip along a route",
    long_about = "Animates a single vehicle along a route at a fixed speed of 27 m/s, \
                  ticking once per second, and writes the current map scene (route, \
                  stops, travelled line and vehicle) as GeoJSON after every tick.\n\n\
                  Type `start` (or press enter) to (re)start the trip, `stop` to \
                  pause it, and `quit` to exit."
)]
struct Args {
    /// Route JSON: an array of {"lat", "lng"} objects in travel order
    #[arg(short, long)]
    route: PathBuf,

    /// Stops JSON: {"data": [{"lat", "lng", "id"}, ...]}
    #[arg(short, long)]
    stops: Option<PathBuf>,

    /// GeoJSON file rewritten with the current scene
    #[arg(short, long)]
    output: PathBuf,

    /// Start the trip immediately instead of waiting for `start`
    #[arg(long)]
    autostart: bool,

    /// Verbose output (show debug messages)
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(path: &Path) -> Result<String> {
    if !path.exists() {
        bail!("Input file does not exist: {}", path.display());
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn log_state(state: &TripState) {
    match state.phase() {
        Phase::Idle => {}
        Phase::Running => {
            if let Some(position) = state.position() {
                log::info!(
                    "Vehicle at {:.6}, {:.6} heading {:.1}°",
                    position.y(),
                    position.x(),
                    state.heading().map_or(0.0, |h| h.degrees())
                );
            }
        }
        Phase::Completed => log::info!("Trip completed!"),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "info" }),
    )
    .format_timestamp(None)
    .init();

    log::info!("=== Trip Replay ===");
    log::info!("Route: {}", args.route.display());
    log::info!("Output: {}", args.output.display());

    let route_id = args
        .route
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "route".to_string());
    let route = parse_route(route_id, &read_input(&args.route)?)
        .context("Failed to parse route")?;

    if route.points.len() < 2 {
        bail!("Route needs at least two points, found {}", route.points.len());
    }

    let stops: Vec<Stop> = match &args.stops {
        Some(path) => {
            log::info!("Stops: {}", path.display());
            parse_stops(&read_input(path)?).context("Failed to parse stops")?
        }
        None => Vec::new(),
    };

    let annotated = route.annotate();
    log::info!(
        "Loaded {} route points ({:.0} m from origin at the furthest) and {} stops",
        annotated.len(),
        annotated.max_distance().unwrap_or(0.0),
        stops.len()
    );

    let map = TripMap::new(GeoJsonSurface::new(args.output.clone()), annotated, stops);
    let mut driver = SimulationDriver::new(map);
    let mut updates = driver.subscribe();

    if args.autostart {
        driver.start().await;
    }
    log::info!("Commands: start (or empty line), stop, quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            line = lines.next_line(), if stdin_open => {
                match line.context("Failed to read from stdin")? {
                    None => {
                        stdin_open = false;
                        if !driver.is_running() {
                            break;
                        }
                        log::debug!("stdin closed, waiting for the trip to finish");
                    }
                    Some(command) => match command.trim() {
                        "" | "start" => driver.start().await,
                        "stop" => driver.stop(),
                        "quit" | "exit" => break,
                        other => log::warn!("Unknown command: {other}"),
                    },
                }
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = updates.borrow_and_update().clone();
                log_state(&state);

                if state.phase() == Phase::Completed && !stdin_open {
                    break;
                }
            }
        }
    }

    driver.stop();
    let frames = driver.map().lock().await.surface().frames_written();
    log::info!("Wrote {} frames to {}", frames, args.output.display());
    log::info!("Done!");

    Ok(())
}
