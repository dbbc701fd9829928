use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::exit;

use highway_planner::telemetry::{self, Inbound};
use highway_planner::{Planner, PlannerConfig, PlannerState, WaypointMap};
use log::{error, info, warn};
use structopt::StructOpt;

/// Plans highway trajectories for the driving simulator, one telemetry frame per line on stdin.
#[derive(Debug, StructOpt)]
#[structopt(name = "highway-planner")]
struct Opt {
    /// Waypoint table with rows of `x y s dx dy`
    #[structopt(long, parse(from_os_str))]
    map: PathBuf,

    /// TOML file overriding the default planner parameters
    #[structopt(long, parse(from_os_str))]
    config: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let opt = Opt::from_args();

    let config = match &opt.config {
        Some(path) => match PlannerConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Could not load parameters from {}: {}", path.display(), e);
                exit(1);
            }
        },
        None => PlannerConfig::default(),
    };

    let map = match WaypointMap::load(&opt.map, &config) {
        Ok(map) => map,
        Err(e) => {
            error!("Could not load the waypoint map from {}: {}", opt.map.display(), e);
            exit(1);
        }
    };

    if let Err(e) = run(Planner::new(map, config)) {
        error!("Connection lost: {}", e);
        exit(1);
    }
}

fn run(planner: Planner) -> io::Result<()> {
    let mut state = PlannerState::default();
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    info!("Waiting for telemetry");
    for line in stdin.lock().lines() {
        let reply = match telemetry::decode(&line?) {
            Ok(Inbound::Telemetry(input)) => match planner.plan(&mut state, &input) {
                Ok(trajectory) => telemetry::encode_control(&trajectory),
                Err(e) => {
                    warn!("Skipping cycle: {}", e);
                    telemetry::encode_manual()
                }
            },
            Ok(Inbound::NoData) => telemetry::encode_manual(),
            Ok(Inbound::Ignored) => continue,
            Err(e) => {
                warn!("Skipping frame: {}", e);
                telemetry::encode_manual()
            }
        };
        writeln!(out, "{}", reply)?;
        out.flush()?;
    }

    Ok(())
}
