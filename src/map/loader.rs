use super::{MapError, Waypoint, WaypointMap};
use crate::config::PlannerConfig;
use log::info;
use std::io::BufRead;
use std::path::Path;
use thiserror::Error;

/// An error that occurs while loading a waypoint table.
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("Cannot read the waypoint table: {0}")]
    Io(#[from] std::io::Error),

    #[error("Line {line} of the waypoint table: {reason}")]
    Parse { line: usize, reason: String },

    #[error(transparent)]
    Map(#[from] MapError),
}

impl WaypointMap {
    /// Loads a waypoint table from a file.
    pub fn load(path: impl AsRef<Path>, config: &PlannerConfig) -> Result<Self, MapLoadError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let map = Self::from_reader(std::io::BufReader::new(file), config)?;
        info!("Loaded {} waypoints from {}", map.len(), path.display());
        Ok(map)
    }

    /// Parses a waypoint table with one `x y s dx dy` row per waypoint.
    /// Blank lines are skipped.
    pub fn from_reader(reader: impl BufRead, config: &PlannerConfig) -> Result<Self, MapLoadError> {
        let mut waypoints = vec![];
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            waypoints.push(parse_row(&line).map_err(|reason| MapLoadError::Parse {
                line: idx + 1,
                reason,
            })?);
        }
        Ok(Self::new(waypoints, config)?)
    }
}

fn parse_row(line: &str) -> Result<Waypoint, String> {
    let mut values = [0.0; 5];
    let mut fields = line.split_whitespace();
    for (value, name) in values.iter_mut().zip(["x", "y", "s", "dx", "dy"]) {
        let field = fields.next().ok_or_else(|| format!("missing `{}` column", name))?;
        *value = field
            .parse()
            .map_err(|_| format!("`{}` is not a number: {:?}", name, field))?;
    }
    if fields.next().is_some() {
        return Err("too many columns".to_string());
    }
    let [x, y, s, dx, dy] = values;
    Ok(Waypoint::new(x, y, s, dx, dy))
}
