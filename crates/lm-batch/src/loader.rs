//! CSV location loader.
//!
//! # CSV format
//!
//! One row per location.  `sigma` and `reliability` are optional columns and
//! may be left out of the header entirely.
//!
//! ```csv
//! id,kind,geometry,length,sigma,reliability,upstream,downstream
//! a,line,0 0;100 0;200 5,,,geometry,,distance:100
//! b,start_to_end,10 0;190 0,180,,,time:30,
//! ```
//!
//! | Column        | Meaning                                                   |
//! |---------------|-----------------------------------------------------------|
//! | `kind`        | `line` or `start_to_end`                                  |
//! | `geometry`    | `x y` pairs separated by `;`; exactly two for start/end   |
//! | `length`      | expected length in metres; required for `start_to_end`    |
//! | `sigma`       | per-line measurement error; matcher default when empty    |
//! | `reliability` | `geometry` (default) or `points`                          |
//! | `upstream`    | `metric:bound`, e.g. `distance:100`; empty for none       |
//! | `downstream`  | same as `upstream`                                        |
//!
//! Only the syntax is checked here.  Values the matcher rejects, such as a
//! negative length, load fine and come back as `INVALID_INPUT` results.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use lm_core::Point;
use lm_match::{IsochroneSpec, LineStringLocation, Location, ReliabilityMode, StartToEndLocation};
use lm_reach::Metric;

use crate::{BatchError, BatchResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LocationRecord {
    id:          String,
    kind:        String,
    geometry:    String,
    length:      Option<f64>,
    #[serde(default)]
    sigma:       Option<f64>,
    #[serde(default)]
    reliability: Option<String>,
    upstream:    Option<String>,
    downstream:  Option<String>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load locations from a CSV file, in file order.
pub fn load_locations_csv(path: &Path) -> BatchResult<Vec<Location>> {
    let file = std::fs::File::open(path)?;
    load_locations_reader(file)
}

/// Like [`load_locations_csv`] but accepts any `Read` source.
pub fn load_locations_reader<R: Read>(reader: R) -> BatchResult<Vec<Location>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut locations = Vec::new();
    for result in csv_reader.deserialize::<LocationRecord>() {
        locations.push(parse_record(result?)?);
    }
    tracing::debug!(count = locations.len(), "loaded locations");
    Ok(locations)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_record(row: LocationRecord) -> BatchResult<Location> {
    let fail = |reason: String| BatchError::Parse { id: row.id.clone(), reason };

    let geometry = parse_geometry(&row.geometry).map_err(fail)?;
    let upstream = parse_isochrone(row.upstream.as_deref()).map_err(fail)?;
    let downstream = parse_isochrone(row.downstream.as_deref()).map_err(fail)?;

    match row.kind.trim() {
        "line" => {
            let reliability_mode = match row.reliability.as_deref().map(str::trim) {
                None | Some("") | Some("geometry") => ReliabilityMode::Geometry,
                Some("points") => ReliabilityMode::PointObservations,
                Some(other) => {
                    return Err(fail(format!("invalid reliability {other:?}: expected \"geometry\" or \"points\"")));
                }
            };
            let mut line = LineStringLocation::new(row.id.clone(), geometry);
            line.length = row.length;
            line.sigma = row.sigma;
            line.reliability_mode = reliability_mode;
            line.upstream = upstream;
            line.downstream = downstream;
            Ok(Location::Line(line))
        }
        "start_to_end" => {
            let &[start, end] = geometry.as_slice() else {
                return Err(fail(format!("start_to_end needs exactly 2 points, got {}", geometry.len())));
            };
            let Some(length) = row.length else {
                return Err(fail("start_to_end needs a length".into()));
            };
            let mut location = StartToEndLocation::new(row.id.clone(), start, end, length);
            location.upstream = upstream;
            location.downstream = downstream;
            Ok(Location::StartToEnd(location))
        }
        other => Err(fail(format!("invalid kind {other:?}: expected \"line\" or \"start_to_end\""))),
    }
}

/// `"x y;x y;…"` → points.  Blank segments are ignored.
fn parse_geometry(s: &str) -> Result<Vec<Point>, String> {
    s.split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.parse::<Point>().map_err(|e| e.to_string()))
        .collect()
}

/// `"metric:bound"` → spec; empty or absent → `None`.  The bound itself is
/// validated by the matcher.
fn parse_isochrone(s: Option<&str>) -> Result<Option<IsochroneSpec>, String> {
    let Some(s) = s.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    let Some((metric, bound)) = s.split_once(':') else {
        return Err(format!("invalid isochrone {s:?}: expected \"metric:bound\""));
    };
    let metric: Metric = metric.parse().map_err(|e: lm_reach::ReachError| e.to_string())?;
    let bound = bound.trim().parse::<f64>().map_err(|_| format!("invalid isochrone bound {bound:?}"))?;
    Ok(Some(IsochroneSpec::new(metric, bound)))
}
