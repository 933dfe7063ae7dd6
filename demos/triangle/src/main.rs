//! triangle — smallest end-to-end example for linkmatch.
//!
//! 1. Matches a start/end pair across a triangle, closes the direct link,
//!    matches again around the detour, then reopens it.
//! 2. Batch-matches seeded noisy traces of the direct link and writes the
//!    results to `output/triangle/results.csv`.
//! 3. Prints a 400 m isochrone and the region-1 links reachable from A.
//!
//! Set `RUST_LOG=debug` for per-location logging.

mod network;

use std::path::Path;

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use lm_batch::{BatchConfig, BatchMatcher, CsvResultWriter, LoggingObserver};
use lm_core::Point;
use lm_match::{LineStringLocation, Location, MatchConfig, StartToEndLocation, StartToEndMatcher};
use lm_network::{Access, Direction, RoadNetwork, RoutingGraph};
use lm_reach::{Metric, SearchLimit, accessible_links, isochrone};

use network::{DIRECT, build_network};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:          u64   = 42;
const TRACE_COUNT:   usize = 20;
const TRACE_POINTS:  usize = 9;
/// Maximum lateral noise of generated trace points, in metres.
const NOISE_M:       f64   = 6.0;
const ISOCHRONE_M:   f64   = 400.0;

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== triangle — linkmatch ===");

    let (mut network, [a, _, _, _]) = build_network()?;
    println!("Road network: {} nodes, {} links", network.node_count(), network.link_count());
    println!();

    // 1. Start-to-end, with and without the direct link.
    let location = StartToEndLocation::new("ab", Point::new(0.0, 0.0), Point::new(324.0, 0.0), 324.0);
    print_start_to_end(&network, &location, "open")?;
    let previous = network.set_link_access(DIRECT, Access::NONE)?;
    print_start_to_end(&network, &location, "closed")?;
    network.set_link_access(DIRECT, previous)?;
    print_start_to_end(&network, &location, "reopened")?;
    println!();

    // 2. Batch of noisy traces.
    let locations = noisy_traces(&mut SmallRng::seed_from_u64(SEED));
    let matcher = BatchMatcher::new(&network, BatchConfig { progress_interval: 5, ..BatchConfig::default() })?;
    let results = matcher.run(&locations, &mut LoggingObserver::new(locations.len()));

    std::fs::create_dir_all("output/triangle")?;
    let mut writer = CsvResultWriter::create(Path::new("output/triangle/results.csv"))?;
    writer.write_results(&results)?;
    writer.finish()?;
    println!("Batch: {} of {} traces matched", matcher.matched(), matcher.processed());
    println!("  results.csv : {} rows", results.len());
    println!();

    // 3. Reachability from A.
    let limit = SearchLimit::new(Metric::Distance, ISOCHRONE_M)?;
    println!("Isochrone from A, {ISOCHRONE_M} m:");
    println!("{:<6} {:<9} {:<10} {:<10}", "Link", "Reversed", "Fraction", "Distance");
    println!("{}", "-".repeat(38));
    for reached in isochrone(&network, a, limit, Direction::Forward)? {
        println!(
            "{:<6} {:<9} {:<10.3} {:<10.1}",
            reached.link.0,
            if reached.reversed { "yes" } else { "no" },
            reached.reachable_fraction,
            reached.metric_value,
        );
    }
    let region: Vec<u64> = accessible_links(&network, a, 1, Direction::Forward)?.iter().map(|l| l.0).collect();
    println!("Region 1 links reachable from A: {region:?}");

    Ok(())
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn print_start_to_end(network: &RoadNetwork, location: &StartToEndLocation, label: &str) -> Result<()> {
    let matcher = StartToEndMatcher::new(network, MatchConfig::default())?;
    let result = matcher.match_start_to_end(location);
    let links: Vec<u64> = result.link_ids().iter().map(|l| l.0).collect();
    println!(
        "{label:<9} {:<9} links {links:?}  length {:.1} m  reliability {:.1}",
        result.status.to_string(),
        result.path_length,
        result.reliability,
    );
    Ok(())
}

/// Traces along the direct link A→B with uniform lateral noise.
fn noisy_traces(rng: &mut SmallRng) -> Vec<Location> {
    (0..TRACE_COUNT)
        .map(|i| {
            let start = rng.gen_range(5.0..60.0);
            let end = rng.gen_range(264.0..319.0);
            let step = (end - start) / (TRACE_POINTS - 1) as f64;
            let geometry = (0..TRACE_POINTS)
                .map(|k| Point::new(start + step * k as f64, rng.gen_range(-NOISE_M..NOISE_M)))
                .collect();
            Location::Line(LineStringLocation::new(format!("trace-{i}"), geometry))
        })
        .collect()
}
