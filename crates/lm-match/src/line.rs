//! The line-string matching pipeline.
//!
//! ```text
//! geometry ─simplify─► coordinates ─within 2σ─► observations
//!     < 2 observations                       → NO_MATCH
//!     candidate layers (< 2 → NO_MATCH) ─Viterbi─► edges
//!         failure                            → EXCEPTION
//!         no edges                           → NO_MATCH
//!         otherwise                          → MATCH
//! ```

use lm_core::{Point, polyline_length, simplify};
use lm_network::RoadNetwork;

use crate::context;
use crate::hmm::{HmmParams, candidate_layers, viterbi};
use crate::location::{LineStringLocation, ReliabilityMode};
use crate::path::resolve_path;
use crate::reliability::{geometry_reliability, observation_reliability};
use crate::result::{LineStringMatch, LocationMatch, MatchStatus};
use crate::{MatchConfig, MatchResult};

/// Matches ordered traces onto a borrowed [`RoadNetwork`].
///
/// The matcher holds no per-call state and is `Sync`; one instance can
/// serve many threads.  Changing link access requires dropping it first.
pub struct LineMatcher<'a> {
    network: &'a RoadNetwork,
    config:  MatchConfig,
}

impl<'a> LineMatcher<'a> {
    pub fn new(network: &'a RoadNetwork, config: MatchConfig) -> MatchResult<Self> {
        config.validate()?;
        Ok(Self { network, config })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match `location`.  Never fails: problems are reported as a status.
    pub fn match_line(&self, location: &LineStringLocation) -> LineStringMatch {
        let sigma = location.sigma.unwrap_or(self.config.sigma);
        if !(sigma.is_finite() && sigma > 0.0) {
            tracing::debug!(id = %location.id, sigma, "invalid per-request sigma");
            return LocationMatch::empty(&location.id, MatchStatus::InvalidInput);
        }

        let observations: Vec<Point> = simplify(&location.geometry, self.config.simplify_tolerance)
            .into_iter()
            .filter(|&p| self.network.nearest_link_distance(p, 2.0 * sigma).is_some())
            .collect();
        if observations.len() < 2 {
            tracing::debug!(id = %location.id, observations = observations.len(), "too few observations");
            return LocationMatch::empty(&location.id, MatchStatus::NoMatch);
        }

        match self.run(location, &observations, sigma) {
            Ok(result) => {
                tracing::debug!(id = %location.id, status = %result.status, links = result.matched_links.len(), "line matched");
                result
            }
            Err(err) => {
                tracing::warn!(id = %location.id, error = %err, "line match failed");
                LocationMatch::empty(&location.id, MatchStatus::Exception)
            }
        }
    }

    fn run(&self, location: &LineStringLocation, observations: &[Point], sigma: f64) -> MatchResult<LineStringMatch> {
        let params = HmmParams {
            sigma,
            beta: self.config.beta,
            max_detour_factor: self.config.max_detour_factor,
        };
        // Observations without a state within sigma are dropped here, so the
        // count is checked again.
        let layers = candidate_layers(self.network, observations, sigma);
        let (Some(first), Some(last)) = (layers.first(), layers.last()) else {
            return Ok(LocationMatch::empty(&location.id, MatchStatus::NoMatch));
        };
        if layers.len() < 2 {
            tracing::debug!(id = %location.id, layers = layers.len(), "too few observations with candidates");
            return Ok(LocationMatch::empty(&location.id, MatchStatus::NoMatch));
        }
        let edges = viterbi(self.network, &layers, &params)?;

        let Some(path) = resolve_path(self.network, &edges, first.observation, last.observation) else {
            return Ok(LocationMatch::empty(&location.id, MatchStatus::NoMatch));
        };

        let reliability = match location.reliability_mode {
            ReliabilityMode::Geometry => {
                let input_length = location.length.unwrap_or_else(|| polyline_length(&location.geometry));
                geometry_reliability(&path.geometry, &location.geometry, path.length, input_length)
            }
            ReliabilityMode::PointObservations => observation_reliability(&path.geometry, &location.geometry),
        };

        let (upstream, downstream) = context::attach(
            self.network,
            &edges,
            location.upstream.as_ref(),
            location.downstream.as_ref(),
        )?;
        let mut result = LocationMatch::matched(&location.id, path, reliability);
        result.upstream_link_ids = upstream;
        result.downstream_link_ids = downstream;
        Ok(result)
    }
}
