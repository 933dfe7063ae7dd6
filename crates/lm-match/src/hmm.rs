//! Hidden Markov model over directed edge candidates, solved with Viterbi.
//!
//! # Model
//!
//! | Part        | Definition                                                  |
//! |-------------|-------------------------------------------------------------|
//! | state       | an accessible directed edge within `sigma` of an observation |
//! | emission    | `−ln(√(2π)·σ) − ½·(d/σ)²`, `d` = observation-to-edge distance |
//! | transition  | `−ln β − abs(route − straight) / β`                          |
//!
//! All probabilities are kept as natural logarithms and summed.
//!
//! # Routes
//!
//! The route between two states follows their travel direction: from the
//! first snap to the end of its edge, along the shortest path to the start of
//! the second edge, then to the second snap.  A later snap on the same edge
//! and direction is reached directly.  One bounded shortest-path tree is
//! grown per distinct edge end per step and shared by all target states.

use std::f64::consts::PI;

use rustc_hash::FxHashMap;

use lm_core::{EdgeId, NodeId, Point};
use lm_network::{RoadNetwork, RoutingGraph, ShortestPathTree, shortest_path_tree};

use crate::{MatchError, MatchResult};

/// Model parameters for one match.
#[derive(Copy, Clone, Debug)]
pub struct HmmParams {
    pub sigma: f64,
    pub beta: f64,
    pub max_detour_factor: f64,
}

impl HmmParams {
    #[inline]
    pub fn emission(&self, distance: f64) -> f64 {
        let z = distance / self.sigma;
        -((2.0 * PI).sqrt() * self.sigma).ln() - 0.5 * z * z
    }

    #[inline]
    pub fn transition(&self, route: f64, straight: f64) -> f64 {
        -self.beta.ln() - (route - straight).abs() / self.beta
    }

    /// Longest route still considered between observations `straight` apart.
    #[inline]
    fn max_route(&self, straight: f64) -> f64 {
        (straight * self.max_detour_factor).max(straight + 4.0 * self.sigma)
    }
}

/// One candidate position of an observation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct State {
    pub edge: EdgeId,
    /// Snap position along the edge's travel direction.
    pub fraction: f64,
    /// Distance from the observation to the snap.
    pub distance: f64,
}

/// The states of one observation.
#[derive(Clone, Debug)]
pub struct Layer {
    pub observation: Point,
    pub states: Vec<State>,
}

/// Candidate layers for `observations`.  Observations without any
/// accessible edge within `sigma` are skipped.
pub fn candidate_layers(network: &RoadNetwork, observations: &[Point], sigma: f64) -> Vec<Layer> {
    let mut layers = Vec::with_capacity(observations.len());
    for &observation in observations {
        let mut states = Vec::new();
        for snap in network.find_nearest_links(observation, sigma) {
            for reversed in [false, true] {
                let edge = snap.edge(reversed);
                if network.is_accessible(edge) {
                    states.push(State { edge, fraction: snap.directed_fraction(reversed), distance: snap.distance });
                }
            }
        }
        if states.is_empty() {
            tracing::debug!(%observation, "observation has no candidates; skipped");
        } else {
            layers.push(Layer { observation, states });
        }
    }
    layers
}

/// Best predecessor of a state and the edges leading from it.
struct Step {
    from: usize,
    edges: Vec<EdgeId>,
}

/// Run Viterbi over `layers` and return the most likely edge sequence.
///
/// Consecutive duplicate edges are merged.  An empty `layers` yields an
/// empty sequence; a step where no state is reachable is
/// [`MatchError::BrokenSequence`].
pub fn viterbi(network: &RoadNetwork, layers: &[Layer], params: &HmmParams) -> MatchResult<Vec<EdgeId>> {
    let Some(first) = layers.first() else {
        return Ok(Vec::new());
    };

    let mut scores: Vec<f64> = first.states.iter().map(|s| params.emission(s.distance)).collect();
    let mut history: Vec<Vec<Option<Step>>> = Vec::with_capacity(layers.len() - 1);

    for (t, pair) in layers.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        let straight = prev.observation.distance(next.observation);
        let max_route = params.max_route(straight);

        let mut trees: FxHashMap<NodeId, ShortestPathTree> = FxHashMap::default();
        let mut next_scores = vec![f64::NEG_INFINITY; next.states.len()];
        let mut steps: Vec<Option<Step>> = (0..next.states.len()).map(|_| None).collect();

        for (i, a) in prev.states.iter().enumerate() {
            if !scores[i].is_finite() {
                continue;
            }
            let source = network.edge_to(a.edge);
            let tree = trees
                .entry(source)
                .or_insert_with(|| shortest_path_tree(network, source, max_route));

            for (j, b) in next.states.iter().enumerate() {
                let Some((route, edges)) = route_between(network, tree, a, b) else { continue };
                if route > max_route {
                    continue;
                }
                let score = scores[i] + params.transition(route, straight) + params.emission(b.distance);
                if score > next_scores[j] {
                    next_scores[j] = score;
                    steps[j] = Some(Step { from: i, edges });
                }
            }
        }

        if next_scores.iter().all(|s| !s.is_finite()) {
            return Err(MatchError::BrokenSequence { observation: t + 1 });
        }
        scores = next_scores;
        history.push(steps);
    }

    // Backtrack from the best final state.
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate() {
        if score > scores[best] {
            best = i;
        }
    }

    let mut pieces: Vec<Vec<EdgeId>> = Vec::with_capacity(history.len());
    let mut state = best;
    for (t, steps) in history.iter_mut().enumerate().rev() {
        let Some(step) = steps[state].take() else {
            return Err(MatchError::BrokenSequence { observation: t + 1 });
        };
        pieces.push(step.edges);
        state = step.from;
    }

    let mut edges = vec![first.states[state].edge];
    for piece in pieces.into_iter().rev() {
        for edge in piece {
            if edges.last() != Some(&edge) {
                edges.push(edge);
            }
        }
    }
    Ok(edges)
}

/// Route length from state `a` to state `b` and the edges entered after
/// leaving `a`'s edge.
fn route_between(network: &RoadNetwork, tree: &ShortestPathTree, a: &State, b: &State) -> Option<(f64, Vec<EdgeId>)> {
    let a_len = network.edge_distance(a.edge);
    if a.edge == b.edge && b.fraction >= a.fraction {
        return Some(((b.fraction - a.fraction) * a_len, Vec::new()));
    }

    let entry = network.edge_from(b.edge);
    let between = tree.distance_to(entry)?;
    let mut edges = tree.path_to(network, entry)?;
    edges.push(b.edge);

    let route = (1.0 - a.fraction) * a_len + between + b.fraction * network.edge_distance(b.edge);
    Some((route, edges))
}
