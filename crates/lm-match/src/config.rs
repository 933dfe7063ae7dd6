//! Matcher configuration.

use crate::{MatchError, MatchResult};

/// Tuning parameters shared by both matchers.
///
/// All distances are in metres.  Construct with `Default` and override
/// fields as needed; matchers call [`validate`](Self::validate) on
/// construction.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchConfig {
    /// Measurement error of trace coordinates.  Edges within `sigma` of an
    /// observation become HMM candidates; observations farther than
    /// `2 × sigma` from every link are dropped.  Default: 20.
    pub sigma: f64,

    /// Decay of the HMM transition probability over the difference between
    /// route and straight-line distance.  Default: 2.
    pub beta: f64,

    /// Douglas–Peucker tolerance applied to traces before matching.
    /// Default: 0.5.
    pub simplify_tolerance: f64,

    /// Snap radius for start and end points.  Default: 20.
    pub snap_radius: f64,

    /// Routes between consecutive observations longer than
    /// `max(factor × straight, straight + 4 × sigma)` are not considered.
    /// Default: 4.
    pub max_detour_factor: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            sigma:              20.0,
            beta:               2.0,
            simplify_tolerance: 0.5,
            snap_radius:        20.0,
            max_detour_factor:  4.0,
        }
    }
}

impl MatchConfig {
    /// Reject values the matchers cannot work with.
    pub fn validate(&self) -> MatchResult<()> {
        positive("sigma", self.sigma)?;
        positive("beta", self.beta)?;
        positive("snap_radius", self.snap_radius)?;
        if !(self.simplify_tolerance.is_finite() && self.simplify_tolerance >= 0.0) {
            return Err(MatchError::Config(format!(
                "simplify_tolerance must be finite and non-negative, got {}",
                self.simplify_tolerance
            )));
        }
        if !(self.max_detour_factor.is_finite() && self.max_detour_factor >= 1.0) {
            return Err(MatchError::Config(format!(
                "max_detour_factor must be at least 1, got {}",
                self.max_detour_factor
            )));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> MatchResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MatchError::Config(format!("{name} must be positive and finite, got {value}")))
    }
}
