//! Planar coordinates and point-to-polyline projection.
//!
//! All coordinates are in a projected, metric CRS (`x`/`y` in metres), so
//! distances are plain Euclidean.  Fractions along a polyline are always
//! expressed relative to its *total* length and lie in `[0, 1]`.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// A planar coordinate in metres.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance in metres.
    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Linear interpolation: `t = 0` yields `self`, `t = 1` yields `other`.
    #[inline]
    pub fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(self.x + (other.x - self.x) * t, self.y + (other.y - self.y) * t)
    }

    #[inline]
    pub fn as_array(self) -> [f64; 2] {
        [self.x, self.y]
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

/// Parses `"x y"`: two finite numbers separated by whitespace.
impl FromStr for Point {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace().map(str::parse::<f64>);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(x)), Some(Ok(y)), None) if x.is_finite() && y.is_finite() => Ok(Point::new(x, y)),
            _ => Err(CoreError::InvalidPoint(s.to_string())),
        }
    }
}

// ── Projection ────────────────────────────────────────────────────────────────

/// The closest point on a polyline to a query point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projection {
    /// The projected point on the polyline.
    pub point: Point,
    /// Distance from the query point to `point`.
    pub distance: f64,
    /// Cumulative fraction of `point` along the whole polyline, in `[0, 1]`.
    pub fraction: f64,
    /// Index of the segment (`line[segment]..line[segment + 1]`) holding `point`.
    pub segment: usize,
}

/// Normalised projection of `p` onto the segment `a → b`, clamped to `[0, 1]`.
///
/// A zero-length segment projects every point onto its start (`0.0`).
#[inline]
pub fn segment_fraction(p: Point, a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_2 = dx * dx + dy * dy;
    if len_2 == 0.0 {
        return 0.0;
    }
    (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_2).clamp(0.0, 1.0)
}

/// Project `point` onto `line`.
///
/// Every segment is tested; the one with minimum distance wins (the first one
/// on ties).  The returned fraction is measured along the entire polyline:
/// `(length of prior segments + t × segment length) / total length`.
///
/// A single-coordinate line is treated as a two-point line with a duplicated
/// coordinate, which yields `fraction = 0.0`.  Returns `None` only for an
/// empty line.
pub fn project_onto_polyline(point: Point, line: &[Point]) -> Option<Projection> {
    let expanded: [Point; 2];
    let line = match line {
        [] => return None,
        [only] => {
            expanded = [*only, *only];
            &expanded[..]
        }
        _ => line,
    };

    let mut best: Option<Projection> = None;
    let mut best_along = 0.0;
    let mut walked = 0.0;

    for (i, seg) in line.windows(2).enumerate() {
        let (a, b) = (seg[0], seg[1]);
        let seg_len = a.distance(b);
        let t = segment_fraction(point, a, b);
        let projected = a.lerp(b, t);
        let distance = point.distance(projected);

        if best.is_none_or(|p| distance < p.distance) {
            best = Some(Projection { point: projected, distance, fraction: 0.0, segment: i });
            best_along = walked + t * seg_len;
        }
        walked += seg_len;
    }

    best.map(|mut p| {
        p.fraction = if walked > 0.0 { (best_along / walked).clamp(0.0, 1.0) } else { 0.0 };
        p
    })
}

// ── Polyline utilities ────────────────────────────────────────────────────────

/// Sum of segment lengths.
pub fn polyline_length(line: &[Point]) -> f64 {
    line.windows(2).map(|s| s[0].distance(s[1])).sum()
}

/// The point at `fraction` (clamped to `[0, 1]`) of the total length.
///
/// Returns `None` for an empty line.
pub fn point_at_fraction(line: &[Point], fraction: f64) -> Option<Point> {
    let first = *line.first()?;
    let total = polyline_length(line);
    if total == 0.0 {
        return Some(first);
    }
    let target = fraction.clamp(0.0, 1.0) * total;
    let mut walked = 0.0;
    for seg in line.windows(2) {
        let seg_len = seg[0].distance(seg[1]);
        if walked + seg_len >= target && seg_len > 0.0 {
            return Some(seg[0].lerp(seg[1], (target - walked) / seg_len));
        }
        walked += seg_len;
    }
    line.last().copied()
}

/// The part of `line` between two fractions of its total length.
///
/// `from` and `to` are clamped to `[0, 1]` and swapped if out of order.  The
/// result starts and ends at the interpolated cut points and keeps every
/// original vertex strictly between them.
pub fn sub_polyline(line: &[Point], from: f64, to: f64) -> Vec<Point> {
    let (from, to) = {
        let (a, b) = (from.clamp(0.0, 1.0), to.clamp(0.0, 1.0));
        if a <= b { (a, b) } else { (b, a) }
    };
    let total = polyline_length(line);
    let (Some(start), Some(end)) = (point_at_fraction(line, from), point_at_fraction(line, to))
    else {
        return Vec::new();
    };
    if total == 0.0 {
        return vec![start, end];
    }

    let (from_m, to_m) = (from * total, to * total);
    let mut out = vec![start];
    let mut walked = 0.0;
    for seg in line.windows(2) {
        walked += seg[0].distance(seg[1]);
        // `walked` is now the cumulative distance of vertex seg[1].
        if walked > from_m && walked < to_m {
            out.push(seg[1]);
        }
    }
    out.push(end);
    out
}

/// Largest distance from any vertex of `from` to the polyline `to`.
///
/// Returns `0.0` if either polyline is empty.
pub fn max_deviation(from: &[Point], to: &[Point]) -> f64 {
    from.iter()
        .filter_map(|&p| project_onto_polyline(p, to))
        .map(|p| p.distance)
        .fold(0.0, f64::max)
}
