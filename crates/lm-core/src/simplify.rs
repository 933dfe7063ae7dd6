//! Douglas–Peucker polyline simplification.
//!
//! Used to thin noisy input traces before map matching so that fewer
//! observations (and therefore fewer HMM layers) are produced for nearly
//! straight stretches.

use crate::geo::{Point, segment_fraction};

/// Simplify `line`, removing vertices closer than `tolerance` to the chord of
/// their enclosing span.
///
/// The first and last vertices are always kept.  Lines with fewer than three
/// vertices, or a non-positive tolerance, are returned unchanged.
pub fn simplify(line: &[Point], tolerance: f64) -> Vec<Point> {
    if line.len() < 3 || tolerance <= 0.0 {
        return line.to_vec();
    }

    let mut keep = vec![false; line.len()];
    keep[0] = true;
    keep[line.len() - 1] = true;

    // Explicit stack instead of recursion: long GPS traces can have tens of
    // thousands of vertices.
    let mut stack = vec![(0usize, line.len() - 1)];
    while let Some((first, last)) = stack.pop() {
        if last <= first + 1 {
            continue;
        }
        let (a, b) = (line[first], line[last]);

        let (split, max_dist) = (first + 1..last)
            .map(|i| {
                let t = segment_fraction(line[i], a, b);
                (i, line[i].distance(a.lerp(b, t)))
            })
            .fold((first, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });

        if max_dist > tolerance {
            keep[split] = true;
            stack.push((first, split));
            stack.push((split, last));
        }
    }

    line.iter()
        .zip(keep)
        .filter_map(|(&p, k)| k.then_some(p))
        .collect()
}
