use crate::trail_vector::{Polyline, TrackPoint};

// Everything here is in plain lon/lat degrees. The tolerances we search over
// are tiny compared to earth curvature at trail scale, so no projection.

fn perpendicular_distance(point: &TrackPoint, start: &TrackPoint, end: &TrackPoint) -> f64 {
    let dx = end.longitude - start.longitude;
    let dy = end.latitude - start.latitude;
    let chord_length = (dx * dx + dy * dy).sqrt();
    if chord_length == 0. {
        let px = point.longitude - start.longitude;
        let py = point.latitude - start.latitude;
        return (px * px + py * py).sqrt();
    }
    let cross = dx * (start.latitude - point.latitude) - (start.longitude - point.longitude) * dy;
    cross.abs() / chord_length
}

/// Douglas-Peucker at a fixed tolerance. Index ranges are processed from an
/// explicit work list instead of recursing, long trails would otherwise go
/// very deep.
pub fn douglas_peucker(track_points: &[TrackPoint], epsilon: f64) -> Vec<TrackPoint> {
    if track_points.len() <= 2 {
        return track_points.to_vec();
    }

    let mut keep = vec![false; track_points.len()];
    keep[0] = true;
    keep[track_points.len() - 1] = true;

    let mut ranges: Vec<(usize, usize)> = vec![(0, track_points.len() - 1)];
    while let Some((start, end)) = ranges.pop() {
        if end <= start + 1 {
            continue;
        }
        let mut max_distance = 0.;
        let mut max_index = start;
        for i in (start + 1)..end {
            let distance =
                perpendicular_distance(&track_points[i], &track_points[start], &track_points[end]);
            if distance > max_distance {
                max_distance = distance;
                max_index = i;
            }
        }
        if max_distance > epsilon {
            keep[max_index] = true;
            ranges.push((start, max_index));
            ranges.push((max_index, end));
        }
    }

    track_points
        .iter()
        .zip(keep)
        .filter_map(|(point, keep)| if keep { Some(*point) } else { None })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct ToleranceSearch {
    pub target_count: usize,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub max_iterations: usize,
    // accepted relative distance from `target_count`
    pub slack: f64,
}

impl Default for ToleranceSearch {
    fn default() -> Self {
        ToleranceSearch {
            target_count: 5000,
            lower_bound: 0.,
            upper_bound: 0.1,
            max_iterations: 30,
            slack: 0.05,
        }
    }
}

impl ToleranceSearch {
    fn close_enough(&self, count: usize) -> bool {
        (count as f64 - self.target_count as f64).abs() <= self.slack * self.target_count as f64
    }
}

/// Reduces `polyline` to roughly `search.target_count` points. The point count
/// shrinks as epsilon grows but there is no closed form for it, so we binary
/// search the tolerance. Returns the input unchanged when it is already small
/// enough.
pub fn simplify_to_target(polyline: &Polyline, search: &ToleranceSearch) -> Polyline {
    let track_points = &polyline.track_points;
    if track_points.len() <= search.target_count {
        return polyline.clone();
    }

    let mut low = search.lower_bound;
    let mut high = search.upper_bound;
    let mut best: Option<(f64, Vec<TrackPoint>)> = None;

    for iteration in 0..search.max_iterations {
        let epsilon = (low + high) / 2.;
        let result = douglas_peucker(track_points, epsilon);
        let count = result.len();
        let close_enough = search.close_enough(count);
        if count > search.target_count {
            low = epsilon;
            if close_enough {
                best = Some((epsilon, result));
            }
        } else {
            high = epsilon;
            best = Some((epsilon, result));
        }
        if close_enough {
            debug!(
                "simplification converged after {} iterations (epsilon = {:e})",
                iteration + 1,
                epsilon
            );
            break;
        }
    }

    let (epsilon, track_points) = match best {
        Some(best) => best,
        // every candidate was above the target, the upper bound is the
        // coarsest we are allowed to go
        None => (high, douglas_peucker(track_points, high)),
    };
    info!(
        "simplified {} points to {} (target {}, epsilon = {:e})",
        polyline.len(),
        track_points.len(),
        search.target_count,
        epsilon
    );
    Polyline { track_points }
}
