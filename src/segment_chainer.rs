/* Stitching deduplicated fragments into one south to north path.

The default strategy is greedy: always append whichever unused fragment has an
endpoint closest to the current tail. This is a cheap approximation of a
minimum-cost path cover and it can mis-stitch crossing or looping fragments,
so the choice of the next fragment sits behind `NextSegmentSelector`.
*/
use crate::trail_vector::{Polyline, Segment, TrackPoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub index: usize,
    // the fragment has to be reversed before appending
    pub reversed: bool,
}

pub trait NextSegmentSelector {
    fn select(&mut self, tail: &TrackPoint, segments: &[Segment], used: &[bool])
        -> Option<Candidate>;
}

// NOTE: this is planar distance in degree space, not geodesic. Mileage uses
// haversine but endpoint matching never did, keep it that way unless we see
// mis-stitching in practice.
fn squared_degree_distance(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let d_lon = a.longitude - b.longitude;
    let d_lat = a.latitude - b.latitude;
    d_lon * d_lon + d_lat * d_lat
}

/// Full rescan of every unused fragment on each step. Ties go to whichever
/// fragment (and within a fragment, the first point) was scanned first.
#[derive(Default)]
pub struct NearestEndpointSelector;

impl NextSegmentSelector for NearestEndpointSelector {
    fn select(
        &mut self,
        tail: &TrackPoint,
        segments: &[Segment],
        used: &[bool],
    ) -> Option<Candidate> {
        let mut best: Option<(f64, Candidate)> = None;
        for (index, segment) in segments.iter().enumerate() {
            if used[index] {
                continue;
            }
            let (first, last) = match (segment.first(), segment.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => continue,
            };
            for (endpoint, reversed) in [(first, false), (last, true)] {
                let distance = squared_degree_distance(tail, endpoint);
                let better = match &best {
                    None => true,
                    Some((best_distance, _)) => distance < *best_distance,
                };
                if better {
                    best = Some((distance, Candidate { index, reversed }));
                }
            }
        }
        best.map(|(_, candidate)| candidate)
    }
}

#[derive(Debug, PartialEq)]
pub struct ChainResult {
    pub polyline: Polyline,
    // non-zero only when chaining stopped early
    pub unused_segments: usize,
}

impl ChainResult {
    pub fn is_complete(&self) -> bool {
        self.unused_segments == 0
    }
}

pub fn chain_segments(segments: Vec<Segment>) -> ChainResult {
    chain_segments_with(segments, &mut NearestEndpointSelector)
}

pub fn chain_segments_with<S: NextSegmentSelector>(
    mut segments: Vec<Segment>,
    selector: &mut S,
) -> ChainResult {
    segments.retain(|s| !s.is_empty());
    match segments.len() {
        0 => {
            return ChainResult {
                polyline: Polyline::default(),
                unused_segments: 0,
            }
        }
        1 => {
            let only = segments.pop().map(|s| s.track_points).unwrap_or_default();
            return ChainResult {
                polyline: Polyline {
                    track_points: only,
                },
                unused_segments: 0,
            };
        }
        _ => {}
    }

    // south-bias: every fragment starts at its lower latitude end
    for segment in segments.iter_mut() {
        let heads_south = matches!(
            (segment.first(), segment.last()),
            (Some(first), Some(last)) if first.latitude > last.latitude
        );
        if heads_south {
            segment.reverse();
        }
    }
    segments.sort_by(|a, b| {
        let a = a.first().map(|p| p.latitude).unwrap_or_default();
        let b = b.first().map(|p| p.latitude).unwrap_or_default();
        a.total_cmp(&b)
    });

    let mut used = vec![false; segments.len()];
    let mut track_points = segments[0].track_points.clone();
    used[0] = true;
    let mut remaining = segments.len() - 1;

    while remaining > 0 {
        let tail = match track_points.last() {
            Some(tail) => *tail,
            None => break,
        };
        let candidate = match selector.select(&tail, &segments, &used) {
            Some(candidate) => candidate,
            None => {
                warn!(
                    "chaining stopped early, {} segments could not be reached",
                    remaining
                );
                break;
            }
        };
        used[candidate.index] = true;
        remaining -= 1;
        let next = &segments[candidate.index].track_points;
        if candidate.reversed {
            track_points.extend(next.iter().rev());
        } else {
            track_points.extend(next.iter());
        }
    }

    debug!(
        "chained {} segments into {} points",
        segments.len() - remaining,
        track_points.len()
    );
    ChainResult {
        polyline: Polyline { track_points },
        unused_segments: remaining,
    }
}

/// Drops a point when it equals the one right before it.
pub fn remove_consecutive_duplicates(polyline: Polyline) -> Polyline {
    let mut track_points = polyline.track_points;
    track_points.dedup();
    Polyline { track_points }
}
