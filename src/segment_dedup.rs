/* The same stretch of trail is often recorded more than once, sometimes in the
opposite direction. Fragments are matched on their (rounded) endpoints and only
the one with the most points survives.
*/
use crate::trail_vector::{Segment, TrackPoint};
use std::collections::HashMap;

const KEY_SEPARATOR: &str = "|";

// 3 decimal places is roughly 111m at the equator.
fn round_to_thousandths(degrees: f64) -> f64 {
    // `{:.3}` alone rounds exact ties to even, round first so 32.0625 and
    // 32.0628 land on the same key. Adding 0. turns -0. into 0.
    (degrees * 1000.).round() / 1000. + 0.
}

fn endpoint_key(point: &TrackPoint) -> String {
    format!(
        "{:.3},{:.3}",
        round_to_thousandths(point.latitude),
        round_to_thousandths(point.longitude)
    )
}

/// Order independent key built from both endpoints, so a reversed copy of a
/// fragment collides with the original.
pub fn segment_key(segment: &Segment) -> Option<String> {
    let start = endpoint_key(segment.first()?);
    let end = endpoint_key(segment.last()?);
    let (low, high) = if start <= end {
        (start, end)
    } else {
        (end, start)
    };
    Some(format!("{low}{KEY_SEPARATOR}{high}"))
}

/// Collapses fragments sharing an endpoint pair, keeping the longest. The
/// output keeps first-seen order of the keys.
pub fn deduplicate(segments: Vec<Segment>) -> Vec<Segment> {
    let input_count = segments.len();
    let mut slot_by_key: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<Segment> = Vec::new();

    for segment in segments {
        let key = match segment_key(&segment) {
            Some(key) => key,
            None => continue,
        };
        match slot_by_key.get(&key) {
            Some(&slot) => {
                if segment.len() > kept[slot].len() {
                    kept[slot] = segment;
                }
            }
            None => {
                slot_by_key.insert(key, kept.len());
                kept.push(segment);
            }
        }
    }

    debug!(
        "deduplicated {} segments into {}",
        input_count,
        kept.len()
    );
    kept
}

#[cfg(test)]
mod tests {
    use super::segment_key;
    use crate::trail_vector::{Segment, TrackPoint};

    fn segment(points: &[(f64, f64)]) -> Segment {
        Segment {
            track_points: points
                .iter()
                .map(|(lon, lat)| TrackPoint::new(*lon, *lat))
                .collect(),
        }
    }

    #[test]
    fn key_ignores_direction() {
        let forward = segment(&[(-116.4671, 32.5898), (-116.4702, 32.6001)]);
        let backward = segment(&[(-116.4702, 32.6001), (-116.4671, 32.5898)]);
        assert_eq!(segment_key(&forward), segment_key(&backward));
        assert_eq!(
            segment_key(&forward).unwrap(),
            "32.590,-116.467|32.600,-116.470"
        );
    }

    #[test]
    fn key_of_closed_segment_is_symmetric() {
        let ring = segment(&[(1.0, 2.0), (1.5, 2.5), (1.0, 2.0)]);
        assert_eq!(segment_key(&ring).unwrap(), "2.000,1.000|2.000,1.000");
    }
}
