pub mod test_utils;

use test_utils::segment;
use trailline_core::segment_dedup;

#[test]
fn reversed_duplicate_keeps_longer() {
    let short = segment(&[(-116.467, 32.589), (-116.470, 32.600)]);
    let long = segment(&[
        (-116.4702, 32.6001),
        (-116.4690, 32.5950),
        (-116.4680, 32.5920),
        (-116.4671, 32.5889),
    ]);
    let result = segment_dedup::deduplicate(vec![short, long.clone()]);
    assert_eq!(result, vec![long]);
}

#[test]
fn equal_length_keeps_first_seen() {
    let a = segment(&[(0.0, 0.0), (0.0, 1.0)]);
    let b = segment(&[(0.0001, 1.0001), (0.0001, 0.0001)]);
    let result = segment_dedup::deduplicate(vec![a.clone(), b]);
    assert_eq!(result, vec![a]);
}

#[test]
fn distinct_endpoints_survive() {
    let a = segment(&[(0.0, 0.0), (0.0, 1.0)]);
    let b = segment(&[(0.0, 1.0), (0.0, 2.0)]);
    let c = segment(&[(0.0, 2.0), (0.0, 3.0)]);
    let result = segment_dedup::deduplicate(vec![a.clone(), b.clone(), c.clone()]);
    assert_eq!(result, vec![a, b, c]);
}

#[test]
fn closed_segment_is_kept() {
    let ring = segment(&[(1.0, 1.0), (1.5, 1.5), (2.0, 1.0), (1.0, 1.0)]);
    let result = segment_dedup::deduplicate(vec![ring.clone()]);
    assert_eq!(result, vec![ring]);
}

#[test]
fn half_way_endpoints_round_up() {
    let tie = segment(&[(0.0, 32.0625), (0.0, 33.0)]);
    let near = segment(&[(0.0, 33.0), (0.0, 31.0), (0.0, 32.0628)]);
    assert_eq!(
        segment_dedup::segment_key(&tie).unwrap(),
        "32.063,0.000|33.000,0.000"
    );
    assert_eq!(segment_dedup::segment_key(&tie), segment_dedup::segment_key(&near));

    let result = segment_dedup::deduplicate(vec![tie, near.clone()]);
    assert_eq!(result, vec![near]);
}

#[test]
fn tiny_negative_coordinate_keys_as_zero() {
    let a = segment(&[(-0.0001, 0.0), (0.0, 1.0)]);
    assert_eq!(
        segment_dedup::segment_key(&a).unwrap(),
        "0.000,0.000|1.000,0.000"
    );
}
