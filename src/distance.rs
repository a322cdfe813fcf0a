use crate::trail_vector::TrackPoint;
use anyhow::Result;
use itertools::Itertools;

pub const EARTH_RADIUS_MILES: f64 = 3958.8;

pub fn haversine_miles(a: &TrackPoint, b: &TrackPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let h = (d_lat / 2.).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.).sin().powi(2);
    2. * EARTH_RADIUS_MILES * h.sqrt().atan2((1. - h).sqrt())
}

/// Cumulative great-circle distance, first entry is always 0.
pub fn raw_cumulative_miles(track_points: &[TrackPoint]) -> Vec<f64> {
    let mut cumulative = Vec::with_capacity(track_points.len());
    if track_points.is_empty() {
        return cumulative;
    }
    cumulative.push(0.);
    let mut total = 0.;
    for (prev, curr) in track_points.iter().tuple_windows() {
        total += haversine_miles(prev, curr);
        cumulative.push(total);
    }
    cumulative
}

#[derive(Debug, PartialEq)]
pub struct TrailMileage {
    pub cumulative_miles: Vec<f64>,
    pub raw_total_miles: f64,
    pub scale: f64,
}

/// A piecewise linear trace never measures the same as the published trail
/// length, so all cumulative values get one global correction factor that
/// makes the last one equal `authoritative_total_miles`.
pub fn accumulate(track_points: &[TrackPoint], authoritative_total_miles: f64) -> Result<TrailMileage> {
    let raw = raw_cumulative_miles(track_points);
    let raw_total_miles = raw.last().copied().unwrap_or(0.);
    if raw_total_miles <= 0. {
        bail!(
            "cannot scale trail mileage: raw total is {} miles over {} points",
            raw_total_miles,
            track_points.len()
        );
    }
    let scale = authoritative_total_miles / raw_total_miles;
    info!(
        "raw trail length {:.2} mi, scaled by {:.4} to {:.2} mi",
        raw_total_miles, scale, authoritative_total_miles
    );

    let mut cumulative_miles: Vec<f64> = raw.into_iter().map(|miles| miles * scale).collect();
    // pin the end so floating point noise can't drift off the published total
    if let Some(last) = cumulative_miles.last_mut() {
        *last = authoritative_total_miles;
    }
    Ok(TrailMileage {
        cumulative_miles,
        raw_total_miles,
        scale,
    })
}

pub fn round_to_hundredths(miles: f64) -> f64 {
    (miles * 100.).round() / 100.
}
