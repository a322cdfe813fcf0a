use crate::distance::round_to_hundredths;
use crate::trail_vector::{Polyline, TrailSample};
use anyhow::Result;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use serde::Serialize;
use std::io::Write;

pub const TRACK_NAME: &str = "Trail";

pub fn polyline_to_gpx(polyline: &Polyline) -> Gpx {
    let mut segment = TrackSegment::new();
    segment.points = polyline
        .track_points
        .iter()
        .map(|point| Waypoint::new((*point).into()))
        .collect();
    let mut track = Track::new();
    track.name = Some(TRACK_NAME.to_string());
    track.segments.push(segment);
    Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(env!("CARGO_PKG_NAME").to_string()),
        tracks: vec![track],
        ..Default::default()
    }
}

pub fn write_polyline_gpx<W: Write>(polyline: &Polyline, writer: &mut W) -> Result<()> {
    gpx::write(&polyline_to_gpx(polyline), writer)?;
    Ok(())
}

#[derive(Serialize)]
struct SampleRecord {
    lon: f64,
    lat: f64,
    mile: f64,
    elevation_ft: Option<i32>,
}

/// Samples as a JSON array, mileage rounded to 2 decimal places.
pub fn write_samples_json<W: Write>(samples: &[TrailSample], writer: &mut W) -> Result<()> {
    let records: Vec<SampleRecord> = samples
        .iter()
        .map(|sample| SampleRecord {
            lon: sample.longitude,
            lat: sample.latitude,
            mile: round_to_hundredths(sample.cumulative_miles),
            elevation_ft: sample.elevation_ft,
        })
        .collect();
    serde_json::to_writer(writer, &records)?;
    Ok(())
}
