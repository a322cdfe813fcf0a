#![allow(dead_code)]

use std::sync::Mutex;
use tokio::time::{Duration, Instant};
use trailline_core::elevation::{ElevationError, ElevationService};
use trailline_core::segment_chainer::{Candidate, NextSegmentSelector};
use trailline_core::trail_vector::{Polyline, Segment, TrackPoint};

pub fn track_points(points: &[(f64, f64)]) -> Vec<TrackPoint> {
    points
        .iter()
        .map(|(lon, lat)| TrackPoint::new(*lon, *lat))
        .collect()
}

pub fn segment(points: &[(f64, f64)]) -> Segment {
    Segment {
        track_points: track_points(points),
    }
}

// Deterministic random walk heading north. Dense and rough at every scale,
// so the simplified point count changes gradually with the tolerance.
pub fn random_walk_trail(n: usize) -> Polyline {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut longitude = -120.0;
    let track_points = (0..n)
        .map(|i| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            longitude += (unit - 0.5) * 0.002;
            TrackPoint::new(longitude, 34.0 + 0.0005 * i as f64)
        })
        .collect();
    Polyline { track_points }
}

// Refuses everything, as if the remaining fragments were unreachable.
pub struct GiveUpSelector;

impl NextSegmentSelector for GiveUpSelector {
    fn select(&mut self, _: &TrackPoint, _: &[Segment], _: &[bool]) -> Option<Candidate> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub batch_len: usize,
    pub first_latitude: f64,
    pub at: Duration,
}

type Responder =
    Box<dyn Fn(usize, &[TrackPoint]) -> Result<Vec<Option<f64>>, ElevationError> + Send + Sync>;

/// Scripted elevation service. `respond` gets the call index (0 based) and
/// the batch.
pub struct FakeElevationService {
    start: Instant,
    respond: Responder,
    calls: Mutex<Vec<RecordedCall>>,
}

impl FakeElevationService {
    pub fn new(
        respond: impl Fn(usize, &[TrackPoint]) -> Result<Vec<Option<f64>>, ElevationError>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        FakeElevationService {
            start: Instant::now(),
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
        }
    }

    // elevation in meters equals the latitude, handy for checking ordering
    pub fn latitude_as_meters() -> Self {
        Self::new(|_, batch| Ok(batch.iter().map(|p| Some(p.latitude)).collect()))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl ElevationService for &FakeElevationService {
    async fn fetch_elevations(
        &self,
        batch: &[TrackPoint],
    ) -> Result<Vec<Option<f64>>, ElevationError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(RecordedCall {
                batch_len: batch.len(),
                first_latitude: batch[0].latitude,
                at: self.start.elapsed(),
            });
            calls.len() - 1
        };
        (self.respond)(index, batch)
    }
}
