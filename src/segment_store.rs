use crate::trail_vector::{Segment, TrackPoint};

/// Raw fragments as handed over by a loader. Empty fragments never make it in.
#[derive(Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    pub fn new() -> Self {
        SegmentStore {
            segments: Vec::new(),
        }
    }

    /// Returns `false` if the fragment had no points and was dropped.
    pub fn add(&mut self, track_points: Vec<TrackPoint>) -> bool {
        if track_points.is_empty() {
            return false;
        }
        self.segments.push(Segment { track_points });
        true
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn total_points(&self) -> usize {
        self.segments.iter().map(|s| s.len()).sum()
    }

    pub fn into_segments(self) -> Vec<Segment> {
        self.segments
    }
}

impl FromIterator<Vec<TrackPoint>> for SegmentStore {
    fn from_iter<I: IntoIterator<Item = Vec<TrackPoint>>>(iter: I) -> Self {
        let mut store = SegmentStore::new();
        for track_points in iter {
            store.add(track_points);
        }
        store
    }
}
