#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl TrackPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        TrackPoint {
            latitude,
            longitude,
        }
    }
}

impl From<TrackPoint> for geo_types::Point<f64> {
    fn from(point: TrackPoint) -> Self {
        geo_types::Point::new(point.longitude, point.latitude)
    }
}

/// One raw fragment of the trail. The orientation is unknown when it is
/// ingested.
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub track_points: Vec<TrackPoint>,
}

impl Segment {
    pub fn first(&self) -> Option<&TrackPoint> {
        self.track_points.first()
    }

    pub fn last(&self) -> Option<&TrackPoint> {
        self.track_points.last()
    }

    pub fn len(&self) -> usize {
        self.track_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_points.is_empty()
    }

    pub fn reverse(&mut self) {
        self.track_points.reverse();
    }
}

/// A continuous trail path, ordered south to north once assembled.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    pub track_points: Vec<TrackPoint>,
}

impl Polyline {
    pub fn len(&self) -> usize {
        self.track_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track_points.is_empty()
    }
}

/// One retained vertex with its scaled mileage and elevation.
#[derive(Clone, Debug, PartialEq)]
pub struct TrailSample {
    pub longitude: f64,
    pub latitude: f64,
    pub cumulative_miles: f64,
    // `None` when the elevation service never answered for this point.
    pub elevation_ft: Option<i32>,
}
