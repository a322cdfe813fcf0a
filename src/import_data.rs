use crate::segment_store::SegmentStore;
use crate::trail_vector::TrackPoint;
use anyhow::{Error, Result};
use kml::{
    types::{Geometry, LineString},
    Kml, KmlReader,
};
use std::{fs::File, io::BufReader};

fn non_empty(store: SegmentStore, file_path: &str) -> Result<SegmentStore> {
    if store.is_empty() {
        return Err(Error::msg(format!("No segments found in {file_path}")));
    }
    info!(
        "loaded {} segments ({} points) from {}",
        store.len(),
        store.total_points(),
        file_path
    );
    Ok(store)
}

/// Every GPX track segment becomes one trail segment.
pub fn load_gpx(file_path: &str) -> Result<SegmentStore> {
    let gpx_data = gpx::read(BufReader::new(File::open(file_path)?))?;
    let store: SegmentStore = gpx_data
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .map(|segment| {
            segment
                .points
                .iter()
                .map(|point| {
                    let p = point.point();
                    TrackPoint::new(p.x(), p.y())
                })
                .collect::<Vec<_>>()
        })
        .collect();
    non_empty(store, file_path)
}

/// Every KML LineString (including the ones nested in placemarks and multi
/// geometries) becomes one trail segment.
pub fn load_kml(file_path: &str) -> Result<SegmentStore> {
    let kml_data =
        KmlReader::<_, f64>::from_reader(BufReader::new(File::open(file_path)?)).read()?;
    let mut store = SegmentStore::new();
    for line_string in collect_line_strings(vec![kml_data]) {
        store.add(
            line_string
                .coords
                .into_iter()
                .map(|c| TrackPoint::new(c.x, c.y))
                .collect(),
        );
    }
    non_empty(store, file_path)
}

fn collect_line_strings(kml: Vec<Kml>) -> Vec<LineString> {
    kml.into_iter()
        .flat_map(|k| match k {
            Kml::KmlDocument(d) => collect_line_strings(d.elements),
            Kml::Document { attrs: _, elements } => collect_line_strings(elements),
            Kml::Folder { attrs: _, elements } => collect_line_strings(elements),
            Kml::Placemark(p) => p.geometry.map(geometry_line_strings).unwrap_or_default(),
            Kml::LineString(l) => vec![l],
            Kml::MultiGeometry(m) => m
                .geometries
                .into_iter()
                .flat_map(geometry_line_strings)
                .collect(),
            _ => vec![],
        })
        .collect()
}

fn geometry_line_strings(geometry: Geometry) -> Vec<LineString> {
    match geometry {
        Geometry::LineString(l) => vec![l],
        Geometry::MultiGeometry(m) => m
            .geometries
            .into_iter()
            .flat_map(geometry_line_strings)
            .collect(),
        _ => vec![],
    }
}
