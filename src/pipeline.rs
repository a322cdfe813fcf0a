use crate::{
    config::PipelineConfig,
    distance,
    elevation::{ElevationEnricher, ElevationService},
    segment_chainer::{self, NearestEndpointSelector, NextSegmentSelector},
    segment_dedup,
    segment_store::SegmentStore,
    simplifier,
    trail_vector::{Polyline, TrailSample},
};
use anyhow::Result;

/// Degraded but usable results. Anything worse than this is an `Err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PipelineWarning {
    ChainingIncomplete { unused_segments: usize },
    UnknownElevations { batches: usize, points: usize },
}

/// Everything one run produces, plus the warnings for whatever degraded.
pub struct PipelineOutput {
    // full resolution, for rendering
    pub full_polyline: Polyline,
    // for proximity queries
    pub simplified: Polyline,
    pub samples: Vec<TrailSample>,
    pub warnings: Vec<PipelineWarning>,
}

pub fn assemble(store: SegmentStore) -> Result<(Polyline, Option<PipelineWarning>)> {
    assemble_with(store, &mut NearestEndpointSelector)
}

/// Stitches the stored fragments into one trail, `selector` picks the next
/// fragment each step. Also returns a warning when some fragments could not
/// be attached.
pub fn assemble_with<N: NextSegmentSelector>(
    store: SegmentStore,
    selector: &mut N,
) -> Result<(Polyline, Option<PipelineWarning>)> {
    if store.is_empty() {
        bail!("no trail segments to assemble");
    }
    info!(
        "assembling {} segments ({} points)",
        store.len(),
        store.total_points()
    );
    let segments = segment_dedup::deduplicate(store.into_segments());
    let chained = segment_chainer::chain_segments_with(segments, selector);
    let warning = if chained.is_complete() {
        None
    } else {
        Some(PipelineWarning::ChainingIncomplete {
            unused_segments: chained.unused_segments,
        })
    };
    let polyline = segment_chainer::remove_consecutive_duplicates(chained.polyline);
    if polyline.len() < 2 {
        bail!(
            "assembled trail has {} points, need at least 2",
            polyline.len()
        );
    }
    Ok((polyline, warning))
}

pub async fn run<S: ElevationService>(
    store: SegmentStore,
    config: &PipelineConfig,
    elevation_service: S,
) -> Result<PipelineOutput> {
    run_with(store, config, elevation_service, &mut NearestEndpointSelector).await
}

pub async fn run_with<S: ElevationService, N: NextSegmentSelector>(
    store: SegmentStore,
    config: &PipelineConfig,
    elevation_service: S,
    selector: &mut N,
) -> Result<PipelineOutput> {
    config.validate()?;
    let mut warnings = Vec::new();

    let (full_polyline, chain_warning) = assemble_with(store, selector)?;
    warnings.extend(chain_warning);

    let simplified = simplifier::simplify_to_target(&full_polyline, &config.tolerance_search());
    let mileage = distance::accumulate(
        &simplified.track_points,
        config.authoritative_total_miles,
    )?;

    let enricher = ElevationEnricher::new(
        elevation_service,
        config.batch_size,
        config.retry_policy(),
        config.inter_batch_delay(),
    );
    let enrichment = enricher.enrich(&simplified.track_points).await;
    if enrichment.failed_batches > 0 {
        warnings.push(PipelineWarning::UnknownElevations {
            batches: enrichment.failed_batches,
            points: enrichment.unknown_count(),
        });
    }

    let samples = simplified
        .track_points
        .iter()
        .zip(mileage.cumulative_miles)
        .zip(enrichment.elevations_ft)
        .map(|((point, cumulative_miles), elevation_ft)| TrailSample {
            longitude: point.longitude,
            latitude: point.latitude,
            cumulative_miles,
            elevation_ft,
        })
        .collect();

    for warning in &warnings {
        warn!("pipeline finished with degraded result: {:?}", warning);
    }
    Ok(PipelineOutput {
        full_polyline,
        simplified,
        samples,
        warnings,
    })
}
