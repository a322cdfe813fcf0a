/* Terrain elevation for every retained vertex.

Points are sent to the elevation service in batches, strictly one after the
other with a pause in between so we stay under the service's rate limit. A
batch that keeps failing is not fatal: its points just end up with an unknown
elevation and we move on to the next batch.
*/
use crate::config::PipelineConfig;
use crate::trail_vector::TrackPoint;
use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;

const FEET_PER_METER: f64 = 3.28084;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ElevationError {
    #[error("rate limited by elevation service")]
    RateLimited,
    #[error("elevation service returned status {0}")]
    Status(u16),
    #[error("elevation request failed: {0}")]
    Transport(String),
    #[error("unexpected elevation response: {0}")]
    Malformed(String),
}

/// One request per batch. The response must carry one value (in meters) per
/// requested point, in request order. `None` means the service has no data
/// for that point.
#[allow(async_fn_in_trait)]
pub trait ElevationService {
    async fn fetch_elevations(
        &self,
        batch: &[TrackPoint],
    ) -> std::result::Result<Vec<Option<f64>>, ElevationError>;
}

// Half-way values round away from zero, so below sea level is symmetric
// with above it.
pub fn meters_to_feet(meters: Option<f64>) -> Option<i32> {
    meters.map(|m| (m * FEET_PER_METER).round() as i32)
}

#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    // total attempts per batch, including the first one
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_millis(2000),
            max_backoff: Duration::from_millis(30000),
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum RetryStep {
    Done(Vec<Option<f64>>),
    Wait(Duration),
    Exhausted,
}

/// Retry bookkeeping for a single batch, kept apart from any I/O.
/// Feed it the outcome of each attempt and it says what to do next.
pub struct BatchRetry {
    policy: RetryPolicy,
    expected_len: usize,
    attempts: u32,
    next_backoff: Duration,
    last_error: Option<ElevationError>,
}

impl BatchRetry {
    pub fn new(policy: RetryPolicy, expected_len: usize) -> Self {
        let next_backoff = policy.initial_backoff.min(policy.max_backoff);
        BatchRetry {
            policy,
            expected_len,
            attempts: 0,
            next_backoff,
            last_error: None,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn last_error(&self) -> Option<&ElevationError> {
        self.last_error.as_ref()
    }

    pub fn on_outcome(
        &mut self,
        outcome: std::result::Result<Vec<Option<f64>>, ElevationError>,
    ) -> RetryStep {
        self.attempts += 1;
        let error = match outcome {
            Ok(values) if values.len() == self.expected_len => return RetryStep::Done(values),
            Ok(values) => ElevationError::Malformed(format!(
                "expected {} elevations, got {}",
                self.expected_len,
                values.len()
            )),
            Err(error) => error,
        };
        self.last_error = Some(error);

        if self.attempts >= self.policy.max_attempts {
            return RetryStep::Exhausted;
        }
        let wait = self.next_backoff;
        self.next_backoff = (self.next_backoff * 2).min(self.policy.max_backoff);
        RetryStep::Wait(wait)
    }
}

#[derive(Debug, PartialEq)]
pub struct Enrichment {
    pub elevations_ft: Vec<Option<i32>>,
    pub failed_batches: usize,
}

impl Enrichment {
    pub fn unknown_count(&self) -> usize {
        self.elevations_ft.iter().filter(|e| e.is_none()).count()
    }
}

pub struct ElevationEnricher<S> {
    service: S,
    batch_size: usize,
    policy: RetryPolicy,
    inter_batch_delay: Duration,
}

impl<S: ElevationService> ElevationEnricher<S> {
    pub fn new(
        service: S,
        batch_size: usize,
        policy: RetryPolicy,
        inter_batch_delay: Duration,
    ) -> Self {
        ElevationEnricher {
            service,
            batch_size: batch_size.max(1),
            policy,
            inter_batch_delay,
        }
    }

    async fn fetch_batch(&self, batch: &[TrackPoint]) -> Option<Vec<Option<f64>>> {
        let mut retry = BatchRetry::new(self.policy.clone(), batch.len());
        loop {
            let outcome = self.service.fetch_elevations(batch).await;
            match retry.on_outcome(outcome) {
                RetryStep::Done(values) => return Some(values),
                RetryStep::Wait(delay) => {
                    debug!(
                        "elevation attempt {} failed ({}), retrying in {:?}",
                        retry.attempts(),
                        retry
                            .last_error()
                            .map(|e| e.to_string())
                            .unwrap_or_default(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryStep::Exhausted => {
                    warn!(
                        "giving up on elevation batch of {} points after {} attempts: {}",
                        batch.len(),
                        retry.attempts(),
                        retry
                            .last_error()
                            .map(|e| e.to_string())
                            .unwrap_or_default()
                    );
                    return None;
                }
            }
        }
    }

    pub async fn enrich(&self, track_points: &[TrackPoint]) -> Enrichment {
        let mut elevations_ft = Vec::with_capacity(track_points.len());
        let mut failed_batches = 0;
        let batch_count = track_points.len().div_ceil(self.batch_size);

        for (i, batch) in track_points.chunks(self.batch_size).enumerate() {
            if i > 0 {
                tokio::time::sleep(self.inter_batch_delay).await;
            }
            match self.fetch_batch(batch).await {
                Some(meters) => {
                    elevations_ft.extend(meters.into_iter().map(meters_to_feet));
                }
                None => {
                    failed_batches += 1;
                    elevations_ft.extend(std::iter::repeat_n(None, batch.len()));
                }
            }
            info!("elevation batch {}/{} done", i + 1, batch_count);
        }

        Enrichment {
            elevations_ft,
            failed_batches,
        }
    }
}

#[derive(Deserialize)]
struct ElevationResponse {
    elevation: Vec<Option<f64>>,
}

/// Open-Meteo style elevation endpoint:
/// `GET {endpoint}?latitude=a,b&longitude=x,y` -> `{"elevation": [..]}`.
pub struct OpenElevationClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenElevationClient {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(OpenElevationClient {
            client,
            endpoint: endpoint.to_owned(),
        })
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        Self::new(&config.elevation_endpoint, config.request_timeout())
    }

    fn join_coordinates(batch: &[TrackPoint], f: impl Fn(&TrackPoint) -> f64) -> String {
        batch
            .iter()
            .map(|p| format!("{:.6}", f(p)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl ElevationService for OpenElevationClient {
    async fn fetch_elevations(
        &self,
        batch: &[TrackPoint],
    ) -> std::result::Result<Vec<Option<f64>>, ElevationError> {
        let latitudes = Self::join_coordinates(batch, |p| p.latitude);
        let longitudes = Self::join_coordinates(batch, |p| p.longitude);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("latitude", latitudes), ("longitude", longitudes)])
            .send()
            .await
            .map_err(|e| ElevationError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ElevationError::RateLimited);
        }
        if !status.is_success() {
            return Err(ElevationError::Status(status.as_u16()));
        }
        let body: ElevationResponse = response
            .json()
            .await
            .map_err(|e| ElevationError::Malformed(e.to_string()))?;
        Ok(body.elevation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feet_conversion() {
        assert_eq!(meters_to_feet(Some(1000.)), Some(3281));
        assert_eq!(meters_to_feet(Some(0.)), Some(0));
        assert_eq!(meters_to_feet(None), None);
        // Death Valley
        assert_eq!(meters_to_feet(Some(-86.)), Some(-282));
        assert_eq!(meters_to_feet(Some(-100.)), Some(-328));
    }

    #[test]
    fn backoff_doubles_until_exhausted() {
        let mut retry = BatchRetry::new(RetryPolicy::default(), 1);
        let mut waits = Vec::new();
        loop {
            match retry.on_outcome(Err(ElevationError::RateLimited)) {
                RetryStep::Wait(delay) => waits.push(delay.as_millis()),
                RetryStep::Exhausted => break,
                RetryStep::Done(_) => panic!("nothing succeeded"),
            }
        }
        assert_eq!(waits, vec![2000, 4000, 8000, 16000]);
        assert_eq!(retry.attempts(), 5);
    }

    #[test]
    fn backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 8,
            ..RetryPolicy::default()
        };
        let mut retry = BatchRetry::new(policy, 1);
        let mut waits = Vec::new();
        while let RetryStep::Wait(delay) = retry.on_outcome(Err(ElevationError::Status(503))) {
            waits.push(delay.as_millis());
        }
        assert_eq!(waits, vec![2000, 4000, 8000, 16000, 30000, 30000, 30000]);
    }

    #[test]
    fn wrong_length_is_retried() {
        let mut retry = BatchRetry::new(RetryPolicy::default(), 2);
        assert_eq!(
            retry.on_outcome(Ok(vec![Some(1.)])),
            RetryStep::Wait(Duration::from_millis(2000))
        );
        assert!(matches!(
            retry.last_error(),
            Some(ElevationError::Malformed(_))
        ));
        assert_eq!(
            retry.on_outcome(Ok(vec![Some(1.), None])),
            RetryStep::Done(vec![Some(1.), None])
        );
    }
}
