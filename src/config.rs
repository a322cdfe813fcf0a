use crate::elevation::RetryPolicy;
use crate::simplifier::ToleranceSearch;
use anyhow::Result;
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path, time::Duration};

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // published length of the trail, all mileage is scaled to match it
    pub authoritative_total_miles: f64,
    pub batch_size: usize,
    // attempts per elevation batch, including the first one
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub inter_batch_delay_ms: u64,
    pub simplification_target_count: usize,
    pub simplification_tolerance_bounds: (f64, f64),
    pub simplification_max_iterations: usize,
    pub simplification_target_slack: f64,
    pub elevation_endpoint: String,
    pub request_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            // Pacific Crest Trail, Mexico to Canada
            authoritative_total_miles: 2650.0,
            batch_size: 100,
            max_retries: 5,
            initial_backoff_ms: 2000,
            max_backoff_ms: 30000,
            inter_batch_delay_ms: 1500,
            simplification_target_count: 5000,
            simplification_tolerance_bounds: (0.0, 0.1),
            simplification_max_iterations: 30,
            simplification_target_slack: 0.05,
            elevation_endpoint: "https://api.open-meteo.com/v1/elevation".to_owned(),
            request_timeout_ms: 30000,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: PipelineConfig =
            serde_json::from_reader(BufReader::new(File::open(path.as_ref())?))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.authoritative_total_miles > 0.) {
            bail!(
                "authoritative_total_miles must be positive, got {}",
                self.authoritative_total_miles
            );
        }
        if self.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }
        if self.max_retries == 0 {
            bail!("max_retries must be at least 1");
        }
        let (low, high) = self.simplification_tolerance_bounds;
        if !(low >= 0. && low < high) {
            bail!("invalid simplification_tolerance_bounds ({}, {})", low, high);
        }
        if self.simplification_target_count < 2 {
            bail!("simplification_target_count must be at least 2");
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        }
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn tolerance_search(&self) -> ToleranceSearch {
        let (lower_bound, upper_bound) = self.simplification_tolerance_bounds;
        ToleranceSearch {
            target_count: self.simplification_target_count,
            lower_bound,
            upper_bound,
            max_iterations: self.simplification_max_iterations,
            slack: self.simplification_target_slack,
        }
    }
}
