//! Repeated benchmark over a fixture set
//!
//! Each fixture is run through the full pipeline a number of times. Runs are
//! independent, so up to `concurrency` of them are in flight at once.

use crate::analysis::{FieldLevelAnalysis, RunOutcome};
use crate::error::{EvalError, Result};
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::scorer::{score_expected, RecordAccuracy};
use credex_domain::GenerationProvider;
use credex_extractor::Extractor;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Benchmark settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Runs per fixture
    pub iterations: usize,
    /// Runs in flight at once
    pub concurrency: usize,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            iterations: 5,
            concurrency: 1,
        }
    }
}

impl BenchmarkConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.iterations == 0 {
            return Err("iterations must be > 0".to_string());
        }
        if self.concurrency == 0 {
            return Err("concurrency must be > 0".to_string());
        }
        Ok(())
    }
}

/// Latency distribution of successful pipeline runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    /// Runs measured
    pub samples: usize,
    /// Arithmetic mean
    pub mean: Duration,
    /// Median
    pub p50: Duration,
    /// 95th percentile
    pub p95: Duration,
    /// Slowest run
    pub max: Duration,
}

impl LatencySummary {
    /// Summarize `samples`; empty input gives all zeros
    pub fn from_samples(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::default();
        }
        let mut sorted = samples.to_vec();
        sorted.sort();

        let total: Duration = sorted.iter().sum();
        Self {
            samples: sorted.len(),
            mean: total / sorted.len() as u32,
            p50: percentile(&sorted, 0.50),
            p95: percentile(&sorted, 0.95),
            max: sorted[sorted.len() - 1],
        }
    }
}

/// Nearest-rank percentile of a sorted, non-empty slice
fn percentile(sorted: &[Duration], p: f64) -> Duration {
    let rank = (p * sorted.len() as f64).ceil() as usize;
    sorted[rank.clamp(1, sorted.len()) - 1]
}

/// Results of one fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureReport {
    /// Fixture name, e.g. `Chat level2`
    pub name: String,
    /// Scenario
    pub scenario: String,
    /// Level
    pub level: u32,
    /// Every run, in iteration order
    pub runs: Vec<RunOutcome>,
    /// Accuracy of each run that produced a record, in iteration order
    pub accuracy: Vec<RecordAccuracy>,
    /// Field-level aggregation of the runs
    pub analysis: FieldLevelAnalysis,
    /// Wall time of runs that produced a record
    pub latency: LatencySummary,
}

impl FixtureReport {
    fn new(case: &FixtureCase, runs: Vec<RunOutcome>) -> Self {
        let accuracy = runs
            .iter()
            .filter_map(RunOutcome::record)
            .map(|record| score_expected(&case.expected, record))
            .collect();
        let latencies: Vec<Duration> = runs
            .iter()
            .filter_map(|run| match run {
                RunOutcome::Extracted(result) => Some(result.extraction_time),
                RunOutcome::Failed { .. } => None,
            })
            .collect();

        Self {
            name: case.name(),
            scenario: case.scenario.clone(),
            level: case.level,
            analysis: FieldLevelAnalysis::from_results(&runs, &case.expected),
            latency: LatencySummary::from_samples(&latencies),
            accuracy,
            runs,
        }
    }

    /// Runs that failed outright
    pub fn failures(&self) -> usize {
        self.runs
            .iter()
            .filter(|r| matches!(r, RunOutcome::Failed { .. }))
            .count()
    }

    /// Mean record accuracy over runs that produced a record
    pub fn mean_accuracy(&self) -> f64 {
        if self.accuracy.is_empty() {
            return 0.0;
        }
        self.accuracy.iter().map(|a| a.overall).sum::<f64>() / self.accuracy.len() as f64
    }
}

/// Results of a whole benchmark
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkReport {
    /// Provider that answered
    pub provider: String,
    /// Settings used
    pub config: BenchmarkConfig,
    /// One report per fixture, in fixture order
    pub fixtures: Vec<FixtureReport>,
    /// Latency over every run that produced a record
    pub latency: LatencySummary,
    /// Wall time of the whole benchmark
    pub elapsed: Duration,
}

impl BenchmarkReport {
    /// Total runs
    pub fn total_runs(&self) -> usize {
        self.fixtures.iter().map(|f| f.runs.len()).sum()
    }

    /// Runs that succeeded (record with no warnings)
    pub fn successful_runs(&self) -> usize {
        self.fixtures
            .iter()
            .flat_map(|f| f.runs.iter())
            .filter(|r| r.is_success())
            .count()
    }
}

/// Runs fixtures through a shared [`Extractor`]
pub struct Benchmark<P: GenerationProvider> {
    extractor: Arc<Extractor<P>>,
    config: BenchmarkConfig,
}

impl<P> Benchmark<P>
where
    P: GenerationProvider + 'static,
{
    /// Create a benchmark; fails on an invalid configuration
    pub fn new(extractor: Arc<Extractor<P>>, config: BenchmarkConfig) -> Result<Self> {
        config.validate().map_err(EvalError::Fixture)?;
        Ok(Self { extractor, config })
    }

    /// Settings
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run every fixture `iterations` times
    ///
    /// Routing, parse, provider and timeout failures are recorded as failed
    /// runs. A fatal extractor error aborts the benchmark.
    pub async fn run(&self, fixtures: &FixtureSet) -> Result<BenchmarkReport> {
        let start = Instant::now();
        let iterations = self.config.iterations;
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let mut tasks = JoinSet::new();

        info!(
            fixtures = fixtures.len(),
            iterations,
            concurrency = self.config.concurrency,
            provider = self.extractor.provider_name(),
            "Starting benchmark"
        );

        for (case_index, case) in fixtures.cases.iter().enumerate() {
            for iteration in 0..iterations {
                let extractor = Arc::clone(&self.extractor);
                let semaphore = Arc::clone(&semaphore);
                let document = case.document.clone();
                let name = case.name();

                tasks.spawn(async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| EvalError::Task(e.to_string()))?;
                    debug!(fixture = %name, iteration, "Run started");

                    let outcome = match extractor.extract(&document).await {
                        Ok(result) => RunOutcome::Extracted(Box::new(result)),
                        Err(e) if e.is_fatal() => return Err(EvalError::Extractor(e)),
                        Err(e) => {
                            warn!(
                                fixture = %name,
                                iteration,
                                error = %e,
                                raw = e.raw_response().unwrap_or_default(),
                                "Run failed"
                            );
                            RunOutcome::Failed {
                                error: e.to_string(),
                                raw_response: e.raw_response().map(str::to_string),
                            }
                        }
                    };
                    Ok((case_index, iteration, outcome))
                });
            }
        }

        let mut slots: Vec<Vec<Option<RunOutcome>>> = fixtures
            .cases
            .iter()
            .map(|_| vec![None; iterations])
            .collect();

        while let Some(joined) = tasks.join_next().await {
            match joined? {
                Ok((case_index, iteration, outcome)) => {
                    slots[case_index][iteration] = Some(outcome);
                }
                Err(e) => {
                    error!(error = %e, "Benchmark aborted");
                    tasks.abort_all();
                    return Err(e);
                }
            }
        }

        let reports: Vec<FixtureReport> = fixtures
            .cases
            .iter()
            .zip(slots)
            .map(|(case, runs)| FixtureReport::new(case, runs.into_iter().flatten().collect()))
            .collect();

        let all_latencies: Vec<Duration> = reports
            .iter()
            .flat_map(|r| r.runs.iter())
            .filter_map(|run| match run {
                RunOutcome::Extracted(result) => Some(result.extraction_time),
                RunOutcome::Failed { .. } => None,
            })
            .collect();

        let report = BenchmarkReport {
            provider: self.extractor.provider_name().to_string(),
            config: self.config,
            fixtures: reports,
            latency: LatencySummary::from_samples(&all_latencies),
            elapsed: start.elapsed(),
        };

        info!(
            runs = report.total_runs(),
            successful = report.successful_runs(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Benchmark finished"
        );
        Ok(report)
    }
}
