//! Bench command implementation.

use super::Session;
use crate::cli::BenchArgs;
use crate::error::Result;
use credex_eval::{Benchmark, BenchmarkConfig, FixtureSet};
use std::fs;
use std::sync::Arc;
use tracing::info;

/// Execute the bench command.
pub async fn execute_bench(args: BenchArgs, session: &Session) -> Result<()> {
    let mut fixtures = FixtureSet::load(&args.fixtures)?;
    if let Some(scenario) = &args.scenario {
        fixtures = fixtures.filter_scenario(scenario);
    }
    if fixtures.is_empty() {
        println!("{}", session.formatter.warning("No fixtures match."));
        return Ok(());
    }

    let config = BenchmarkConfig {
        iterations: args.iterations,
        concurrency: args.concurrency,
    };
    let benchmark = Benchmark::new(Arc::new(session.extractor()?), config)?;
    let report = benchmark.run(&fixtures).await?;

    if let Some(path) = &args.output {
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        info!(path = %path.display(), "Benchmark report written");
    }

    println!("{}", session.formatter.format_benchmark(&report)?);
    Ok(())
}
