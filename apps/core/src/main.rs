// EchoDesk Core Entry Point
// Glue only: wire config + records into the pipeline and print the report.

mod actors;
mod brain;
mod error;
mod loader;
mod models;
mod pipeline;
mod prompts;
mod report;

#[cfg(test)]
mod tests;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use validator::Validate;

use actors::ai::{AiClassifier, AiScorer};
use actors::inference::InferenceClientHandle;
use actors::traits::{Classifier, Scorer};
use models::PipelineConfig;
use pipeline::{FallbackPolicy, Pipeline};
use report::Report;

/// EchoDesk - customer complaint analytics
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the complaints file (.json or .csv)
    input: PathBuf,

    /// Run fully offline with the deterministic scorer and keyword router
    #[arg(long)]
    offline: bool,

    /// Fail instead of falling back to heuristics when the AI service misbehaves
    #[arg(long)]
    strict: bool,

    /// Number of report categories (overrides ECHODESK_CATEGORY_COUNT)
    #[arg(long)]
    categories: Option<usize>,

    /// Emit each stage output as it completes
    #[arg(long)]
    stepwise: bool,
}

/// Builds the pipeline configuration from the environment. The core itself
/// never reads env vars; everything funnels through this function at the edge.
fn config_from_env() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    if let Ok(endpoint) = std::env::var("ECHODESK_ENDPOINT") {
        config.endpoint = endpoint;
    }
    if let Ok(model_id) = std::env::var("ECHODESK_MODEL_ID") {
        config.model_id = model_id;
    }
    if let Ok(api_key) = std::env::var("ECHODESK_API_KEY") {
        config.api_key = api_key;
    }
    if let Ok(count) = std::env::var("ECHODESK_CATEGORY_COUNT") {
        match count.parse() {
            Ok(count) => config.category_count = count,
            Err(_) => warn!("Ignoring unparseable ECHODESK_CATEGORY_COUNT={:?}", count),
        }
    }
    if let Ok(secs) = std::env::var("ECHODESK_TIMEOUT_SECS") {
        match secs.parse() {
            Ok(secs) => config.request_timeout_secs = secs,
            Err(_) => warn!("Ignoring unparseable ECHODESK_TIMEOUT_SECS={:?}", secs),
        }
    }
    config
}

async fn run_to_report<S: Scorer, C: Classifier>(
    mut pipeline: Pipeline<S, C>,
    stepwise: bool,
) -> Result<Report> {
    if !stepwise {
        return Ok(pipeline.run().await?);
    }

    while let Some(output) = pipeline.advance().await? {
        info!("Stage complete: {}", output.stage);
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    pipeline
        .report()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("pipeline finished without a report"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    dotenv::dotenv().ok();
    let args = Args::parse();

    let mut config = config_from_env();
    if let Some(categories) = args.categories {
        config.category_count = categories;
    }
    config.validate()?;

    let records = loader::load_records(&args.input)?;

    let offline = args.offline || config.api_key.is_empty();
    if offline && args.strict {
        anyhow::bail!("--strict requires an AI-backed run, but none is configured");
    }
    if offline && !args.offline {
        warn!("No API key configured; using the deterministic pipeline");
    }

    info!(
        "Pipeline starting - records={}, categories={}, offline={}",
        records.len(),
        config.category_count,
        offline
    );

    let report = if offline {
        run_to_report(Pipeline::offline(config, records), args.stepwise).await?
    } else {
        let policy = if args.strict {
            FallbackPolicy::RequireAi
        } else {
            FallbackPolicy::UseHeuristics
        };
        let client = InferenceClientHandle::new(&config);
        let scorer = Arc::new(AiScorer::new(client.clone(), &config));
        let classifier = Arc::new(AiClassifier::new(client, &config));
        run_to_report(
            Pipeline::new(config, policy, scorer, classifier, records),
            args.stepwise,
        )
        .await?
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod main_tests {
    use super::*;

    #[test]
    fn test_config_from_env_overrides() {
        temp_env::with_vars(
            [
                ("ECHODESK_ENDPOINT", Some("https://inference.example.com")),
                ("ECHODESK_MODEL_ID", Some("test-model")),
                ("ECHODESK_API_KEY", Some("sekret")),
                ("ECHODESK_CATEGORY_COUNT", Some("6")),
                ("ECHODESK_TIMEOUT_SECS", Some("12")),
            ],
            || {
                let config = config_from_env();
                assert_eq!(config.endpoint, "https://inference.example.com");
                assert_eq!(config.model_id, "test-model");
                assert_eq!(config.api_key, "sekret");
                assert_eq!(config.category_count, 6);
                assert_eq!(config.request_timeout_secs, 12);
                assert!(config.validate().is_ok());
            },
        );
    }

    #[test]
    fn test_config_from_env_ignores_garbage_numbers() {
        temp_env::with_vars(
            [("ECHODESK_CATEGORY_COUNT", Some("eight"))],
            || {
                let config = config_from_env();
                assert_eq!(config.category_count, PipelineConfig::default().category_count);
            },
        );
    }
}
