use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// One raw customer interaction, as supplied by the record loader.
///
/// Records are immutable once loaded; the pipeline only ever derives new
/// values from them. Timestamps are kept as the loader found them (possibly
/// empty); the core does not re-validate them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplaintRecord {
    /// Stable identifier, unique within a batch.
    pub id: String,
    /// Raw conversation text. May contain `<br>` or newline turn markers and
    /// `C:`/`A:` speaker prefixes.
    pub dialog_text: String,
    /// When the interaction started. Empty string when the source omits it.
    #[serde(default)]
    pub created_at: String,
    /// When the interaction ended. Empty string when the source omits it.
    #[serde(default)]
    pub ended_at: String,
}

/// A complaint after the scoring stage, optionally carrying its category
/// assignment after the categorizing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredComplaint {
    pub id: String,
    /// Short (1-2 sentence) synopsis, derived once and never recomputed.
    pub summary: String,
    /// Sentiment on the 1-10 scale; 1 = extremely negative, 10 = extremely
    /// positive. The deterministic scorer never emits exactly 5.
    pub sentiment_score: u8,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub ended_at: String,
    /// Primary category label. `None` until the categorizing stage ran; items
    /// still unassigned at aggregation land in the "Uncategorized" group.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional secondary dimension. The AI classifier may supply it; the
    /// keyword router never invents one.
    #[serde(default)]
    pub subcategory: Option<String>,
}

impl ScoredComplaint {
    /// Builds the scored view of a record, leaving categorization for later.
    pub fn from_record(record: &ComplaintRecord, summary: String, sentiment_score: u8) -> Self {
        Self {
            id: record.id.clone(),
            summary,
            sentiment_score,
            created_at: record.created_at.clone(),
            ended_at: record.ended_at.clone(),
            category: None,
            subcategory: None,
        }
    }
}

/// Configuration for one pipeline run.
///
/// Everything the core needs from the environment arrives through this struct
/// at construction time; the pipeline itself never reads env vars or any other
/// ambient state.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct PipelineConfig {
    /// Identifier of the inference model, appended to the endpoint path.
    #[validate(length(min = 1))]
    pub model_id: String,
    /// Base URL of the inference service.
    #[validate(url)]
    pub endpoint: String,
    /// Bearer token for the inference service. Empty means no AI backend is
    /// available and callers should run the deterministic path.
    pub api_key: String,
    /// Exact number of categories the report must carry.
    #[validate(range(min = 1, max = 16))]
    pub category_count: usize,
    /// Per-request timeout for inference calls, in seconds.
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_secs: u64,
    /// Ordered temperature ladder for classification retries. Each entry is
    /// one attempt; the list length is the retry bound.
    #[validate(length(min = 1, max = 8), custom(function = validate_temperatures))]
    pub retry_temperatures: Vec<f32>,
    /// Token cap passed through to the inference service.
    #[validate(range(min = 1))]
    pub max_tokens: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model_id: "command-r-plus".to_string(),
            endpoint: "http://localhost:8080".to_string(),
            api_key: String::new(),
            category_count: 8,
            request_timeout_secs: 30,
            retry_temperatures: vec![0.7, 0.5, 0.3, 0.9],
            max_tokens: 1500,
        }
    }
}

impl PipelineConfig {
    /// Request timeout as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Temperature used for the single-attempt scoring call.
    pub fn scoring_temperature(&self) -> f32 {
        self.retry_temperatures.first().copied().unwrap_or(0.7)
    }
}

fn validate_temperatures(temperatures: &[f32]) -> Result<(), ValidationError> {
    if temperatures.iter().any(|t| !(0.0..=2.0).contains(t)) {
        return Err(ValidationError::new("temperature_out_of_range"));
    }
    Ok(())
}
