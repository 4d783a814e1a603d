use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::warn;

use crate::actors::inference::InferenceClientHandle;
use crate::actors::retry;
use crate::actors::traits::{Classifier, Scorer};
use crate::brain::router::normalize_categories;
use crate::error::AppError;
use crate::models::{ComplaintRecord, PipelineConfig, ScoredComplaint};
use crate::prompts;

/// One scored row as the inference service returns it. The service is loose
/// with types (string vs numeric ids, integral vs float scores), so the shape
/// here is tolerant and tightened during conversion.
#[derive(Debug, Deserialize)]
struct ScoredRow {
    id: serde_json::Value,
    summary: String,
    sentiment_score: f64,
}

#[derive(Debug, Deserialize)]
struct CategoriesPayload {
    categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ClassifiedPayload {
    classified_complaints: Vec<ClassifiedRow>,
}

#[derive(Debug, Deserialize)]
struct ClassifiedRow {
    id: serde_json::Value,
    #[serde(alias = "complaint_type", alias = "primary_category")]
    category: Option<String>,
    #[serde(default, alias = "secondary_category")]
    subcategory: Option<String>,
}

fn row_id(value: &serde_json::Value) -> String {
    match value.as_str() {
        Some(s) => s.to_string(),
        None => value.to_string(),
    }
}

/// AI-backed [`Scorer`]: one inference call covers the whole batch.
pub struct AiScorer {
    client: InferenceClientHandle,
    temperature: f32,
}

impl AiScorer {
    pub fn new(client: InferenceClientHandle, config: &PipelineConfig) -> Self {
        Self {
            client,
            temperature: config.scoring_temperature(),
        }
    }

    fn format_records(records: &[ComplaintRecord]) -> String {
        let mut formatted = String::from("Customer Complaints to Analyze:\n\n");
        for record in records {
            formatted.push_str(&format!(
                "Complaint ID: {}\nCreated: {}\nEnded: {}\nDialog: {}\n\n",
                record.id, record.created_at, record.ended_at, record.dialog_text
            ));
        }
        formatted
    }
}

#[async_trait]
impl Scorer for AiScorer {
    async fn score_batch(
        &self,
        records: &[ComplaintRecord],
    ) -> Result<Vec<ScoredComplaint>, AppError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self
            .client
            .complete(
                prompts::summarization_prompt(),
                Self::format_records(records),
                self.temperature,
            )
            .await?;

        let rows: Vec<ScoredRow> = serde_json::from_str(&raw)?;
        let mut by_id: HashMap<String, ScoredRow> =
            rows.into_iter().map(|row| (row_id(&row.id), row)).collect();

        records
            .iter()
            .map(|record| {
                let row = by_id.remove(&record.id).ok_or_else(|| {
                    AppError::MalformedResponse(format!(
                        "no scored row for record {}",
                        record.id
                    ))
                })?;
                let score = row.sentiment_score.round();
                if !(1.0..=10.0).contains(&score) {
                    return Err(AppError::MalformedResponse(format!(
                        "sentiment score {} out of range for record {}",
                        row.sentiment_score, record.id
                    )));
                }
                if row.summary.trim().is_empty() {
                    return Err(AppError::MalformedResponse(format!(
                        "empty summary for record {}",
                        record.id
                    )));
                }
                Ok(ScoredComplaint::from_record(record, row.summary, score as u8))
            })
            .collect()
    }
}

/// AI-backed [`Classifier`] with the bounded retry-with-temperature policy.
pub struct AiClassifier {
    client: InferenceClientHandle,
    temperatures: Vec<f32>,
}

impl AiClassifier {
    pub fn new(client: InferenceClientHandle, config: &PipelineConfig) -> Self {
        Self {
            client,
            temperatures: config.retry_temperatures.clone(),
        }
    }

    fn exhausted(&self) -> AppError {
        AppError::ClassificationUnavailable {
            attempts: self.temperatures.len(),
        }
    }
}

#[async_trait]
impl Classifier for AiClassifier {
    async fn derive_categories(
        &self,
        summaries: &[String],
        target: usize,
    ) -> Result<Vec<String>, AppError> {
        let input = serde_json::to_string_pretty(summaries)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let last_attempt = self.temperatures.len().saturating_sub(1);

        retry::with_temperatures(&self.temperatures, |attempt, temperature| {
            let client = self.client.clone();
            let prompt = prompts::category_creation_prompt(target);
            let input = input.clone();
            async move {
                let raw = client.complete(prompt, input, temperature).await?;
                let payload: CategoriesPayload = serde_json::from_str(&raw)?;
                let labels: Vec<String> = payload
                    .categories
                    .into_iter()
                    .map(|label| label.trim().to_string())
                    .filter(|label| !label.is_empty())
                    .collect();

                if labels.len() == target {
                    Ok(labels)
                } else if attempt == last_attempt && !labels.is_empty() {
                    // Salvage a partial result on the final attempt rather
                    // than discarding everything the service produced.
                    warn!(
                        "Final attempt returned {} categories; normalizing to {}",
                        labels.len(),
                        target
                    );
                    Ok(normalize_categories(labels, target))
                } else {
                    Err(AppError::MalformedResponse(format!(
                        "expected {} categories, got {}",
                        target,
                        labels.len()
                    )))
                }
            }
        })
        .await
        .map_err(|_| self.exhausted())
    }

    async fn classify(
        &self,
        items: &[ScoredComplaint],
        categories: &[String],
    ) -> Result<Vec<ScoredComplaint>, AppError> {
        if categories.is_empty() {
            return Err(AppError::Validation(
                "cannot classify against an empty category list".to_string(),
            ));
        }
        let input =
            serde_json::to_string_pretty(items).map_err(|e| AppError::Internal(e.to_string()))?;

        let assigned = retry::with_temperatures(&self.temperatures, |_attempt, temperature| {
            let client = self.client.clone();
            let prompt = prompts::classification_prompt(categories);
            let input = input.clone();
            async move {
                let raw = client.complete(prompt, input, temperature).await?;
                let payload: ClassifiedPayload = serde_json::from_str(&raw)?;
                let by_id: HashMap<String, ClassifiedRow> = payload
                    .classified_complaints
                    .into_iter()
                    .map(|row| (row_id(&row.id), row))
                    .collect();
                Ok(by_id)
            }
        })
        .await
        .map_err(|_| self.exhausted())?;

        Ok(items
            .iter()
            .map(|item| {
                let row = assigned.get(&item.id);
                let category = row
                    .and_then(|r| r.category.clone())
                    .filter(|label| {
                        let known = categories.iter().any(|c| c == label);
                        if !known {
                            warn!(
                                "Classifier returned unknown category {:?} for item {}",
                                label, item.id
                            );
                        }
                        known
                    })
                    .unwrap_or_else(|| categories[0].clone());
                let subcategory = row.and_then(|r| r.subcategory.clone());
                ScoredComplaint {
                    category: Some(category),
                    subcategory,
                    ..item.clone()
                }
            })
            .collect())
    }
}
