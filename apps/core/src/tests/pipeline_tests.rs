//! Pipeline Integration Tests
//!
//! End-to-end runs over mock `Scorer`/`Classifier` implementations: fallback
//! policy behavior, stepwise/all-at-once equivalence, and conservation.

use std::sync::Arc;

use async_trait::async_trait;

use crate::actors::traits::{Classifier, Scorer};
use crate::error::AppError;
use crate::models::{ComplaintRecord, PipelineConfig, ScoredComplaint};
use crate::pipeline::{FallbackPolicy, Pipeline, Stage};

// ============================================================================
// Test Fixtures
// ============================================================================

/// Scorer that always fails, as if the service were unreachable.
struct FailingScorer;

#[async_trait]
impl Scorer for FailingScorer {
    async fn score_batch(
        &self,
        _records: &[ComplaintRecord],
    ) -> Result<Vec<ScoredComplaint>, AppError> {
        Err(AppError::Upstream("service down".to_string()))
    }
}

/// Classifier that always reports retry exhaustion.
struct FailingClassifier;

#[async_trait]
impl Classifier for FailingClassifier {
    async fn derive_categories(
        &self,
        _summaries: &[String],
        _target: usize,
    ) -> Result<Vec<String>, AppError> {
        Err(AppError::ClassificationUnavailable { attempts: 4 })
    }

    async fn classify(
        &self,
        _items: &[ScoredComplaint],
        _categories: &[String],
    ) -> Result<Vec<ScoredComplaint>, AppError> {
        Err(AppError::ClassificationUnavailable { attempts: 4 })
    }
}

/// Deterministic stand-in for the AI scorer.
struct MockScorer;

#[async_trait]
impl Scorer for MockScorer {
    async fn score_batch(
        &self,
        records: &[ComplaintRecord],
    ) -> Result<Vec<ScoredComplaint>, AppError> {
        Ok(records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                ScoredComplaint::from_record(
                    record,
                    format!("Summary of {}", record.id),
                    if i % 2 == 0 { 3 } else { 8 },
                )
            })
            .collect())
    }
}

/// Deterministic stand-in for the AI classifier.
struct MockClassifier;

#[async_trait]
impl Classifier for MockClassifier {
    async fn derive_categories(
        &self,
        _summaries: &[String],
        target: usize,
    ) -> Result<Vec<String>, AppError> {
        Ok(crate::brain::normalize_categories(
            vec!["Alpha".to_string(), "Beta".to_string()],
            target,
        ))
    }

    async fn classify(
        &self,
        items: &[ScoredComplaint],
        categories: &[String],
    ) -> Result<Vec<ScoredComplaint>, AppError> {
        Ok(items
            .iter()
            .map(|item| ScoredComplaint {
                category: Some(if item.sentiment_score > 5 {
                    categories[0].clone()
                } else {
                    categories[categories.len() - 1].clone()
                }),
                ..item.clone()
            })
            .collect())
    }
}

fn records(n: usize) -> Vec<ComplaintRecord> {
    (1..=n)
        .map(|i| ComplaintRecord {
            id: i.to_string(),
            dialog_text: format!("C: Complaint number {} about a broken appliance.", i),
            created_at: "2023-01-10 9:30 AM".to_string(),
            ended_at: "2023-01-10 9:45 AM".to_string(),
        })
        .collect()
}

fn config() -> PipelineConfig {
    PipelineConfig {
        category_count: 4,
        ..PipelineConfig::default()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_offline_pipeline_end_to_end() {
    let report = Pipeline::offline(config(), records(5)).run().await.unwrap();
    assert_eq!(report.member_count(), 5);
    // Every member scored by the lexicon and grouped; no member may vanish.
    for group in &report.groups {
        if let Some(stats) = &group.stats {
            assert_eq!(stats.count, group.member_summaries.len());
            assert!((1..=10).contains(&stats.min_sentiment));
            assert_ne!(stats.min_sentiment, 5);
            assert_ne!(stats.max_sentiment, 5);
        }
    }
}

#[tokio::test]
async fn test_stage_outputs_keyed_by_stage_name() {
    let mut pipeline = Pipeline::offline(config(), records(2));
    let mut labels = Vec::new();
    while let Some(output) = pipeline.advance().await.unwrap() {
        labels.push(output.stage);
    }
    assert_eq!(labels, vec!["scoring", "categorizing", "aggregating"]);
    assert_eq!(pipeline.stage(), Stage::Done);
    assert_eq!(pipeline.outputs().len(), 3);
    // Advancing past Done is a no-op, not an error.
    assert!(pipeline.advance().await.unwrap().is_none());
}

#[tokio::test]
async fn test_stepwise_and_run_produce_identical_reports() {
    let all_at_once = Pipeline::offline(config(), records(6)).run().await.unwrap();

    let mut stepwise = Pipeline::offline(config(), records(6));
    while stepwise.advance().await.unwrap().is_some() {}
    let stepped = stepwise.report().cloned().unwrap();

    // generated_at differs; every group and statistic must not.
    assert_eq!(
        serde_json::to_value(&all_at_once.groups).unwrap(),
        serde_json::to_value(&stepped.groups).unwrap()
    );
}

#[tokio::test]
async fn test_empty_input_is_not_an_error() {
    let report = Pipeline::offline(config(), Vec::new()).run().await.unwrap();
    assert!(report.groups.is_empty());
}

#[tokio::test]
async fn test_strict_mode_propagates_scorer_failure() {
    let pipeline = Pipeline::new(
        config(),
        FallbackPolicy::RequireAi,
        Arc::new(FailingScorer),
        Arc::new(MockClassifier),
        records(3),
    );
    match pipeline.run().await {
        Err(AppError::Upstream(msg)) => assert!(msg.contains("service down")),
        other => panic!("Expected Upstream, got {:?}", other.map(|r| r.member_count())),
    }
}

#[tokio::test]
async fn test_heuristic_mode_falls_back_on_scorer_failure() {
    let pipeline = Pipeline::new(
        config(),
        FallbackPolicy::UseHeuristics,
        Arc::new(FailingScorer),
        Arc::new(FailingClassifier),
        records(3),
    );
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.member_count(), 3);
    // The lexicon sees "broken" in every dialog: every group average is low.
    for group in report.groups.iter().filter(|g| g.stats.is_some()) {
        assert!(group.stats.as_ref().unwrap().average_sentiment < 5.0);
    }
}

#[tokio::test]
async fn test_strict_mode_propagates_classification_unavailable() {
    let pipeline = Pipeline::new(
        config(),
        FallbackPolicy::RequireAi,
        Arc::new(MockScorer),
        Arc::new(FailingClassifier),
        records(3),
    );
    match pipeline.run().await {
        Err(AppError::ClassificationUnavailable { attempts }) => assert_eq!(attempts, 4),
        other => panic!(
            "Expected ClassificationUnavailable, got {:?}",
            other.map(|r| r.member_count())
        ),
    }
}

#[tokio::test]
async fn test_heuristic_mode_survives_classifier_failure() {
    let pipeline = Pipeline::new(
        config(),
        FallbackPolicy::UseHeuristics,
        Arc::new(MockScorer),
        Arc::new(FailingClassifier),
        records(4),
    );
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.member_count(), 4);
    // Router-derived category set, truncated to the configured count of 4.
    assert_eq!(report.groups.len(), 4);
    assert_eq!(report.groups[0].name, "Product Defect");
}

#[tokio::test]
async fn test_mock_ai_path_groups_by_score() {
    let pipeline = Pipeline::new(
        config(),
        FallbackPolicy::RequireAi,
        Arc::new(MockScorer),
        Arc::new(MockClassifier),
        records(4),
    );
    let report = pipeline.run().await.unwrap();
    assert_eq!(report.member_count(), 4);

    let alpha = report.groups.iter().find(|g| g.name == "Alpha").unwrap();
    let stats = alpha.stats.as_ref().unwrap();
    assert_eq!(stats.count, 2);
    assert!((stats.average_sentiment - 8.0).abs() < f64::EPSILON);

    // Declared categories with no members stay visible with null stats.
    let beta = report.groups.iter().find(|g| g.name == "Beta").unwrap();
    assert!(beta.stats.is_none() || beta.stats.as_ref().unwrap().count > 0);
}

#[tokio::test]
async fn test_abandoning_between_stages_returns_input() {
    let mut pipeline = Pipeline::offline(config(), records(3));
    pipeline.advance().await.unwrap();
    assert_eq!(pipeline.stage(), Stage::Categorizing);

    let records_back = pipeline.into_records();
    assert_eq!(records_back.len(), 3);
    assert_eq!(records_back[0].id, "1");
}
