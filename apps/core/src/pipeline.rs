//! Pipeline orchestration.
//!
//! A forward-only state machine over `Scoring -> Categorizing -> Aggregating
//! -> Done`. Each stage drives the configured `Scorer`/`Classifier`
//! implementation and, when that path fails, either falls back to the
//! deterministic sibling or propagates the typed error. The choice belongs to
//! the caller via [`FallbackPolicy`], never to the stage itself.
//!
//! Stage outputs are recorded keyed by stage name so a caller can render
//! progress one stage at a time; `run()` and repeated `advance()` calls yield
//! identical final reports.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::actors::traits::{Classifier, Scorer};
use crate::brain::router::CategoryRouter;
use crate::brain::sentiment::LexiconScorer;
use crate::error::AppError;
use crate::models::{ComplaintRecord, PipelineConfig, ScoredComplaint};
use crate::report::{Report, ReportBuilder};

/// Pipeline stages, strictly forward, no loops, no skips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Scoring,
    Categorizing,
    Aggregating,
    Done,
}

impl Stage {
    /// Stage name used to key emitted outputs.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Scoring => "scoring",
            Stage::Categorizing => "categorizing",
            Stage::Aggregating => "aggregating",
            Stage::Done => "done",
        }
    }
}

/// What to do when the AI-backed path of a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Fall back to the deterministic scorer/router and keep going.
    UseHeuristics,
    /// Propagate the stage error. Callers that require AI-backed results get
    /// a typed failure instead of silently degraded heuristics.
    RequireAi,
}

/// One stage's output, keyed by stage name.
#[derive(Debug, Clone, Serialize)]
pub struct StageOutput {
    pub stage: &'static str,
    pub output: serde_json::Value,
}

/// The complaint-analysis pipeline.
///
/// Owns the input records for the duration of the run. Dropping the pipeline
/// between stages (or calling [`Pipeline::into_records`]) abandons the run
/// without corrupting the input; partial stage outputs are discardable.
pub struct Pipeline<S: Scorer, C: Classifier> {
    run_id: Uuid,
    config: PipelineConfig,
    policy: FallbackPolicy,
    scorer: Arc<S>,
    classifier: Arc<C>,
    fallback_scorer: LexiconScorer,
    fallback_classifier: CategoryRouter,
    stage: Stage,
    records: Vec<ComplaintRecord>,
    scored: Vec<ScoredComplaint>,
    categories: Vec<String>,
    report: Option<Report>,
    outputs: Vec<StageOutput>,
}

impl Pipeline<LexiconScorer, CategoryRouter> {
    /// Fully deterministic pipeline: the heuristics are the primary path and
    /// no network is ever touched.
    pub fn offline(config: PipelineConfig, records: Vec<ComplaintRecord>) -> Self {
        Self::new(
            config,
            FallbackPolicy::UseHeuristics,
            Arc::new(LexiconScorer::new()),
            Arc::new(CategoryRouter::new()),
            records,
        )
    }
}

impl<S: Scorer, C: Classifier> Pipeline<S, C> {
    pub fn new(
        config: PipelineConfig,
        policy: FallbackPolicy,
        scorer: Arc<S>,
        classifier: Arc<C>,
        records: Vec<ComplaintRecord>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            config,
            policy,
            scorer,
            classifier,
            fallback_scorer: LexiconScorer::new(),
            fallback_classifier: CategoryRouter::new(),
            stage: Stage::Scoring,
            records,
            scored: Vec::new(),
            categories: Vec::new(),
            report: None,
            outputs: Vec::new(),
        }
    }

    #[allow(dead_code)]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Outputs of every stage executed so far, in execution order.
    #[allow(dead_code)]
    pub fn outputs(&self) -> &[StageOutput] {
        &self.outputs
    }

    /// The final report, present once the aggregating stage ran.
    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Abandons the run between stages and hands back the untouched input.
    #[allow(dead_code)]
    pub fn into_records(self) -> Vec<ComplaintRecord> {
        self.records
    }

    /// Executes the next stage and returns its output, or `None` once done.
    pub async fn advance(&mut self) -> Result<Option<StageOutput>, AppError> {
        let output = match self.stage {
            Stage::Scoring => self.run_scoring().await?,
            Stage::Categorizing => self.run_categorizing().await?,
            Stage::Aggregating => self.run_aggregating()?,
            Stage::Done => return Ok(None),
        };
        self.outputs.push(output.clone());
        Ok(Some(output))
    }

    /// Runs every remaining stage and returns the final report.
    pub async fn run(mut self) -> Result<Report, AppError> {
        while self.advance().await?.is_some() {}
        self.report
            .take()
            .ok_or_else(|| AppError::Internal("pipeline finished without a report".to_string()))
    }

    async fn run_scoring(&mut self) -> Result<StageOutput, AppError> {
        info!(
            "Scoring stage started - run_id={}, records={}",
            self.run_id,
            self.records.len()
        );

        self.scored = match self.scorer.score_batch(&self.records).await {
            Ok(scored) => scored,
            Err(e) if self.policy == FallbackPolicy::UseHeuristics => {
                warn!("Scoring via service failed ({}); using lexicon fallback", e);
                self.fallback_scorer.score_batch(&self.records).await?
            }
            Err(e) => {
                error!("Scoring stage failed - run_id={}: {}", self.run_id, e);
                return Err(e);
            }
        };

        self.stage = Stage::Categorizing;
        Ok(StageOutput {
            stage: Stage::Scoring.label(),
            output: to_stage_value(&self.scored)?,
        })
    }

    async fn run_categorizing(&mut self) -> Result<StageOutput, AppError> {
        info!(
            "Categorizing stage started - run_id={}, items={}",
            self.run_id,
            self.scored.len()
        );

        if self.scored.is_empty() {
            self.categories = Vec::new();
        } else {
            let summaries: Vec<String> =
                self.scored.iter().map(|s| s.summary.clone()).collect();
            let target = self.config.category_count;

            let attempt = match self.classifier.derive_categories(&summaries, target).await {
                Ok(categories) => self
                    .classifier
                    .classify(&self.scored, &categories)
                    .await
                    .map(|classified| (categories, classified)),
                Err(e) => Err(e),
            };

            match attempt {
                Ok((categories, classified)) => {
                    self.categories = categories;
                    self.scored = classified;
                }
                Err(e) if self.policy == FallbackPolicy::UseHeuristics => {
                    warn!("Categorizing via service failed ({}); using keyword router", e);
                    let categories = self
                        .fallback_classifier
                        .derive_categories(&summaries, target)
                        .await?;
                    let classified = self
                        .fallback_classifier
                        .classify(&self.scored, &categories)
                        .await?;
                    self.scored = classified;
                    self.categories = categories;
                }
                Err(e) => {
                    error!("Categorizing stage failed - run_id={}: {}", self.run_id, e);
                    return Err(e);
                }
            }
        }

        self.stage = Stage::Aggregating;
        Ok(StageOutput {
            stage: Stage::Categorizing.label(),
            output: serde_json::json!({
                "categories": self.categories,
                "classified": to_stage_value(&self.scored)?,
            }),
        })
    }

    fn run_aggregating(&mut self) -> Result<StageOutput, AppError> {
        let report = ReportBuilder::new().build(&self.scored, &self.categories);
        info!(
            "Aggregating completed - run_id={}, groups={}, members={}",
            self.run_id,
            report.groups.len(),
            report.member_count()
        );

        let output = to_stage_value(&report)?;
        self.report = Some(report);
        self.stage = Stage::Done;
        Ok(StageOutput {
            stage: Stage::Aggregating.label(),
            output,
        })
    }
}

fn to_stage_value<T: Serialize>(value: &T) -> Result<serde_json::Value, AppError> {
    serde_json::to_value(value).map_err(|e| AppError::Internal(e.to_string()))
}
