use crate::actors::messages::AppError;
use crate::models::{ComplaintRecord, ScoredComplaint};
use async_trait::async_trait;

/// Defines the public interface for a sentiment scorer.
///
/// Two implementations exist: the AI-backed scorer driving the inference
/// service, and the deterministic lexicon scorer. The pipeline selects and
/// falls back between them per its configured policy, so no call site ever
/// branches on which backend is in use.
#[async_trait]
pub trait Scorer: Send + Sync + 'static {
    /// Scores a batch of records, deriving each record's summary and 1-10
    /// sentiment score. Output order must match input order.
    async fn score_batch(&self, records: &[ComplaintRecord])
        -> Result<Vec<ScoredComplaint>, AppError>;
}

/// Defines the public interface for a category classifier.
///
/// Like [`Scorer`], this seam has an AI-backed and a deterministic keyword
/// implementation.
#[async_trait]
pub trait Classifier: Send + Sync + 'static {
    /// Produces exactly `target` category labels for a batch of summaries.
    async fn derive_categories(
        &self,
        summaries: &[String],
        target: usize,
    ) -> Result<Vec<String>, AppError>;

    /// Assigns each item to exactly one element of `categories`. Returns the
    /// items in input order with `category` populated.
    async fn classify(
        &self,
        items: &[ScoredComplaint],
        categories: &[String],
    ) -> Result<Vec<ScoredComplaint>, AppError>;
}
