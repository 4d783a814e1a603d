//! # Actors Module
//!
//! External-service integration for EchoDesk. The inference client runs as a
//! task with an mpsc mailbox; the AI-backed scorer and classifier drive it
//! behind the `Scorer`/`Classifier` trait seams so the pipeline can swap in
//! the deterministic implementations without touching call sites.

pub mod ai;
pub mod inference;
pub mod messages;
pub mod retry;
pub mod traits;

// Re-export main types for convenience
#[allow(unused_imports)]
pub use ai::{AiClassifier, AiScorer};
#[allow(unused_imports)]
pub use inference::InferenceClientHandle;
#[allow(unused_imports)]
pub use traits::{Classifier, Scorer};
