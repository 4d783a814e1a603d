//! # Brain Module
//!
//! Deterministic, non-LLM analysis for EchoDesk.
//! Every component here is a total function over its input text, so the
//! pipeline can always fall back to it when the inference service misbehaves.
//!
//! ## Components
//! - `sentiment`: keyword-weighted 1-10 sentiment scoring
//! - `summary`: first-customer-sentence dialog summarization
//! - `router`: ordered keyword routing onto a fixed category set
//! - `keywords`: frequency-ranked keyword extraction for report insights

pub mod keywords;
pub mod router;
pub mod sentiment;
pub mod summary;

// Re-export main types for convenience
#[allow(unused_imports)]
pub use keywords::{KeywordExtractor, KeywordResult};
#[allow(unused_imports)]
pub use router::{normalize_categories, CategoryRouter, RoutingRule};
#[allow(unused_imports)]
pub use sentiment::{LexiconScorer, SentimentVerdict};
#[allow(unused_imports)]
pub use summary::summarize_dialog;
