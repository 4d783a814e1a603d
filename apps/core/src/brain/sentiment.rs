//! Lexicon sentiment scoring.
//!
//! Deterministic, keyword-weighted sentiment estimator used whenever the
//! inference service is unavailable or returns unusable output. Pure function
//! of the input text and the fixed lexicon below: the same text always yields
//! the same score, with or without the service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::actors::traits::Scorer;
use crate::brain::summary::summarize_dialog;
use crate::error::AppError;
use crate::models::{ComplaintRecord, ScoredComplaint};

/// Bump when any keyword table or weight changes.
#[allow(dead_code)]
pub const LEXICON_VERSION: u32 = 1;

/// Score returned for empty or whitespace-only text. Must not be 5: the exact
/// midpoint is an unreachable output of this scorer.
pub const EMPTY_TEXT_SCORE: u8 = 6;

const VERY_NEGATIVE: &[(&str, i32)] = &[
    ("broken", 3),
    ("defect", 3),
    ("terrible", 3),
    ("worst", 3),
    ("angry", 3),
    ("furious", 3),
    ("outraged", 3),
    ("disgusted", 3),
    ("horrible", 3),
    ("awful", 3),
    ("never", 2),
    ("unacceptable", 3),
    ("ridiculous", 2),
    ("waste", 2),
    ("useless", 2),
    ("refund", 2),
    ("complaint", 2),
    ("damaged", 3),
    ("dangerous", 3),
    ("faulty", 3),
    ("disappointed", 2),
];

const SOMEWHAT_NEGATIVE: &[(&str, i32)] = &[
    ("not working", 2),
    ("issue", 2),
    ("problem", 2),
    ("disappointed", 2),
    ("frustrating", 2),
    ("poor", 2),
    ("complaint", 2),
    ("error", 2),
    ("fail", 2),
    ("bad", 2),
    ("wrong", 2),
    ("unhappy", 2),
    ("delay", 2),
    ("difficult", 1),
    ("concern", 1),
    ("unfortunately", 1),
    ("not satisfied", 2),
    ("doesn't work", 2),
    ("isn't working", 2),
    ("inconvenience", 1),
];

const NEUTRAL: &[(&str, i32)] = &[
    ("ok", 1),
    ("okay", 1),
    ("fine", 1),
    ("average", 1),
    ("acceptable", 1),
    ("standard", 1),
    ("normal", 1),
    ("expected", 1),
    ("typical", 1),
    ("information", 1),
    ("question", 1),
    ("inquiry", 1),
    ("wondering", 1),
    ("how do i", 1),
    ("can you", 1),
];

const SOMEWHAT_POSITIVE: &[(&str, i32)] = &[
    ("good", 1),
    ("nice", 1),
    ("helpful", 1),
    ("resolved", 1),
    ("solution", 1),
    ("fixed", 1),
    ("working", 1),
    ("better", 1),
    ("improved", 1),
    ("satisfied", 1),
    ("thank", 1),
    ("appreciate", 1),
    ("pleased", 1),
    ("glad", 1),
    ("happy with", 1),
];

const VERY_POSITIVE: &[(&str, i32)] = &[
    ("excellent", 2),
    ("amazing", 2),
    ("outstanding", 2),
    ("fantastic", 2),
    ("wonderful", 2),
    ("great", 2),
    ("perfect", 2),
    ("love", 2),
    ("best", 2),
    ("exceptional", 2),
    ("brilliant", 2),
    ("superb", 2),
    ("delighted", 2),
    ("thrilled", 2),
    ("thank you so much", 3),
    ("extremely satisfied", 3),
    ("incredibly helpful", 3),
    ("exceeded expectations", 3),
];

const ESCALATION_PHRASES: &[&str] = &["speak to manager", "supervisor", "escalate"];
const URGENCY_PHRASES: &[&str] = &["immediately", "urgent", "as soon as possible", "emergency"];
const RESOLUTION_PHRASES: &[&str] = &["resolved", "fixed", "solved"];
const PERSISTENT_FAILURE_PHRASES: &[&str] = &["still not working", "still broken", "again"];

const URGENT_KEYWORDS: &[&str] = &[
    "immediately",
    "urgent",
    "emergency",
    "safety",
    "dangerous",
    "critical",
    "asap",
    "right away",
    "serious",
];

/// Full verdict for a single text: the 1-10 score, a coarse label, and an
/// urgency flag for triage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentVerdict {
    pub score: u8,
    pub label: String,
    pub urgent: bool,
}

/// Deterministic keyword-weighted sentiment scorer.
pub struct LexiconScorer;

impl Default for LexiconScorer {
    fn default() -> Self {
        Self::new()
    }
}

fn weight_sum(table: &[(&str, i32)], text: &str) -> i32 {
    table
        .iter()
        .filter(|(keyword, _)| text.contains(keyword))
        .map(|(_, weight)| weight)
        .sum()
}

fn contains_any(phrases: &[&str], text: &str) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

impl LexiconScorer {
    pub fn new() -> Self {
        Self
    }

    /// Scores a text on the 1-10 scale.
    ///
    /// Total over all string inputs, no I/O, no failure modes. Empty or
    /// whitespace-only text returns [`EMPTY_TEXT_SCORE`] (6). The exact
    /// midpoint 5 is never returned: a rounded 5 is pushed to 4 when the
    /// negative weight dominates, to 6 otherwise.
    pub fn score(&self, text: &str) -> u8 {
        if text.trim().is_empty() {
            return EMPTY_TEXT_SCORE;
        }
        let text = text.to_lowercase();

        let very_neg = weight_sum(VERY_NEGATIVE, &text);
        let somewhat_neg = weight_sum(SOMEWHAT_NEGATIVE, &text);
        let neutral = weight_sum(NEUTRAL, &text);
        let somewhat_pos = weight_sum(SOMEWHAT_POSITIVE, &text);
        let very_pos = weight_sum(VERY_POSITIVE, &text);

        let total_negative = very_neg * 2 + somewhat_neg;
        let total_positive = very_pos * 2 + somewhat_pos;
        let total_neutral = neutral;

        // Structural signals on top of the raw keyword weights.
        let mut context = 0.0f64;
        if text.contains('?') {
            context += 0.5;
        }
        let exclamations = text.matches('!').count().min(3) as f64;
        if exclamations > 0.0 {
            if total_negative > total_positive {
                context -= exclamations * 0.5;
            } else if total_positive > total_negative {
                context += exclamations * 0.5;
            }
        }
        if contains_any(ESCALATION_PHRASES, &text) {
            context -= 1.5;
        }
        if contains_any(URGENCY_PHRASES, &text) {
            context -= 1.0;
        }
        if contains_any(RESOLUTION_PHRASES, &text) {
            context += 1.0;
        }
        if contains_any(PERSISTENT_FAILURE_PHRASES, &text) {
            context -= 1.5;
        }

        let base: i32 = if total_negative > total_positive + total_neutral {
            if very_neg > somewhat_neg {
                2
            } else {
                4
            }
        } else if total_positive > total_negative + total_neutral {
            if very_pos > somewhat_pos {
                9
            } else {
                7
            }
        } else if total_neutral > total_positive + total_negative {
            6
        } else {
            // Mixed signal with no neutral majority. The low bit of a content
            // hash picks between 4 and 6 so equal texts always agree, without
            // collapsing every mixed text onto the same side.
            if blake3::hash(text.as_bytes()).as_bytes()[0] & 1 == 0 {
                4
            } else {
                6
            }
        };

        let mut final_score = base as f64 + context;

        // Secondary lexical modifiers keyed off the base polarity.
        if text.contains("but") && base > 5 {
            final_score -= 1.0;
        }
        if text.contains("however") && base > 5 {
            final_score -= 1.0;
        }
        if text.contains("despite") && base < 6 {
            final_score += 1.0;
        }
        if text.contains("thank") && !text.contains("not") {
            final_score += 1.0;
        }
        if text.contains("please") && base < 4 {
            final_score += 0.5;
        }

        let mut score = final_score.round().clamp(1.0, 10.0) as u8;
        if score == 5 {
            score = if total_negative > total_positive { 4 } else { 6 };
        }
        score
    }

    /// Scores a text and derives the coarse label and urgency flag.
    #[allow(dead_code)]
    pub fn analyze(&self, text: &str) -> SentimentVerdict {
        let score = self.score(text);
        let lowered = text.to_lowercase();
        let urgent = contains_any(URGENT_KEYWORDS, &lowered) || score <= 2;
        SentimentVerdict {
            score,
            label: label_for(score).to_string(),
            urgent,
        }
    }
}

/// Coarse bucket label for a 1-10 score.
pub fn label_for(score: u8) -> &'static str {
    match score {
        0..=3 => "Very negative",
        4..=5 => "Somewhat negative",
        6..=7 => "Neutral to slightly positive",
        _ => "Very positive",
    }
}

#[async_trait]
impl Scorer for LexiconScorer {
    async fn score_batch(&self, records: &[ComplaintRecord]) -> Result<Vec<ScoredComplaint>, AppError> {
        Ok(records
            .iter()
            .map(|record| {
                let summary = summarize_dialog(&record.dialog_text);
                let score = self.score(&record.dialog_text);
                ScoredComplaint::from_record(record, summary, score)
            })
            .collect())
    }
}
