//! Keyword frequency extraction.
//!
//! Ranks the non-stopword terms of one or more summaries by raw frequency.
//! Feeds the report builder's dominant-theme insight: the most frequent term
//! wins, ties broken by first occurrence in the input.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Stopwords for English, plus a few terms so common in complaint summaries
/// that they carry no theme signal.
const STOPWORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "nor", "for", "yet", "so", "i", "you", "he", "she", "it",
    "we", "they", "me", "him", "her", "us", "them", "my", "your", "his", "its", "our", "their",
    "mine", "yours", "hers", "ours", "theirs", "this", "that", "these", "those", "who", "whom",
    "which", "what", "whose", "is", "am", "are", "was", "were", "be", "been", "being", "have",
    "has", "had", "having", "do", "does", "did", "doing", "will", "would", "shall", "should",
    "can", "could", "may", "might", "must", "in", "on", "at", "to", "from", "by", "with", "about",
    "against", "between", "into", "through", "during", "before", "after", "above", "below", "up",
    "down", "out", "off", "over", "under", "again", "further", "here", "there", "where", "when",
    "why", "how", "all", "each", "every", "both", "few", "more", "most", "other", "some", "any",
    "no", "not", "only", "own", "same", "than", "too", "very", "just", "also", "now", "then",
    "once", "always", "never", "if", "because", "as", "until", "while", "although", "though",
    "yes", "maybe", "s", "t", "ve", "re", "ll", "d", "m",
    // Complaint-summary boilerplate.
    "customer", "customers", "wants", "needs", "says", "said", "still", "gets", "get",
];

/// One ranked keyword.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordResult {
    /// The keyword.
    pub keyword: String,
    /// Raw frequency across the input texts.
    pub frequency: usize,
}

/// Frequency-based keyword extractor with stopword filtering.
pub struct KeywordExtractor {
    stopwords: HashSet<String>,
    min_word_length: usize,
    max_keywords: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self::with_config(3, 10)
    }

    /// Create an extractor with custom word-length and result-count limits.
    pub fn with_config(min_word_length: usize, max_keywords: usize) -> Self {
        let stopwords: HashSet<String> = STOPWORDS.iter().map(|s| s.to_string()).collect();
        Self {
            stopwords,
            min_word_length,
            max_keywords,
        }
    }

    /// Tokenize text into candidate words, filtering stopwords, short words,
    /// and pure numbers.
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
            .filter(|word| {
                let w = word.trim();
                w.len() >= self.min_word_length
                    && !self.stopwords.contains(w)
                    && !w.chars().all(|c| c.is_numeric())
            })
            .map(|s| s.to_string())
            .collect()
    }

    /// Extract the top keywords from a set of texts, ranked by frequency with
    /// ties broken by first occurrence across the concatenated input.
    pub fn extract(&self, texts: &[&str], top_k: Option<usize>) -> Vec<KeywordResult> {
        let max_results = top_k.unwrap_or(self.max_keywords);

        let mut frequency: HashMap<String, usize> = HashMap::new();
        let mut first_seen: HashMap<String, usize> = HashMap::new();
        let mut position = 0usize;

        for text in texts {
            for word in self.tokenize(text) {
                *frequency.entry(word.clone()).or_insert(0) += 1;
                first_seen.entry(word).or_insert(position);
                position += 1;
            }
        }

        let mut ranked: Vec<(String, usize, usize)> = frequency
            .into_iter()
            .map(|(word, freq)| {
                let seen = first_seen[&word];
                (word, freq, seen)
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

        ranked
            .into_iter()
            .take(max_results)
            .map(|(keyword, frequency, _)| KeywordResult { keyword, frequency })
            .collect()
    }

    /// The single most frequent keyword, if any term survives filtering.
    pub fn dominant(&self, texts: &[&str]) -> Option<String> {
        self.extract(texts, Some(1)).into_iter().next().map(|k| k.keyword)
    }
}
