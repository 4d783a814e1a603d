//! Category aggregation and report building.
//!
//! Turns scored, categorized complaints into the hierarchical report the
//! dashboard consumes. Everything here is plain serde data: the consumer can
//! serialize the report to JSON without loss.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::brain::keywords::KeywordExtractor;
use crate::models::ScoredComplaint;

/// Group used for items that reach aggregation without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// The member holding an extremal sentiment score within a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exemplar {
    pub summary: String,
    pub sentiment_score: u8,
}

/// Aggregate statistics of a non-empty group. A group with no members has no
/// stats at all (`None` on the group), never zeroed placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: usize,
    /// Arithmetic mean, deliberately unrounded.
    pub average_sentiment: f64,
    pub min_sentiment: u8,
    pub max_sentiment: u8,
    /// First member carrying `max_sentiment`.
    pub highest: Exemplar,
    /// First member carrying `min_sentiment`.
    pub lowest: Exemplar,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentimentRange {
    pub lowest: u8,
    pub highest: u8,
}

/// Second-level grouping inside a category, present only when the classifier
/// supplied subcategories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubGroup {
    pub name: String,
    pub member_summaries: Vec<String>,
    pub average_sentiment: f64,
    pub sentiment_range: SentimentRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryGroup {
    pub name: String,
    /// Member summaries in original input order.
    pub member_summaries: Vec<String>,
    pub stats: Option<GroupStats>,
    pub key_insights: Vec<String>,
    pub subgroups: Vec<SubGroup>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub groups: Vec<CategoryGroup>,
}

impl Report {
    /// Total members across all groups. Always equals the aggregated input
    /// length: no drops, no duplication.
    pub fn member_count(&self) -> usize {
        self.groups.iter().map(|g| g.member_summaries.len()).sum()
    }
}

/// Builds hierarchical reports from scored complaints.
pub struct ReportBuilder {
    keywords: KeywordExtractor,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            keywords: KeywordExtractor::new(),
        }
    }

    /// Builds the report.
    ///
    /// Group ordering: the declared category set first, in declared order
    /// (declared categories with zero members still appear, with
    /// `stats: None`), then any category seen only in the data in first-seen
    /// order. Items without a category land in [`UNCATEGORIZED`]. An empty
    /// input produces a report with zero groups, declared set or not.
    pub fn build(&self, items: &[ScoredComplaint], declared_categories: &[String]) -> Report {
        if items.is_empty() {
            return Report {
                generated_at: Utc::now(),
                groups: Vec::new(),
            };
        }

        let mut order: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for name in declared_categories {
            if !index.contains_key(name) {
                index.insert(name.clone(), order.len());
                order.push(name.clone());
            }
        }

        let mut buckets: Vec<Vec<&ScoredComplaint>> = vec![Vec::new(); order.len()];
        for item in items {
            let name = item
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(UNCATEGORIZED);
            let slot = match index.get(name) {
                Some(&slot) => slot,
                None => {
                    index.insert(name.to_string(), order.len());
                    order.push(name.to_string());
                    buckets.push(Vec::new());
                    order.len() - 1
                }
            };
            buckets[slot].push(item);
        }

        let groups = order
            .into_iter()
            .zip(buckets)
            .map(|(name, members)| self.build_group(name, &members))
            .collect();

        Report {
            generated_at: Utc::now(),
            groups,
        }
    }

    fn build_group(&self, name: String, members: &[&ScoredComplaint]) -> CategoryGroup {
        let member_summaries: Vec<String> = members.iter().map(|m| m.summary.clone()).collect();
        let stats = compute_stats(members);
        let key_insights = match &stats {
            Some(stats) => self.derive_insights(stats, &member_summaries),
            None => Vec::new(),
        };

        CategoryGroup {
            name,
            member_summaries,
            stats,
            key_insights,
            subgroups: build_subgroups(members),
        }
    }

    fn derive_insights(&self, stats: &GroupStats, summaries: &[String]) -> Vec<String> {
        let mut insights = Vec::new();

        let spread = stats.max_sentiment - stats.min_sentiment;
        insights.push(format!(
            "Sentiment spread of {} points (min {}, max {})",
            spread, stats.min_sentiment, stats.max_sentiment
        ));

        let texts: Vec<&str> = summaries.iter().map(String::as_str).collect();
        if let Some(theme) = self.keywords.dominant(&texts) {
            insights.push(format!("Dominant theme: \"{}\"", theme));
        }

        insights
    }
}

fn compute_stats(members: &[&ScoredComplaint]) -> Option<GroupStats> {
    let first = members.first()?;

    let mut highest: &ScoredComplaint = first;
    let mut lowest: &ScoredComplaint = first;
    let mut sum = 0u64;
    for member in members {
        sum += u64::from(member.sentiment_score);
        // Strict comparisons keep the first occurrence on ties.
        if member.sentiment_score > highest.sentiment_score {
            highest = member;
        }
        if member.sentiment_score < lowest.sentiment_score {
            lowest = member;
        }
    }

    Some(GroupStats {
        count: members.len(),
        average_sentiment: sum as f64 / members.len() as f64,
        min_sentiment: lowest.sentiment_score,
        max_sentiment: highest.sentiment_score,
        highest: Exemplar {
            summary: highest.summary.clone(),
            sentiment_score: highest.sentiment_score,
        },
        lowest: Exemplar {
            summary: lowest.summary.clone(),
            sentiment_score: lowest.sentiment_score,
        },
    })
}

fn build_subgroups(members: &[&ScoredComplaint]) -> Vec<SubGroup> {
    let mut order: Vec<String> = Vec::new();
    let mut buckets: HashMap<String, Vec<&ScoredComplaint>> = HashMap::new();

    for member in members {
        let Some(sub) = member.subcategory.as_deref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };
        if !buckets.contains_key(sub) {
            order.push(sub.to_string());
        }
        buckets.entry(sub.to_string()).or_default().push(member);
    }

    order
        .into_iter()
        .map(|name| {
            let members = &buckets[&name];
            let sum: u64 = members.iter().map(|m| u64::from(m.sentiment_score)).sum();
            let lowest = members.iter().map(|m| m.sentiment_score).min().unwrap_or(0);
            let highest = members.iter().map(|m| m.sentiment_score).max().unwrap_or(0);
            SubGroup {
                name,
                member_summaries: members.iter().map(|m| m.summary.clone()).collect(),
                average_sentiment: sum as f64 / members.len() as f64,
                sentiment_range: SentimentRange { lowest, highest },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, summary: &str, score: u8, category: Option<&str>) -> ScoredComplaint {
        ScoredComplaint {
            id: id.to_string(),
            summary: summary.to_string(),
            sentiment_score: score,
            created_at: String::new(),
            ended_at: String::new(),
            category: category.map(str::to_string),
            subcategory: None,
        }
    }

    #[test]
    fn test_two_category_scenario() {
        let builder = ReportBuilder::new();
        let items = vec![
            item("1", "Fridge broken.", 2, Some("A")),
            item("2", "Fridge noisy.", 4, Some("A")),
            item("3", "Thanks for the help.", 9, Some("B")),
        ];
        let report = builder.build(&items, &[]);

        assert_eq!(report.groups.len(), 2);
        let a = &report.groups[0];
        assert_eq!(a.name, "A");
        let a_stats = a.stats.as_ref().unwrap();
        assert_eq!(a_stats.count, 2);
        assert!((a_stats.average_sentiment - 3.0).abs() < f64::EPSILON);

        let b = &report.groups[1];
        let b_stats = b.stats.as_ref().unwrap();
        assert_eq!(b_stats.count, 1);
        assert_eq!(b_stats.min_sentiment, 9);
        assert_eq!(b_stats.max_sentiment, 9);
        assert!((b_stats.average_sentiment - 9.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_input_yields_zero_groups() {
        let builder = ReportBuilder::new();
        let report = builder.build(&[], &["A".to_string(), "B".to_string()]);
        assert!(report.groups.is_empty());
    }

    #[test]
    fn test_declared_empty_category_is_kept_with_null_stats() {
        let builder = ReportBuilder::new();
        let items = vec![item("1", "Late delivery.", 3, Some("Delivery"))];
        let declared = vec!["Delivery".to_string(), "Billing".to_string()];
        let report = builder.build(&items, &declared);

        assert_eq!(report.groups.len(), 2);
        let billing = &report.groups[1];
        assert_eq!(billing.name, "Billing");
        assert!(billing.stats.is_none());
        assert!(billing.member_summaries.is_empty());
        assert!(billing.key_insights.is_empty());
    }

    #[test]
    fn test_uncategorized_items_are_not_dropped() {
        let builder = ReportBuilder::new();
        let items = vec![
            item("1", "Late delivery.", 3, Some("Delivery")),
            item("2", "No category here.", 6, None),
        ];
        let report = builder.build(&items, &[]);

        assert_eq!(report.member_count(), 2);
        assert!(report.groups.iter().any(|g| g.name == UNCATEGORIZED));
    }

    #[test]
    fn test_tie_keeps_first_occurrence() {
        let builder = ReportBuilder::new();
        let items = vec![
            item("1", "first high", 8, Some("A")),
            item("2", "second high", 8, Some("A")),
            item("3", "first low", 2, Some("A")),
            item("4", "second low", 2, Some("A")),
        ];
        let report = builder.build(&items, &[]);
        let stats = report.groups[0].stats.as_ref().unwrap();
        assert_eq!(stats.highest.summary, "first high");
        assert_eq!(stats.lowest.summary, "first low");
    }

    #[test]
    fn test_insights_cover_spread_and_theme() {
        let builder = ReportBuilder::new();
        let items = vec![
            item("1", "Fridge not cooling.", 2, Some("A")),
            item("2", "Fridge door broken.", 3, Some("A")),
        ];
        let report = builder.build(&items, &[]);
        let insights = &report.groups[0].key_insights;
        assert!(insights.iter().any(|i| i.contains("spread of 1")));
        assert!(insights.iter().any(|i| i.contains("fridge")));
    }

    #[test]
    fn test_subgroups_from_subcategories() {
        let builder = ReportBuilder::new();
        let mut one = item("1", "Oven door cracked.", 2, Some("Defects"));
        one.subcategory = Some("Doors".to_string());
        let mut two = item("2", "Oven glass shattered.", 1, Some("Defects"));
        two.subcategory = Some("Doors".to_string());
        let three = item("3", "Oven late.", 4, Some("Defects"));

        let report = builder.build(&[one, two, three], &[]);
        let group = &report.groups[0];
        assert_eq!(group.subgroups.len(), 1);
        let sub = &group.subgroups[0];
        assert_eq!(sub.name, "Doors");
        assert_eq!(sub.sentiment_range.lowest, 1);
        assert_eq!(sub.sentiment_range.highest, 2);
        assert!((sub.average_sentiment - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_report_serializes_to_plain_json() {
        let builder = ReportBuilder::new();
        let items = vec![item("1", "Late delivery.", 3, Some("Delivery"))];
        let report = builder.build(&items, &[]);
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["groups"][0]["stats"]["average_sentiment"].is_f64());
        assert_eq!(json["groups"][0]["name"], "Delivery");
    }
}
