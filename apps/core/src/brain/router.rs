//! Keyword category routing.
//!
//! Deterministic fallback for the AI classifier: an ordered list of
//! (keyword set, label) rules tested against the lowercased summary, first
//! match wins. The table is data, not logic: swap it without touching the
//! matcher. The default category is always the last label in the set.

use async_trait::async_trait;

use crate::actors::traits::Classifier;
use crate::error::AppError;
use crate::models::ScoredComplaint;

/// One routing rule: if any keyword matches, the summary belongs to `label`.
#[derive(Debug, Clone)]
pub struct RoutingRule {
    pub keywords: Vec<String>,
    pub label: String,
}

impl RoutingRule {
    fn new(keywords: &[&str], label: &str) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            label: label.to_string(),
        }
    }
}

/// Ordered keyword router over a fixed category set.
pub struct CategoryRouter {
    rules: Vec<RoutingRule>,
    default_label: String,
}

impl Default for CategoryRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryRouter {
    /// Router over the default appliance-support category set. Rule order is
    /// significant: earlier rules shadow later ones.
    pub fn new() -> Self {
        let rules = vec![
            RoutingRule::new(
                &["not working", "broken", "defect", "damage", "malfunction"],
                "Product Defect",
            ),
            RoutingRule::new(&["deliver", "shipping", "package", "arrival"], "Delivery Issue"),
            RoutingRule::new(&["warranty", "guarantee", "coverage"], "Warranty Concern"),
            RoutingRule::new(&["account", "login", "password", "profile"], "Account Problem"),
            RoutingRule::new(
                &["connect", "app", "wifi", "update", "software"],
                "Technical Support",
            ),
            RoutingRule::new(&["service", "technician", "repair", "fix"], "Service Request"),
            RoutingRule::new(
                &["charge", "payment", "refund", "price", "cost"],
                "Billing Issue",
            ),
        ];
        Self::with_rules(rules, "Product Information")
    }

    /// Router over a caller-supplied rule table and default label.
    pub fn with_rules(rules: Vec<RoutingRule>, default_label: &str) -> Self {
        Self {
            rules,
            default_label: default_label.to_string(),
        }
    }

    /// Routes a summary to a category label. Total: every summary maps to
    /// some label, the default when no rule matches.
    pub fn route(&self, summary: &str) -> &str {
        let lowered = summary.to_lowercase();
        for rule in &self.rules {
            if rule.keywords.iter().any(|k| lowered.contains(k.as_str())) {
                return &rule.label;
            }
        }
        &self.default_label
    }

    /// The full fixed category set, rule labels first, default last.
    pub fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.rules.iter().map(|r| r.label.clone()).collect();
        labels.push(self.default_label.clone());
        labels
    }
}

/// Forces a category list to exactly `target` entries: surplus labels are
/// truncated, shortfalls are padded with synthetic `"Category {k}"` labels.
pub fn normalize_categories(mut labels: Vec<String>, target: usize) -> Vec<String> {
    labels.truncate(target);
    while labels.len() < target {
        labels.push(format!("Category {}", labels.len() + 1));
    }
    labels
}

#[async_trait]
impl Classifier for CategoryRouter {
    async fn derive_categories(
        &self,
        _summaries: &[String],
        target: usize,
    ) -> Result<Vec<String>, AppError> {
        Ok(normalize_categories(self.labels(), target))
    }

    async fn classify(
        &self,
        items: &[ScoredComplaint],
        categories: &[String],
    ) -> Result<Vec<ScoredComplaint>, AppError> {
        Ok(items
            .iter()
            .map(|item| {
                let routed = self.route(&item.summary);
                // A truncated category set may no longer contain the routed
                // label; the assignment must still come from the given list.
                let label = if categories.iter().any(|c| c == routed) {
                    routed.to_string()
                } else {
                    categories
                        .last()
                        .cloned()
                        .unwrap_or_else(|| self.default_label.clone())
                };
                ScoredComplaint {
                    category: Some(label),
                    subcategory: None,
                    ..item.clone()
                }
            })
            .collect())
    }
}
