// 🏅 Scoring Engine - Grading rules as data
//
// Weighted composite score over configurable metrics, mapped to an ordered
// tier. Weights are normalized at evaluation time; tiers are ranked by
// minimum score at evaluation time. Nothing here fails: missing values score
// zero and empty rule sets classify as unclassified.

use crate::attributes::{SyntheticMetricSet, COMPLIANCE_SCORE, ON_TIME_DELIVERY, QUALITY_SCORE};
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

/// Label returned when no tier exists
pub const UNCLASSIFIED: &str = "未分级";

// ============================================================================
// RULE DEFINITION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeCategory {
    pub key: String,

    /// Label returned by classification (e.g. "A级")
    pub name: String,

    /// Lowest score that still qualifies for this tier
    #[serde(default)]
    pub min_score: f64,
}

impl GradeCategory {
    pub fn new(key: &str, name: &str, min_score: f64) -> Self {
        GradeCategory {
            key: key.to_string(),
            name: name.to_string(),
            min_score,
        }
    }

    /// Threshold used for ranking; non-finite thresholds count as 0
    fn threshold(&self) -> f64 {
        if self.min_score.is_finite() {
            self.min_score
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingMetric {
    /// Row key the metric reads
    pub key: String,
    pub name: String,

    /// Raw weight; any non-negative number
    #[serde(default)]
    pub weight: f64,
}

impl GradingMetric {
    pub fn new(key: &str, name: &str, weight: f64) -> Self {
        GradingMetric {
            key: key.to_string(),
            name: name.to_string(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingRule {
    #[serde(default)]
    pub categories: Vec<GradeCategory>,

    #[serde(default)]
    pub metrics: Vec<GradingMetric>,
}

impl GradingRule {
    /// Sum of raw weights (what an editor displays next to the inputs)
    pub fn total_weight(&self) -> f64 {
        self.metrics.iter().map(|m| finite_or_zero(m.weight)).sum()
    }
}

impl Default for GradingRule {
    /// A/B/C tiers at 85/70/0; delivery 40, quality 40, compliance 20
    fn default() -> Self {
        GradingRule {
            categories: vec![
                GradeCategory::new("A", "A级", 85.0),
                GradeCategory::new("B", "B级", 70.0),
                GradeCategory::new("C", "C级", 0.0),
            ],
            metrics: vec![
                GradingMetric::new(ON_TIME_DELIVERY, "按时交付", 40.0),
                GradingMetric::new(QUALITY_SCORE, "质量评分", 40.0),
                GradingMetric::new(COMPLIANCE_SCORE, "合规评分", 20.0),
            ],
        }
    }
}

// ============================================================================
// METRIC LOOKUP
// ============================================================================

/// Anything a score can be computed over
pub trait MetricLookup {
    /// Numeric value for a metric key; `None` when absent or not numeric
    fn metric(&self, key: &str) -> Option<f64>;
}

impl MetricLookup for HashMap<String, f64> {
    fn metric(&self, key: &str) -> Option<f64> {
        self.get(key).copied()
    }
}

impl MetricLookup for BTreeMap<String, f64> {
    fn metric(&self, key: &str) -> Option<f64> {
        self.get(key).copied()
    }
}

impl MetricLookup for SyntheticMetricSet {
    fn metric(&self, key: &str) -> Option<f64> {
        self.get(key).map(f64::from)
    }
}

/// JSON objects: numbers, or strings that parse as numbers
impl MetricLookup for serde_json::Value {
    fn metric(&self, key: &str) -> Option<f64> {
        match self.get(key)? {
            serde_json::Value::Number(n) => n.as_f64(),
            serde_json::Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round half away from zero to 2 decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// SCORING FUNCTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMetric {
    pub key: String,
    pub name: String,
    pub weight: f64,

    /// `weight / total_weight`
    pub normalized_weight: f64,
}

/// Scale weights to fractions of their sum (an all-zero sum divides by 1)
pub fn normalize_weights(metrics: &[GradingMetric]) -> Vec<NormalizedMetric> {
    let total: f64 = metrics.iter().map(|m| finite_or_zero(m.weight)).sum();
    let total = if total == 0.0 { 1.0 } else { total };

    metrics
        .iter()
        .map(|m| NormalizedMetric {
            key: m.key.clone(),
            name: m.name.clone(),
            weight: m.weight,
            normalized_weight: finite_or_zero(m.weight) / total,
        })
        .collect()
}

fn weighted_sum<R: MetricLookup + ?Sized>(row: &R, normalized: &[NormalizedMetric]) -> f64 {
    let sum: f64 = normalized
        .iter()
        .map(|m| finite_or_zero(row.metric(&m.key).unwrap_or(0.0)) * m.normalized_weight)
        .sum();
    round2(sum)
}

/// Composite score of a row, rounded to 2 decimals
pub fn compute_score<R: MetricLookup + ?Sized>(row: &R, metrics: &[GradingMetric]) -> f64 {
    weighted_sum(row, &normalize_weights(metrics))
}

/// Categories ordered by threshold, highest first; ties keep declaration order
pub fn rank_categories(categories: &[GradeCategory]) -> Vec<&GradeCategory> {
    let mut ranked: Vec<&GradeCategory> = categories.iter().collect();
    ranked.sort_by(|a, b| b.threshold().total_cmp(&a.threshold()));
    ranked
}

fn classify<'a>(score: f64, ranked: &[&'a GradeCategory]) -> &'a str {
    ranked
        .iter()
        .find(|c| c.threshold() <= score)
        .or(ranked.last())
        .map(|c| c.name.as_str())
        .unwrap_or(UNCLASSIFIED)
}

/// Tier name for a score.
///
/// First category (by threshold, descending) whose threshold is met; the
/// lowest category when none is met; [`UNCLASSIFIED`] when there are none.
pub fn map_category(score: f64, categories: &[GradeCategory]) -> &str {
    classify(score, &rank_categories(categories))
}

// ============================================================================
// SCORING ENGINE
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grade {
    pub total_score: f64,
    pub category: String,
}

/// Holds one rule plus its evaluation-time views (normalized weights,
/// ranked tiers). Setters keep the views in sync.
pub struct ScoringEngine {
    rule: GradingRule,
    normalized: Vec<NormalizedMetric>,
}

impl ScoringEngine {
    pub fn new(rule: GradingRule) -> Self {
        let normalized = normalize_weights(&rule.metrics);
        ScoringEngine { rule, normalized }
    }

    /// Load a rule from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read grading rule file: {:?}", path.as_ref()))?;

        let rule: GradingRule =
            serde_json::from_str(&content).context("Failed to parse grading rule JSON")?;

        Ok(ScoringEngine::new(rule))
    }

    pub fn rule(&self) -> &GradingRule {
        &self.rule
    }

    pub fn normalized_metrics(&self) -> &[NormalizedMetric] {
        &self.normalized
    }

    pub fn set_rule(&mut self, rule: GradingRule) {
        self.rule = rule;
        self.normalized = normalize_weights(&self.rule.metrics);
    }

    /// Update a metric weight; returns false when the key is unknown
    pub fn set_metric_weight(&mut self, key: &str, weight: f64) -> bool {
        let Some(metric) = self.rule.metrics.iter_mut().find(|m| m.key == key) else {
            return false;
        };
        metric.weight = weight;
        self.normalized = normalize_weights(&self.rule.metrics);
        true
    }

    /// Update a tier threshold; returns false when the key is unknown
    pub fn set_category_min_score(&mut self, key: &str, min_score: f64) -> bool {
        match self.rule.categories.iter_mut().find(|c| c.key == key) {
            Some(category) => {
                category.min_score = min_score;
                true
            }
            None => false,
        }
    }

    pub fn score<R: MetricLookup + ?Sized>(&self, row: &R) -> f64 {
        weighted_sum(row, &self.normalized)
    }

    pub fn classify(&self, score: f64) -> &str {
        map_category(score, &self.rule.categories)
    }

    pub fn grade<R: MetricLookup + ?Sized>(&self, row: &R) -> Grade {
        let total_score = self.score(row);
        Grade {
            total_score,
            category: self.classify(total_score).to_string(),
        }
    }

    pub fn grade_batch<R: MetricLookup>(&self, rows: &[R]) -> Vec<Grade> {
        let ranked = rank_categories(&self.rule.categories);
        rows.iter()
            .map(|row| {
                let total_score = self.score(row);
                Grade {
                    total_score,
                    category: classify(total_score, &ranked).to_string(),
                }
            })
            .collect()
    }

    /// Tier distribution of a batch
    pub fn summarize(&self, grades: &[Grade]) -> GradeSummary {
        let mut by_category: BTreeMap<String, usize> = BTreeMap::new();
        for grade in grades {
            *by_category.entry(grade.category.clone()).or_insert(0) += 1;
        }

        let average_score = if grades.is_empty() {
            0.0
        } else {
            round2(grades.iter().map(|g| g.total_score).sum::<f64>() / grades.len() as f64)
        };

        GradeSummary {
            total: grades.len(),
            by_category,
            average_score,
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(GradingRule::default())
    }
}

// ============================================================================
// GRADE SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeSummary {
    pub total: usize,
    pub by_category: BTreeMap<String, usize>,
    pub average_score: f64,
}

impl GradeSummary {
    pub fn summary(&self) -> String {
        let tiers: Vec<String> = self
            .by_category
            .iter()
            .map(|(name, count)| format!("{}: {}", name, count))
            .collect();
        format!(
            "{} graded, average {:.2} | {}",
            self.total,
            self.average_score,
            tiers.join(", ")
        )
    }
}

// ============================================================================
// TESTS
// ============================================================================
