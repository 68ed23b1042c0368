// 📈 Attribute Synthesizer - Correlated performance metrics from one rating
//
// Three metrics share a base rating but use distinct salts and spreads, so
// they move together without being identical. Clamping keeps every value in
// a plausible performance band.

use crate::hashing::unit_random;
use serde::{Deserialize, Serialize};

/// Row key of the on-time delivery metric
pub const ON_TIME_DELIVERY: &str = "onTimeDelivery";

/// Row key of the quality metric
pub const QUALITY_SCORE: &str = "qualityScore";

/// Row key of the compliance metric
pub const COMPLIANCE_SCORE: &str = "complianceScore";

/// Base rating assumed when an entity has none
pub const DEFAULT_BASE_RATING: f64 = 70.0;

// ============================================================================
// METRIC SPEC
// ============================================================================

/// How one metric is derived from the base rating
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSpec {
    /// Salt mixed into the entity seed
    pub salt: &'static str,

    /// Width of the jitter band around the base rating
    pub spread: f64,

    pub lower_bound: f64,
    pub upper_bound: f64,
}

impl MetricSpec {
    pub const fn new(salt: &'static str, spread: f64, lower_bound: f64, upper_bound: f64) -> Self {
        MetricSpec {
            salt,
            spread,
            lower_bound,
            upper_bound,
        }
    }

    /// `round(clamp(base + (r - 0.5) * spread, lower, upper))`
    pub fn derive(&self, seed: &str, base_rating: f64) -> u32 {
        let jitter = (unit_random(seed, self.salt) - 0.5) * self.spread;
        let raw = if base_rating.is_finite() {
            base_rating + jitter
        } else {
            DEFAULT_BASE_RATING + jitter
        };
        raw.clamp(self.lower_bound, self.upper_bound).round() as u32
    }
}

pub const ON_TIME_SPEC: MetricSpec = MetricSpec::new("onTime", 20.0, 55.0, 99.0);
pub const QUALITY_SPEC: MetricSpec = MetricSpec::new("quality", 18.0, 55.0, 98.0);
pub const COMPLIANCE_SPEC: MetricSpec = MetricSpec::new("compliance", 22.0, 55.0, 99.0);

// ============================================================================
// SYNTHETIC METRIC SET
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyntheticMetricSet {
    #[serde(alias = "deliveryOnTime")]
    pub on_time_delivery: u32,
    pub quality_score: u32,
    pub compliance_score: u32,
}

impl SyntheticMetricSet {
    /// Value by row key, `None` for keys this set does not carry
    pub fn get(&self, key: &str) -> Option<u32> {
        match key {
            ON_TIME_DELIVERY | "deliveryOnTime" => Some(self.on_time_delivery),
            QUALITY_SCORE => Some(self.quality_score),
            COMPLIANCE_SCORE => Some(self.compliance_score),
            _ => None,
        }
    }
}

// ============================================================================
// ATTRIBUTE SYNTHESIZER
// ============================================================================

pub struct AttributeSynthesizer {
    on_time: MetricSpec,
    quality: MetricSpec,
    compliance: MetricSpec,
}

impl AttributeSynthesizer {
    pub fn new() -> Self {
        AttributeSynthesizer {
            on_time: ON_TIME_SPEC,
            quality: QUALITY_SPEC,
            compliance: COMPLIANCE_SPEC,
        }
    }

    pub fn with_specs(on_time: MetricSpec, quality: MetricSpec, compliance: MetricSpec) -> Self {
        AttributeSynthesizer {
            on_time,
            quality,
            compliance,
        }
    }

    pub fn synthesize(&self, seed: &str, base_rating: f64) -> SyntheticMetricSet {
        SyntheticMetricSet {
            on_time_delivery: self.on_time.derive(seed, base_rating),
            quality_score: self.quality.derive(seed, base_rating),
            compliance_score: self.compliance.derive(seed, base_rating),
        }
    }
}

impl Default for AttributeSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Metrics for an entity seed with the standard specs
pub fn synthesize_metrics(seed: &str, base_rating: f64) -> SyntheticMetricSet {
    AttributeSynthesizer::new().synthesize(seed, base_rating)
}

// ============================================================================
// TESTS
// ============================================================================
