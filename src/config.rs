// ⚙️ Engine configuration - JSON file, every key optional

use crate::deduplication::CleansingConfig;
use crate::entities::{Bank, BankRegistry, Region, RegionTable};
use crate::identifiers::IdentifierSynthesizer;
use crate::scoring::{GradingRule, ScoringEngine};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Suppliers generated by a default seeding run
pub const DEFAULT_SEED_COUNT: usize = 80;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Rule used when the repository holds none
    pub grading: GradingRule,
    pub cleansing: CleansingConfig,

    /// Replaces the built-in region table when set
    pub regions: Option<Vec<Region>>,

    /// Replaces the built-in bank registry when set
    pub banks: Option<Vec<Bank>>,

    pub seed_count: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            grading: GradingRule::default(),
            cleansing: CleansingConfig::default(),
            regions: None,
            banks: None,
            seed_count: DEFAULT_SEED_COUNT,
        }
    }
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse engine config JSON")
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_json_str(&content)
    }

    pub fn identifier_synthesizer(&self) -> IdentifierSynthesizer {
        let regions = match &self.regions {
            Some(list) => RegionTable::from_regions(list.clone()),
            None => RegionTable::new(),
        };
        let banks = match &self.banks {
            Some(list) => BankRegistry::from_banks(list.clone()),
            None => BankRegistry::new(),
        };
        IdentifierSynthesizer::with_tables(regions, banks)
    }

    pub fn scoring_engine(&self) -> ScoringEngine {
        ScoringEngine::new(self.grading.clone())
    }
}
