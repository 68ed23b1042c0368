// 🔍 Import Normalization - Materialize, cleanse and deduplicate imported rows
//
// Pipeline over a raw table:
// 1. Materialize rows into canonical records via the field mapping
// 2. Cleanse (trim, upper-case credit code, digits-only phone), each toggle-gated
// 3. Deduplicate on the configured key, first occurrence wins
// 4. Run record checks (reported, never dropping rows)

use crate::data_quality::{RecordIssue, RecordValidator};
use crate::mapping::{FieldMapping, SystemField};
use crate::parser::RawTable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

/// One imported row keyed by canonical field
pub type CanonicalRecord = BTreeMap<SystemField, String>;

/// Mobile numbers keep at most this many digits
pub const PHONE_DIGITS: usize = 11;

// ============================================================================
// CLEANSING CONFIG
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CleansingConfig {
    /// Trim surrounding whitespace from every value
    pub trim_all: bool,

    /// Upper-case the social credit code
    #[serde(alias = "uppercaseCredit")]
    pub uppercase_code: bool,

    /// Reduce phones to digits, at most 11
    pub normalize_phone: bool,

    pub remove_duplicates: bool,

    /// Field rows are deduplicated on; `None` disables dedup
    pub dedup_key: Option<SystemField>,

    /// Report malformed contact emails
    pub validate_email: bool,
}

impl Default for CleansingConfig {
    fn default() -> Self {
        CleansingConfig {
            trim_all: true,
            uppercase_code: true,
            normalize_phone: true,
            remove_duplicates: true,
            dedup_key: Some(SystemField::SocialCreditCode),
            validate_email: false,
        }
    }
}

// ============================================================================
// STAGES
// ============================================================================

/// Build one record per data row. Unmapped headers are dropped; when two
/// headers map to the same field the later one wins.
pub fn materialize(table: &RawTable, mapping: &FieldMapping) -> Vec<CanonicalRecord> {
    let columns: Vec<(usize, SystemField)> = table
        .headers()
        .iter()
        .enumerate()
        .filter_map(|(i, h)| mapping.get(h).map(|f| (i, f)))
        .collect();

    (0..table.len())
        .map(|row| {
            columns
                .iter()
                .map(|&(col, field)| (field, table.cell(row, col).to_string()))
                .collect()
        })
        .collect()
}

pub fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(PHONE_DIGITS)
        .collect()
}

pub fn cleanse_record(record: &mut CanonicalRecord, config: &CleansingConfig) {
    if config.trim_all {
        for value in record.values_mut() {
            let trimmed = value.trim();
            if trimmed.len() != value.len() {
                *value = trimmed.to_string();
            }
        }
    }

    if config.uppercase_code {
        if let Some(code) = record.get_mut(&SystemField::SocialCreditCode) {
            *code = code.to_uppercase();
        }
    }

    if config.normalize_phone {
        if let Some(phone) = record.get_mut(&SystemField::ContactPhone) {
            *phone = normalize_phone(phone);
        }
    }
}

/// Keep rows whose key is empty or not seen before; returns the kept rows
/// and the number removed.
pub fn dedup(records: Vec<CanonicalRecord>, key: SystemField) -> (Vec<CanonicalRecord>, usize) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut removed = 0;

    let kept = records
        .into_iter()
        .filter(|record| {
            let value = record.get(&key).map(String::as_str).unwrap_or("");
            if value.is_empty() || seen.insert(value.to_string()) {
                true
            } else {
                removed += 1;
                false
            }
        })
        .collect();

    (kept, removed)
}

/// Cleansing then (when enabled) dedup over already materialized records
pub fn cleanse_and_dedup(
    mut records: Vec<CanonicalRecord>,
    config: &CleansingConfig,
) -> (Vec<CanonicalRecord>, usize) {
    for record in records.iter_mut() {
        cleanse_record(record, config);
    }

    match (config.remove_duplicates, config.dedup_key) {
        (true, Some(key)) => dedup(records, key),
        _ => (records, 0),
    }
}

// ============================================================================
// PREPROCESS REPORT
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreprocessReport {
    pub rows: Vec<CanonicalRecord>,
    pub removed_count: usize,

    /// Table headers that map to a field
    pub mapped_field_count: usize,

    /// Data rows read from the source
    pub raw_count: usize,

    #[serde(default)]
    pub issues: Vec<RecordIssue>,
}

impl PreprocessReport {
    /// Fields present in any row, in canonical order
    pub fn fields(&self) -> Vec<SystemField> {
        let present: BTreeSet<SystemField> =
            self.rows.iter().flat_map(|r| r.keys().copied()).collect();
        present.into_iter().collect()
    }

    /// Label header row followed by one row per record
    pub fn to_table(&self) -> Vec<Vec<String>> {
        let fields = self.fields();
        let mut table = Vec::with_capacity(self.rows.len() + 1);
        table.push(fields.iter().map(|f| f.label().to_string()).collect());
        for record in &self.rows {
            table.push(
                fields
                    .iter()
                    .map(|f| record.get(f).cloned().unwrap_or_default())
                    .collect(),
            );
        }
        table
    }

    pub fn summary(&self) -> String {
        format!(
            "Rows: {} of {} kept, {} duplicates removed, {} fields mapped, {} issues",
            self.rows.len(),
            self.raw_count,
            self.removed_count,
            self.mapped_field_count,
            self.issues.len()
        )
    }
}

/// Run the whole pipeline over a table
pub fn normalize_and_dedup(
    table: &RawTable,
    mapping: &FieldMapping,
    config: &CleansingConfig,
) -> PreprocessReport {
    let raw_count = table.len();
    let mapped_field_count = mapping.mapped_count(table.headers());
    debug!(raw_count, mapped_field_count, "materializing import rows");

    let records = materialize(table, mapping);
    let (rows, removed_count) = cleanse_and_dedup(records, config);
    let issues = RecordValidator::new(config.validate_email).validate_all(&rows);

    let report = PreprocessReport {
        rows,
        removed_count,
        mapped_field_count,
        raw_count,
        issues,
    };
    info!("{}", report.summary());
    report
}

// ============================================================================
// IMPORT PIPELINE
// ============================================================================

/// Mapping plus cleansing options for one import batch
pub struct ImportPipeline {
    mapping: FieldMapping,
    config: CleansingConfig,
}

impl ImportPipeline {
    pub fn new(mapping: FieldMapping, config: CleansingConfig) -> Self {
        ImportPipeline { mapping, config }
    }

    /// Pipeline with a mapping auto-detected from the table's headers
    pub fn for_table(table: &RawTable, config: CleansingConfig) -> Self {
        ImportPipeline::new(FieldMapping::auto_detect(table.headers()), config)
    }

    pub fn mapping(&self) -> &FieldMapping {
        &self.mapping
    }

    pub fn mapping_mut(&mut self) -> &mut FieldMapping {
        &mut self.mapping
    }

    pub fn config(&self) -> &CleansingConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CleansingConfig {
        &mut self.config
    }

    pub fn run(&self, table: &RawTable) -> PreprocessReport {
        normalize_and_dedup(table, &self.mapping, &self.config)
    }
}

// ============================================================================
// TESTS
// ============================================================================
