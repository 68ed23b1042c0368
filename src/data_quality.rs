// ✅ Record Checks - Field-level validation of cleansed import rows
//
// Issues are reported next to the rows, never used to drop them.

use crate::deduplication::CanonicalRecord;
use crate::identifiers::{verify_identifier, IDENTIFIER_LENGTH};
use crate::mapping::SystemField;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|_| Regex::new("$^").unwrap_or_else(|_| unreachable!()))
    })
}

pub fn is_valid_email(email: &str) -> bool {
    email_re().is_match(email)
}

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical, // Value is unusable as-is
    Warning,  // Value is questionable
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordIssue {
    /// Index into the output rows
    pub row: usize,
    pub field: SystemField,
    pub severity: Severity,
    pub issue: String,
    pub recommendation: String,
}

// ============================================================================
// RECORD VALIDATOR
// ============================================================================

pub struct RecordValidator {
    validate_email: bool,
}

impl RecordValidator {
    pub fn new(validate_email: bool) -> Self {
        RecordValidator { validate_email }
    }

    pub fn validate(&self, row: usize, record: &CanonicalRecord) -> Vec<RecordIssue> {
        let mut issues = Vec::new();

        if self.validate_email {
            if let Some(email) = record.get(&SystemField::ContactEmail) {
                if !email.is_empty() && !is_valid_email(email) {
                    issues.push(RecordIssue {
                        row,
                        field: SystemField::ContactEmail,
                        severity: Severity::Critical,
                        issue: format!("Malformed email: {}", email),
                        recommendation: "Correct the contact email".to_string(),
                    });
                }
            }
        }

        if let Some(code) = record.get(&SystemField::SocialCreditCode) {
            if let Some(issue) = check_credit_code(code) {
                issues.push(RecordIssue {
                    row,
                    field: SystemField::SocialCreditCode,
                    severity: Severity::Warning,
                    issue,
                    recommendation: "Verify the code against the business license".to_string(),
                });
            }
        }

        issues
    }

    pub fn validate_all(&self, records: &[CanonicalRecord]) -> Vec<RecordIssue> {
        records
            .iter()
            .enumerate()
            .flat_map(|(i, r)| self.validate(i, r))
            .collect()
    }
}

fn check_credit_code(code: &str) -> Option<String> {
    if code.is_empty() {
        return None;
    }
    let len = code.chars().count();
    if len != IDENTIFIER_LENGTH {
        return Some(format!("Credit code has {} characters, expected {}", len, IDENTIFIER_LENGTH));
    }
    if !verify_identifier(code) {
        return Some(format!("Credit code check character does not verify: {}", code));
    }
    None
}
