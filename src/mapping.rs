// 🧭 Field Mapping - Raw import headers → canonical supplier fields
//
// Auto-detection walks an ordered keyword rule table; the first rule whose
// keywords match the lower-cased header wins. Users may override any header
// before rows are materialized.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SYSTEM FIELDS
// ============================================================================

/// Canonical fields an imported supplier row can carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SystemField {
    SupplierName,
    SocialCreditCode,
    ContactName,
    ContactPhone,
    ContactEmail,
    BankName,
    BankBranch,
    BankAccountName,
    BankAccountNo,
    InvoiceTitle,
}

impl SystemField {
    pub const ALL: [SystemField; 10] = [
        SystemField::SupplierName,
        SystemField::SocialCreditCode,
        SystemField::ContactName,
        SystemField::ContactPhone,
        SystemField::ContactEmail,
        SystemField::BankName,
        SystemField::BankBranch,
        SystemField::BankAccountName,
        SystemField::BankAccountNo,
        SystemField::InvoiceTitle,
    ];

    /// Row key (camelCase)
    pub fn key(&self) -> &'static str {
        match self {
            SystemField::SupplierName => "supplierName",
            SystemField::SocialCreditCode => "socialCreditCode",
            SystemField::ContactName => "contactName",
            SystemField::ContactPhone => "contactPhone",
            SystemField::ContactEmail => "contactEmail",
            SystemField::BankName => "bankName",
            SystemField::BankBranch => "bankBranch",
            SystemField::BankAccountName => "bankAccountName",
            SystemField::BankAccountNo => "bankAccountNo",
            SystemField::InvoiceTitle => "invoiceTitle",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            SystemField::SupplierName => "供应商名称",
            SystemField::SocialCreditCode => "统一社会信用代码",
            SystemField::ContactName => "联系人姓名",
            SystemField::ContactPhone => "联系人手机",
            SystemField::ContactEmail => "联系人邮箱",
            SystemField::BankName => "开户银行",
            SystemField::BankBranch => "开户支行",
            SystemField::BankAccountName => "账户名称",
            SystemField::BankAccountNo => "银行账号",
            SystemField::InvoiceTitle => "发票抬头",
        }
    }
}

impl fmt::Display for SystemField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SystemField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemField::ALL
            .iter()
            .copied()
            .find(|f| f.key() == s)
            .ok_or_else(|| format!("Unknown field: {}", s))
    }
}

// ============================================================================
// HEADER RULES
// ============================================================================

/// One auto-mapping rule.
///
/// Matches when every group in `all_of` has at least one keyword contained
/// in the header and no keyword in `none_of` is.
pub struct HeaderRule {
    pub field: SystemField,
    pub all_of: &'static [&'static [&'static str]],
    pub none_of: &'static [&'static str],
}

impl HeaderRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.all_of
            .iter()
            .all(|group| group.iter().any(|k| lowered.contains(k)))
            && !self.none_of.iter().any(|k| lowered.contains(k))
    }
}

const CONTACT: &[&str] = &["联系人", "contact"];

/// Rules in priority order; first match wins
pub const HEADER_RULES: &[HeaderRule] = &[
    HeaderRule {
        field: SystemField::SupplierName,
        all_of: &[&["名称", "supplier", "company"]],
        none_of: &["账户", "account", "联系", "contact", "开户", "银行", "bank", "发票", "invoice"],
    },
    HeaderRule {
        field: SystemField::SocialCreditCode,
        all_of: &[&["信用", "统一", "税号", "credit", "tax id", "uscc"]],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::ContactPhone,
        all_of: &[CONTACT, &["手", "电话", "phone", "mobile", "tel"]],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::ContactEmail,
        all_of: &[CONTACT, &["邮", "email", "mail"]],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::ContactName,
        all_of: &[CONTACT],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::BankBranch,
        all_of: &[&["开户", "bank"], &["支", "branch"]],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::BankName,
        all_of: &[&["开户行", "银行", "开户", "bank"]],
        none_of: &["账号", "账户", "卡号", "account", "number"],
    },
    HeaderRule {
        field: SystemField::BankAccountName,
        all_of: &[&["账户名", "户名", "account name", "account holder"]],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::BankAccountNo,
        all_of: &[&["账号", "卡号", "account"]],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::InvoiceTitle,
        all_of: &[&["发票", "抬头", "invoice"]],
        none_of: &[],
    },
    // Bare contact columns without a "contact" qualifier
    HeaderRule {
        field: SystemField::ContactPhone,
        all_of: &[&["手机", "电话", "phone", "mobile"]],
        none_of: &[],
    },
    HeaderRule {
        field: SystemField::ContactEmail,
        all_of: &[&["邮箱", "email"]],
        none_of: &[],
    },
];

/// Field for a raw header, or `None` when no rule matches
pub fn detect_field(header: &str) -> Option<SystemField> {
    let lowered = header.trim().to_lowercase();
    if lowered.is_empty() {
        return None;
    }
    HEADER_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| rule.field)
}

// ============================================================================
// FIELD MAPPING
// ============================================================================

/// Header → field assignments for one import batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    assignments: BTreeMap<String, SystemField>,
}

impl FieldMapping {
    pub fn new() -> Self {
        FieldMapping::default()
    }

    /// Auto-detect a field for every header
    pub fn auto_detect<S: AsRef<str>>(headers: &[S]) -> Self {
        let assignments = headers
            .iter()
            .filter_map(|h| detect_field(h.as_ref()).map(|f| (h.as_ref().to_string(), f)))
            .collect();
        FieldMapping { assignments }
    }

    /// Override one header; `None` unmaps it
    pub fn set(&mut self, header: &str, field: Option<SystemField>) {
        match field {
            Some(f) => {
                self.assignments.insert(header.to_string(), f);
            }
            None => {
                self.assignments.remove(header);
            }
        }
    }

    pub fn get(&self, header: &str) -> Option<SystemField> {
        self.assignments.get(header).copied()
    }

    /// Distinct fields this mapping produces
    pub fn canonical(&self) -> BTreeSet<SystemField> {
        self.assignments.values().copied().collect()
    }

    /// How many of `headers` map to a field
    pub fn mapped_count<S: AsRef<str>>(&self, headers: &[S]) -> usize {
        headers.iter().filter(|h| self.get(h.as_ref()).is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SystemField)> {
        self.assignments.iter().map(|(h, f)| (h.as_str(), *f))
    }
}

// ============================================================================
// TESTS
// ============================================================================
