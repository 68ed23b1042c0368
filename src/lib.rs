// SRM Synth - Core Library
// Deterministic synthetic supplier data, grading and import normalization.
// Exposes all modules for use in the CLI and tests.

pub mod error;
pub mod hashing;        // Seeded hash, unit random, LCG stream
pub mod identifiers;    // Registration codes, bank accounts, phones
pub mod attributes;     // Correlated performance metrics
pub mod qualifications; // Certificates + expiry status
pub mod purchase_orders; // Seeded orders, line items, status flow
pub mod scoring;        // Grading rules → composite score → tier
pub mod parser;         // Raw tables (grid / CSV)
pub mod mapping;        // Header → canonical field
pub mod deduplication;  // Cleansing + dedup pipeline
pub mod data_quality;   // Record checks
pub mod entities;       // Regions, banks, suppliers
pub mod db;             // Repository trait + SQLite / in-memory stores
pub mod config;
pub mod workflows;

// Re-export commonly used types
pub use error::{Error, Result, SynthesisError};
pub use hashing::{hash, unit_random, LcgStream};
pub use identifiers::{
    compute_check_char, is_luhn_valid, luhn_complete, verify_identifier, AccountKind,
    BankAccount, IdentifierSynthesizer, FALLBACK_IDENTIFIER,
};
pub use attributes::{synthesize_metrics, AttributeSynthesizer, MetricSpec, SyntheticMetricSet};
pub use qualifications::{
    expiry_status, seed_qualifications, synthesize_qualifications, Qualification,
    QualificationStatus,
};
pub use purchase_orders::{LineItem, PoAction, PoStatus, PurchaseOrder};
pub use scoring::{
    compute_score, map_category, normalize_weights, GradeCategory, Grade, GradeSummary,
    GradingMetric, GradingRule, MetricLookup, ScoringEngine, UNCLASSIFIED,
};
pub use parser::RawTable;
pub use mapping::{detect_field, FieldMapping, SystemField};
pub use deduplication::{
    normalize_and_dedup, CanonicalRecord, CleansingConfig, ImportPipeline, PreprocessReport,
};
pub use data_quality::{RecordIssue, RecordValidator, Severity};
pub use entities::{
    Bank, BankRegistry, GradedSupplier, Page, Region, RegionTable, Supplier, SupplierQuery,
    SupplierSeeder,
};
pub use db::{InMemoryRepository, Repository, RepositoryExt, SqliteRepository};
pub use config::EngineConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
