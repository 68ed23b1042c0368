// 🔁 Workflows - Engine operations over an injected Repository
//
// Seeding, grading and import submission. The engine modules stay pure; only
// this layer reads or writes storage.

use crate::attributes::{AttributeSynthesizer, DEFAULT_BASE_RATING};
use crate::db::{
    Repository, RepositoryExt, GRADING_RULES, IMPORT_BATCHES, META, PURCHASE_ORDERS,
    QUALIFICATIONS, SUPPLIERS,
};
use crate::deduplication::{CleansingConfig, PreprocessReport};
use crate::entities::{GradedSupplier, Page, Supplier, SupplierQuery, SupplierSeeder};
use crate::error::Result;
use crate::mapping::FieldMapping;
use crate::purchase_orders::{seed_purchase_orders, PoAction, PurchaseOrder};
use crate::qualifications::{seed_qualifications, synthesize_qualifications, Qualification};
use crate::scoring::{GradingRule, ScoringEngine};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Key marking a repository as already seeded
pub const SEEDED_MARKER: &str = "seeded";

/// Key of the active grading rule
pub const CURRENT_RULE: &str = "current";

/// Key of the most recently submitted import batch
pub const LATEST_BATCH: &str = "latest";

/// Only the first suppliers of a seeding run get qualifications
pub const QUALIFIED_SUPPLIERS: usize = 60;

// ============================================================================
// SEEDING
// ============================================================================

/// Store `count` seeded suppliers, `default_rule` (unless a rule is already
/// stored), their qualifications and the seeded purchase orders. Returns the
/// number of suppliers written; 0 when the repository was seeded before.
pub fn seed_suppliers<R: Repository + ?Sized>(
    repo: &R,
    seeder: &SupplierSeeder,
    count: usize,
    default_rule: &GradingRule,
) -> Result<usize> {
    if repo.get(META, SEEDED_MARKER)?.is_some() {
        info!("repository already seeded, skipping");
        return Ok(0);
    }

    let suppliers = seeder.generate(count);
    for supplier in &suppliers {
        repo.put_json(SUPPLIERS, &supplier.id, supplier)?;
    }

    if repo.get(GRADING_RULES, CURRENT_RULE)?.is_none() {
        save_grading_rule(repo, default_rule)?;
    }

    for (idx, supplier) in suppliers.iter().take(QUALIFIED_SUPPLIERS).enumerate() {
        let items = seed_qualifications(&supplier.id, idx, seeder.today());
        repo.put_json(QUALIFICATIONS, &supplier.id, &items)?;
    }

    let orders = seed_purchase_orders(&suppliers, seeder.today());
    for order in &orders {
        repo.put_json(PURCHASE_ORDERS, &order.po_no, order)?;
    }

    repo.put(META, SEEDED_MARKER, &serde_json::Value::Bool(true))?;
    info!(
        suppliers = suppliers.len(),
        purchase_orders = orders.len(),
        "repository seeded"
    );
    Ok(suppliers.len())
}

pub fn load_qualifications<R: Repository + ?Sized>(
    repo: &R,
    supplier_id: &str,
) -> Result<Vec<Qualification>> {
    Ok(repo.get_json(QUALIFICATIONS, supplier_id)?.unwrap_or_default())
}

/// Prepend `count` generated qualifications to a supplier's stored list,
/// numbered after the existing ones. Returns the number added.
pub fn generate_qualifications<R: Repository + ?Sized>(
    repo: &R,
    supplier_id: &str,
    count: usize,
    today: NaiveDate,
) -> Result<usize> {
    let existing = load_qualifications(repo, supplier_id)?;
    let mut items = synthesize_qualifications(supplier_id, existing.len(), count, today);
    let added = items.len();
    items.extend(existing);

    repo.put_json(QUALIFICATIONS, supplier_id, &items)?;
    debug!(supplier_id, added, total = items.len(), "qualifications generated");
    Ok(added)
}

// ============================================================================
// GRADING
// ============================================================================

/// Stored rule, or `default_rule` when none has been saved
pub fn load_grading_rule<R: Repository + ?Sized>(
    repo: &R,
    default_rule: &GradingRule,
) -> Result<GradingRule> {
    Ok(repo
        .get_json(GRADING_RULES, CURRENT_RULE)?
        .unwrap_or_else(|| default_rule.clone()))
}

pub fn save_grading_rule<R: Repository + ?Sized>(repo: &R, rule: &GradingRule) -> Result<()> {
    repo.put_json(GRADING_RULES, CURRENT_RULE, rule)?;
    debug!(
        categories = rule.categories.len(),
        metrics = rule.metrics.len(),
        "grading rule saved"
    );
    Ok(())
}

/// Score and classify every stored supplier. Cached metrics are used when
/// present; otherwise they are derived from the supplier id and rating.
pub fn grade_suppliers<R: Repository + ?Sized>(
    repo: &R,
    engine: &ScoringEngine,
    synthesizer: &AttributeSynthesizer,
) -> Result<Vec<GradedSupplier>> {
    let suppliers: Vec<Supplier> = repo.list_json(SUPPLIERS)?;

    let graded: Vec<GradedSupplier> = suppliers
        .iter()
        .map(|s| {
            let metrics = s.metrics.unwrap_or_else(|| {
                synthesizer.synthesize(&s.id, s.rating_score.unwrap_or(DEFAULT_BASE_RATING))
            });
            let grade = engine.grade(&metrics);
            GradedSupplier {
                supplier_id: s.id.clone(),
                supplier_name: s.supplier_name.clone(),
                metrics,
                total_score: grade.total_score,
                category: grade.category,
            }
        })
        .collect();

    info!(graded = graded.len(), "suppliers graded");
    Ok(graded)
}

// ============================================================================
// PURCHASE ORDERS
// ============================================================================

pub fn list_purchase_orders<R: Repository + ?Sized>(repo: &R) -> Result<Vec<PurchaseOrder>> {
    repo.list_json(PURCHASE_ORDERS)
}

/// Create or replace an order, keyed by its order number
pub fn save_purchase_order<R: Repository + ?Sized>(repo: &R, order: &PurchaseOrder) -> Result<()> {
    repo.put_json(PURCHASE_ORDERS, &order.po_no, order)
}

/// Order detail. Derived line items are filled in for display and are not
/// written back.
pub fn get_purchase_order<R: Repository + ?Sized>(repo: &R, po_no: &str) -> Result<PurchaseOrder> {
    let mut order: PurchaseOrder = repo.require_json(PURCHASE_ORDERS, po_no)?;
    order.ensure_line_items();
    Ok(order)
}

pub fn transition_purchase_order<R: Repository + ?Sized>(
    repo: &R,
    po_no: &str,
    action: PoAction,
) -> Result<PurchaseOrder> {
    let mut order: PurchaseOrder = repo.require_json(PURCHASE_ORDERS, po_no)?;
    let from = order.status;
    order.apply(action);
    save_purchase_order(repo, &order)?;
    info!(po_no, from = %from, to = %order.status, "purchase order transitioned");
    Ok(order)
}

// ============================================================================
// IMPORT SUBMISSION
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportBatch {
    pub mapping: FieldMapping,
    pub config: CleansingConfig,
    pub report: PreprocessReport,
    pub submitted_at: DateTime<Utc>,
}

/// Persist a preprocessed batch as the latest import
pub fn submit_preprocess<R: Repository + ?Sized>(
    repo: &R,
    mapping: &FieldMapping,
    config: &CleansingConfig,
    report: &PreprocessReport,
) -> Result<ImportBatch> {
    let batch = ImportBatch {
        mapping: mapping.clone(),
        config: config.clone(),
        report: report.clone(),
        submitted_at: Utc::now(),
    };
    repo.put_json(IMPORT_BATCHES, LATEST_BATCH, &batch)?;
    info!(rows = report.rows.len(), "import batch submitted");
    Ok(batch)
}

pub fn latest_import<R: Repository + ?Sized>(repo: &R) -> Result<Option<ImportBatch>> {
    repo.get_json(IMPORT_BATCHES, LATEST_BATCH)
}

// ============================================================================
// LISTING
// ============================================================================

pub fn list_suppliers<R: Repository + ?Sized>(
    repo: &R,
    query: &SupplierQuery,
) -> Result<Page<Supplier>> {
    let suppliers: Vec<Supplier> = repo.list_json(SUPPLIERS)?;
    let filtered: Vec<Supplier> = suppliers.into_iter().filter(|s| query.matches(s)).collect();

    let page = query.page.max(1);
    let page_size = query.page_size.max(1);
    let items = filtered
        .iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .cloned()
        .collect();

    Ok(Page {
        items,
        total: filtered.len(),
        page,
        page_size,
    })
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::InMemoryRepository;
    use crate::identifiers::IdentifierSynthesizer;
    use crate::parser::RawTable;
    use crate::config::EngineConfig;
    use crate::deduplication::ImportPipeline;
    use crate::purchase_orders::PoStatus;
    use crate::scoring::GradeCategory;

    fn create_seeded_repo(count: usize) -> InMemoryRepository {
        let repo = InMemoryRepository::new();
        let synth = IdentifierSynthesizer::new();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        seed_suppliers(&repo, &SupplierSeeder::new(&synth, today), count, &GradingRule::default())
            .unwrap();
        repo
    }

    #[test]
    fn test_seeding_is_idempotent() {
        let repo = create_seeded_repo(12);
        assert_eq!(repo.keys(SUPPLIERS).unwrap().len(), 12);

        let synth = IdentifierSynthesizer::new();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let again = seed_suppliers(
            &repo,
            &SupplierSeeder::new(&synth, today),
            50,
            &GradingRule::default(),
        )
        .unwrap();
        assert_eq!(again, 0);
        assert_eq!(repo.keys(SUPPLIERS).unwrap().len(), 12);
    }

    #[test]
    fn test_seeding_writes_qualifications_and_rule() {
        let repo = create_seeded_repo(3);
        assert_eq!(load_qualifications(&repo, "S-1001").unwrap().len(), 10);
        assert_eq!(load_qualifications(&repo, "S-1003").unwrap().len(), 12);
        assert!(load_qualifications(&repo, "S-9999").unwrap().is_empty());
        assert_eq!(
            load_grading_rule(&repo, &GradingRule::default()).unwrap(),
            GradingRule::default()
        );

        let quals = load_qualifications(&repo, "S-1001").unwrap();
        assert_eq!(quals[0].id, "Q-S-1001-1");
        assert_eq!(quals[9].id, "Q-S-1001-10");
        assert_eq!(quals[9].number, "NO-100010");
    }

    #[test]
    fn test_seeding_stores_configured_rule() {
        let config = EngineConfig {
            grading: GradingRule {
                categories: vec![GradeCategory::new("X", "X级", 0.0)],
                ..GradingRule::default()
            },
            ..EngineConfig::default()
        };

        let repo = InMemoryRepository::new();
        let synth = config.identifier_synthesizer();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        seed_suppliers(&repo, &SupplierSeeder::new(&synth, today), 5, &config.grading).unwrap();

        let rule = load_grading_rule(&repo, &GradingRule::default()).unwrap();
        assert_eq!(rule, config.grading);

        let graded = grade_suppliers(&repo, &ScoringEngine::new(rule), &AttributeSynthesizer::new())
            .unwrap();
        assert!(graded.iter().all(|g| g.category == "X级"));
    }

    #[test]
    fn test_unseeded_repo_uses_configured_rule() {
        let repo = InMemoryRepository::new();
        let mut fallback = GradingRule::default();
        fallback.metrics.truncate(1);
        assert_eq!(load_grading_rule(&repo, &fallback).unwrap(), fallback);
    }

    #[test]
    fn test_grade_suppliers() {
        let repo = create_seeded_repo(10);
        let graded =
            grade_suppliers(&repo, &ScoringEngine::default(), &AttributeSynthesizer::new()).unwrap();

        assert_eq!(graded.len(), 10);
        for g in &graded {
            assert!((55.0..=99.0).contains(&g.total_score));
            assert!(["A级", "B级", "C级"].contains(&g.category.as_str()));
        }
    }

    #[test]
    fn test_cached_metrics_win() {
        let repo = create_seeded_repo(1);
        let mut supplier: Supplier = repo.require_json(SUPPLIERS, "S-1001").unwrap();
        supplier.metrics = Some(crate::attributes::SyntheticMetricSet {
            on_time_delivery: 95,
            quality_score: 92,
            compliance_score: 96,
        });
        repo.put_json(SUPPLIERS, "S-1001", &supplier).unwrap();

        let graded =
            grade_suppliers(&repo, &ScoringEngine::default(), &AttributeSynthesizer::new()).unwrap();
        assert_eq!(graded[0].total_score, 94.0);
        assert_eq!(graded[0].category, "A级");
    }

    #[test]
    fn test_rule_round_trip() {
        let repo = InMemoryRepository::new();
        let default_rule = GradingRule::default();
        assert_eq!(load_grading_rule(&repo, &default_rule).unwrap(), default_rule);

        let mut rule = GradingRule::default();
        rule.categories.truncate(1);
        save_grading_rule(&repo, &rule).unwrap();
        assert_eq!(load_grading_rule(&repo, &default_rule).unwrap().categories.len(), 1);
    }

    #[test]
    fn test_list_suppliers_paginates() {
        let repo = create_seeded_repo(25);
        let query = SupplierQuery {
            page: 3,
            ..SupplierQuery::default()
        };
        let page = list_suppliers(&repo, &query).unwrap();
        assert_eq!(page.total, 25);
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, "S-1021");

        let active = SupplierQuery {
            active: Some(true),
            page_size: 100,
            ..SupplierQuery::default()
        };
        assert_eq!(list_suppliers(&repo, &active).unwrap().total, 22);
    }

    #[test]
    fn test_list_suppliers_far_page_is_empty() {
        let repo = create_seeded_repo(5);
        let query: SupplierQuery =
            serde_json::from_str(r#"{"page": 18446744073709551615, "pageSize": 10}"#).unwrap();
        assert_eq!(query.page, usize::MAX);

        let page = list_suppliers(&repo, &query).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 5);
        assert_eq!(page.page, usize::MAX);

        let huge = SupplierQuery {
            page: 2,
            page_size: usize::MAX,
            ..SupplierQuery::default()
        };
        assert!(list_suppliers(&repo, &huge).unwrap().items.is_empty());
    }

    #[test]
    fn test_generate_qualifications_prepends() {
        let repo = create_seeded_repo(1);
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let seeded = load_qualifications(&repo, "S-1001").unwrap();
        assert_eq!(seeded.len(), 10);

        let added = generate_qualifications(&repo, "S-1001", 5, today).unwrap();
        assert_eq!(added, 5);

        let stored = load_qualifications(&repo, "S-1001").unwrap();
        assert_eq!(stored.len(), 15);
        // numbered after the 10 existing certificates, newest first
        assert_eq!(stored[0].id, "Q-S-1001-11");
        assert_eq!(stored[0].number, "NO-100011");
        assert_eq!(stored[4].id, "Q-S-1001-15");
        assert_eq!(&stored[5..], &seeded[..]);

        generate_qualifications(&repo, "S-1001", 2, today).unwrap();
        let again = load_qualifications(&repo, "S-1001").unwrap();
        assert_eq!(again.len(), 17);
        assert_eq!(again[0].id, "Q-S-1001-16");
    }

    #[test]
    fn test_generate_qualifications_for_new_supplier() {
        let repo = InMemoryRepository::new();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(generate_qualifications(&repo, "S-9001", 3, today).unwrap(), 3);

        let stored = load_qualifications(&repo, "S-9001").unwrap();
        assert_eq!(stored[0].id, "Q-S-9001-1");
        assert_eq!(stored, synthesize_qualifications("S-9001", 0, 3, today));
    }

    #[test]
    fn test_seeding_writes_purchase_orders() {
        let repo = create_seeded_repo(4);
        let orders = list_purchase_orders(&repo).unwrap();
        assert_eq!(orders.len(), 120);
        assert_eq!(orders[0].po_no, "PO202510001");
        assert_eq!(orders[0].supplier_id, "S-1002");
        assert!(orders.iter().all(|o| o.items.is_empty()));

        let empty = InMemoryRepository::new();
        let synth = IdentifierSynthesizer::new();
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        seed_suppliers(&empty, &SupplierSeeder::new(&synth, today), 0, &GradingRule::default())
            .unwrap();
        assert!(list_purchase_orders(&empty).unwrap().is_empty());
    }

    #[test]
    fn test_purchase_order_detail_and_transition() {
        let repo = create_seeded_repo(4);
        let detail = get_purchase_order(&repo, "PO202510004").unwrap();
        assert_eq!(detail.status, PoStatus::Draft);
        assert!(!detail.items.is_empty());
        assert_eq!(detail.items, get_purchase_order(&repo, "PO202510004").unwrap().items);

        let stored: PurchaseOrder = repo.require_json(PURCHASE_ORDERS, "PO202510004").unwrap();
        assert!(stored.items.is_empty());

        let submitted = transition_purchase_order(&repo, "PO202510004", PoAction::Submit).unwrap();
        assert_eq!(submitted.status, PoStatus::Submitted);
        transition_purchase_order(&repo, "PO202510004", PoAction::Reconcile).unwrap();
        assert_eq!(
            get_purchase_order(&repo, "PO202510004").unwrap().status,
            PoStatus::Reconciled
        );

        assert!(matches!(
            transition_purchase_order(&repo, "PO-MISSING", PoAction::Receive),
            Err(crate::Error::NotFound(_))
        ));
    }

    #[test]
    fn test_submit_preprocess() {
        let repo = InMemoryRepository::new();
        let table = RawTable::from_grid(&[vec!["供应商名称"], vec!["甲"], vec!["乙"]]);
        let pipeline = ImportPipeline::for_table(&table, CleansingConfig::default());
        let report = pipeline.run(&table);

        submit_preprocess(&repo, pipeline.mapping(), pipeline.config(), &report).unwrap();
        let latest = latest_import(&repo).unwrap().unwrap();
        assert_eq!(latest.report.rows.len(), 2);
        assert_eq!(latest.mapping, *pipeline.mapping());
    }
}
