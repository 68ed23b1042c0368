// End-to-end workflows over a SQLite file

use chrono::NaiveDate;
use srm_synth::workflows::{
    generate_qualifications, get_purchase_order, grade_suppliers, latest_import,
    list_purchase_orders, list_suppliers, load_grading_rule, load_qualifications,
    save_grading_rule, seed_suppliers, submit_preprocess, transition_purchase_order,
};
use srm_synth::{
    verify_identifier, AccountKind, AttributeSynthesizer, EngineConfig,
    GradeCategory, GradingRule, IdentifierSynthesizer, PoAction, PoStatus, ImportPipeline, RawTable, Repository, ScoringEngine,
    SqliteRepository, SupplierQuery, SupplierSeeder, SystemField,
};
use std::io::Write;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[test]
fn test_seed_grade_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("srm.db");

    {
        let repo = SqliteRepository::open(&db_path).unwrap();
        let synth = IdentifierSynthesizer::new();
        let written =
            seed_suppliers(&repo, &SupplierSeeder::new(&synth, today()), 80, &GradingRule::default())
                .unwrap();
        assert_eq!(written, 80);
        assert_eq!(repo.count("suppliers").unwrap(), 80);
        assert_eq!(repo.count("qualifications").unwrap(), 60);
        assert_eq!(repo.count("purchase_orders").unwrap(), 120);
    }

    let repo = SqliteRepository::open(&db_path).unwrap();
    let synth = IdentifierSynthesizer::new();
    assert_eq!(
        seed_suppliers(&repo, &SupplierSeeder::new(&synth, today()), 80, &GradingRule::default())
            .unwrap(),
        0
    );

    let page = list_suppliers(
        &repo,
        &SupplierQuery {
            page_size: 100,
            ..SupplierQuery::default()
        },
    )
    .unwrap();
    assert_eq!(page.total, 80);
    for supplier in &page.items {
        assert!(verify_identifier(&supplier.social_credit_code));
        assert!(supplier.bank_account_no.chars().all(|c| c.is_ascii_digit()));
    }

    let engine = ScoringEngine::new(load_grading_rule(&repo, &GradingRule::default()).unwrap());
    let graded = grade_suppliers(&repo, &engine, &AttributeSynthesizer::new()).unwrap();
    assert_eq!(graded.len(), 80);

    let grades: Vec<_> = graded.iter().map(|g| g.grade()).collect();
    let summary = engine.summarize(&grades);
    println!("{}", summary.summary());
    assert_eq!(summary.by_category.values().sum::<usize>(), 80);

    let quals = load_qualifications(&repo, "S-1060").unwrap();
    assert!(!quals.is_empty());
    assert!(load_qualifications(&repo, "S-1061").unwrap().is_empty());
}

#[test]
fn test_edited_rule_changes_grades() {
    let dir = tempfile::tempdir().unwrap();
    let repo = SqliteRepository::open(&dir.path().join("rules.db")).unwrap();
    let synth = IdentifierSynthesizer::new();
    seed_suppliers(&repo, &SupplierSeeder::new(&synth, today()), 10, &GradingRule::default())
        .unwrap();

    let mut rule = load_grading_rule(&repo, &GradingRule::default()).unwrap();
    rule.categories = vec![
        GradeCategory::new("P", "合格", 0.0),
        GradeCategory::new("E", "优秀", 200.0),
    ];
    save_grading_rule(&repo, &rule).unwrap();

    let engine = ScoringEngine::new(load_grading_rule(&repo, &GradingRule::default()).unwrap());
    let graded = grade_suppliers(&repo, &engine, &AttributeSynthesizer::new()).unwrap();
    assert!(graded.iter().all(|g| g.category == "合格"));
}

#[test]
fn test_csv_import_is_stored() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("import.csv");
    let mut file = std::fs::File::create(&csv_path).unwrap();
    writeln!(file, "供应商名称,统一社会信用代码,联系人,联系人手机,银行账号").unwrap();
    writeln!(file, "济南华康医药, 91370100ma3k2b4c50 ,张伟,138 0000 1111,6222021234567890").unwrap();
    writeln!(file, "济南华康医药,91370100MA3K2B4C50,张伟,13800001111,6222021234567890").unwrap();
    writeln!(file, ",,,,").unwrap();
    writeln!(file, "青岛海源,,李娜,0532-88886666,").unwrap();
    drop(file);

    let table = RawTable::from_csv_path(&csv_path).unwrap();
    assert_eq!(table.len(), 3);

    let pipeline = ImportPipeline::for_table(&table, EngineConfig::default().cleansing);
    let report = pipeline.run(&table);
    assert_eq!(report.mapped_field_count, 5);
    assert_eq!(report.removed_count, 1);
    assert_eq!(report.rows[1][&SystemField::ContactPhone], "05328888666");

    let repo = SqliteRepository::open(&dir.path().join("import.db")).unwrap();
    submit_preprocess(&repo, pipeline.mapping(), pipeline.config(), &report).unwrap();
    let batch = latest_import(&repo).unwrap().unwrap();
    assert_eq!(batch.report, report);
    assert_eq!(repo.keys("import_batches").unwrap(), vec!["latest"]);
}

#[test]
fn test_config_file_drives_synthesis() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "seedCount": 3,
            "grading": {{
                "categories": [{{"key": "A", "name": "A", "minScore": 0}}],
                "metrics": [{{"key": "qualityScore", "name": "q", "weight": 1}}]
            }},
            "banks": [{{"name": "测试银行", "bins": ["622202"]}}]
        }}"#
    )
    .unwrap();

    let config = EngineConfig::from_file(file.path()).unwrap();
    assert_eq!(config.seed_count, 3);

    let synth = config.identifier_synthesizer();
    for n in 0..50 {
        let account = synth.synthesize_account_number(&n.to_string(), "济南市");
        assert_eq!(account.bank_name, "测试银行");
        if account.kind == AccountKind::Card {
            assert!(account.account_no.starts_with("622202"));
        }
    }

    let engine = config.scoring_engine();
    let grade = engine.grade(&srm_synth::SyntheticMetricSet {
        on_time_delivery: 10,
        quality_score: 88,
        compliance_score: 10,
    });
    assert_eq!(grade.total_score, 88.0);
    assert_eq!(grade.category, "A");
}

#[test]
fn test_config_rule_is_seeded_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("config_rule.db");
    let config = EngineConfig::from_json_str(
        r#"{"grading": {"categories": [{"key": "X", "name": "X", "minScore": 0}]}}"#,
    )
    .unwrap();

    {
        let repo = SqliteRepository::open(&db_path).unwrap();
        let synth = config.identifier_synthesizer();
        seed_suppliers(&repo, &SupplierSeeder::new(&synth, today()), 3, &config.grading).unwrap();
    }

    let repo = SqliteRepository::open(&db_path).unwrap();
    let stored = load_grading_rule(&repo, &GradingRule::default()).unwrap();
    println!("stored categories: {:?}", stored.categories);
    assert_eq!(stored, config.grading);
}

#[test]
fn test_orders_and_qualifications_persist() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("orders.db");

    {
        let repo = SqliteRepository::open(&db_path).unwrap();
        let synth = IdentifierSynthesizer::new();
        seed_suppliers(&repo, &SupplierSeeder::new(&synth, today()), 6, &GradingRule::default())
            .unwrap();
        transition_purchase_order(&repo, "PO202510008", PoAction::Receive).unwrap();
        assert_eq!(generate_qualifications(&repo, "S-1002", 4, today()).unwrap(), 4);
    }

    let repo = SqliteRepository::open(&db_path).unwrap();
    assert_eq!(list_purchase_orders(&repo).unwrap().len(), 120);

    let order = get_purchase_order(&repo, "PO202510008").unwrap();
    assert_eq!(order.status, PoStatus::Received);
    assert!((1..=5).contains(&order.items.len()));

    // S-1002 was seeded with 11 certificates
    let quals = load_qualifications(&repo, "S-1002").unwrap();
    assert_eq!(quals.len(), 15);
    assert_eq!(quals[0].id, "Q-S-1002-12");
    assert_eq!(quals[4].id, "Q-S-1002-1");
}
