use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use srm_synth::workflows::{
    generate_qualifications, get_purchase_order, grade_suppliers, load_grading_rule,
    seed_suppliers, submit_preprocess, transition_purchase_order,
};
use srm_synth::{
    AttributeSynthesizer, EngineConfig, ImportPipeline, PoAction, RawTable, ScoringEngine,
    SqliteRepository, SupplierSeeder,
};

#[derive(Parser)]
#[command(name = "srm-synth", version, about = "Deterministic supplier data, grading and import cleansing")]
struct Cli {
    /// Engine config (JSON)
    #[arg(long, env = "SRM_SYNTH_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, default_value = "srm.db")]
    db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Seed suppliers, qualifications, purchase orders and the grading rule
    Seed {
        /// Overrides seedCount from the config
        #[arg(long)]
        count: Option<usize>,
    },
    /// Grade every stored supplier with the stored rule (config rule if none)
    Grade,
    /// Show a purchase order, optionally applying submit / receive / reconcile first
    Order {
        po_no: String,
        #[arg(long)]
        action: Option<PoAction>,
    },
    /// Prepend generated qualifications to a supplier's list
    Qualify {
        supplier_id: String,
        #[arg(long, default_value_t = 50)]
        count: usize,
    },
    /// Cleanse and deduplicate a CSV import, then store it as the latest batch
    Preprocess {
        input: PathBuf,

        /// Write cleansed rows to this CSV file
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the registration identifier for a seed
    Identifier {
        seed: String,
        #[arg(long, default_value = "济南市")]
        city: String,
    },
    /// Print the bank account for a seed
    Account {
        seed: String,
        #[arg(long, default_value = "济南市")]
        city: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("srm_synth=info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Command::Seed { count } => run_seed(&cli.db, &config, count),
        Command::Grade => run_grade(&cli.db, &config),
        Command::Order { po_no, action } => run_order(&cli.db, &po_no, action),
        Command::Qualify { supplier_id, count } => {
            let repo = open_repo(&cli.db)?;
            let added = generate_qualifications(&repo, &supplier_id, count, Local::now().date_naive())?;
            println!("✓ Added {} qualifications for {}", added, supplier_id);
            Ok(())
        }
        Command::Preprocess { input, out } => run_preprocess(&cli.db, &config, &input, out),
        Command::Identifier { seed, city } => {
            println!("{}", config.identifier_synthesizer().synthesize_identifier(&seed, &city));
            Ok(())
        }
        Command::Account { seed, city } => {
            let account = config.identifier_synthesizer().synthesize_account_number(&seed, &city);
            println!("{}", serde_json::to_string_pretty(&account)?);
            Ok(())
        }
    }
}

fn open_repo(path: &Path) -> Result<SqliteRepository> {
    SqliteRepository::open(path).with_context(|| format!("Failed to open database: {}", path.display()))
}

fn run_seed(db: &Path, config: &EngineConfig, count: Option<usize>) -> Result<()> {
    let repo = open_repo(db)?;
    let synth = config.identifier_synthesizer();
    let seeder = SupplierSeeder::new(&synth, Local::now().date_naive());

    let written = seed_suppliers(
        &repo,
        &seeder,
        count.unwrap_or(config.seed_count),
        &config.grading,
    )?;
    if written == 0 {
        println!("Database already seeded: {}", db.display());
    } else {
        println!("✓ Seeded {} suppliers into {}", written, db.display());
    }
    Ok(())
}

fn run_grade(db: &Path, config: &EngineConfig) -> Result<()> {
    let repo = open_repo(db)?;
    let engine = ScoringEngine::new(load_grading_rule(&repo, &config.grading)?);
    let graded = grade_suppliers(&repo, &engine, &AttributeSynthesizer::new())?;

    for g in &graded {
        println!("{}\t{}\t{:.2}\t{}", g.supplier_id, g.supplier_name, g.total_score, g.category);
    }

    let grades: Vec<_> = graded.iter().map(|g| g.grade()).collect();
    println!("\n{}", engine.summarize(&grades).summary());
    Ok(())
}

fn run_order(db: &Path, po_no: &str, action: Option<PoAction>) -> Result<()> {
    let repo = open_repo(db)?;
    if let Some(action) = action {
        let order = transition_purchase_order(&repo, po_no, action)?;
        println!("✓ {} is now {}", order.po_no, order.status);
    }
    let order = get_purchase_order(&repo, po_no)?;
    println!("{}", serde_json::to_string_pretty(&order)?);
    Ok(())
}

fn run_preprocess(db: &Path, config: &EngineConfig, input: &Path, out: Option<PathBuf>) -> Result<()> {
    let table = RawTable::from_csv_path(input)?;
    let pipeline = ImportPipeline::for_table(&table, config.cleansing.clone());
    let report = pipeline.run(&table);
    println!("{}", report.summary());

    for issue in &report.issues {
        println!("  row {} {}: {}", issue.row + 1, issue.field, issue.issue);
    }

    if let Some(path) = out {
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        for row in report.to_table() {
            writer.write_record(&row)?;
        }
        writer.flush()?;
        println!("✓ Wrote {} rows to {}", report.rows.len(), path.display());
    }

    let repo = open_repo(db)?;
    submit_preprocess(&repo, pipeline.mapping(), pipeline.config(), &report)?;
    Ok(())
}
