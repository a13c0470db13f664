//! IssueLens - issue-tracker export analytics
//!
//! A CLI tool that loads a JSON export of issues and produces
//! contributor, latency, label and text-content reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (unreadable input, invalid config, strict-mode rejection, etc.)

mod analysis;
mod cli;
mod config;
mod context;
mod data;
mod models;
mod report;

use analysis::sentiment::LexiconScorer;
use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use context::AnalysisContext;
use data::LoadOptions;
use report::{Report, ReportMetadata, SectionBody};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Load configuration before logging so `general.verbose` can raise the level
    let (mut config, config_source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    init_logging(args.log_level(config.general.verbose));

    info!("IssueLens v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_source {
        Some(path) => info!("Loaded config from {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    match run(args, config) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .issuelens.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the input path, output format, and more.");
    Ok(())
}

/// Initialize logging at the given level.
fn init_logging(level: tracing::Level) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the selected analysis and write the report. Returns the exit code.
fn run(args: Args, config: Config) -> Result<i32> {
    let start_time = Instant::now();

    // Step 1: Load the corpus
    let source = config.data.path.clone();
    println!("📥 Loading issues: {}", source.display());

    let options = LoadOptions {
        strict: config.data.strict,
        show_progress: !args.quiet && !args.no_progress,
    };
    let corpus = data::load_corpus(&source, &options)?;
    let record_count = corpus.record_count();

    // Step 2: Apply filters
    let filter = args.issue_filter();
    let ctx = AnalysisContext::new(config, source, corpus, filter);

    println!(
        "   {} records, {} issues loaded, {} rejected",
        record_count,
        ctx.loaded_count(),
        ctx.rejected().len()
    );
    if !ctx.filter().is_empty() {
        println!(
            "   {} issues match filters: {}",
            ctx.issues().len(),
            ctx.filter().describe().join(", ")
        );
    }
    if ctx.issues().is_empty() {
        warn!("No issues to analyze; the report will contain empty sections");
    }

    // Step 3: Run the analyses
    println!("\n🔬 {}...", args.feature.running_message());
    let scorer = LexiconScorer::default();
    let features =
        analysis::run_feature(args.feature, &ctx, &scorer, args.contributor.as_deref());

    if let Some(ref name) = args.contributor {
        print_contributor(name, &features);
    }

    // Step 4: Build and save the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let report = Report {
        metadata: ReportMetadata::from_context(&ctx, args.feature.title(), duration),
        features,
    };

    let format = ctx.config().general.format;
    let output = match format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &ctx.config().report),
    };

    let output_path = output_path(&args, ctx.config());
    report::write_report(&output_path, &output)?;

    // Print summary
    println!("\n📊 Analysis Summary:");
    println!("   Issues analyzed: {}", ctx.issues().len());
    for feature in &report.features {
        println!(
            "   - {}: {} sections, {} charts",
            feature.title,
            feature.sections.len(),
            feature.charts.len()
        );
    }
    println!("   Duration: {:.1}s", duration);
    println!(
        "\n✅ Analysis complete! Report saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Explicit --output, or the feature's default name in the output directory.
fn output_path(args: &Args, config: &Config) -> PathBuf {
    match args.output {
        Some(ref path) => path.clone(),
        None => config.general.output_dir.join(format!(
            "{}.{}",
            args.feature.file_stem(),
            config.general.format.extension()
        )),
    }
}

/// Echo the contributor summary to the terminal.
fn print_contributor(name: &str, features: &[report::FeatureReport]) {
    let section = features
        .iter()
        .find_map(|f| f.find("Contributor Summary"));

    match section {
        Some(SectionBody::Contributor { login, summary }) => {
            println!("\n👤 {}: {} active issues", login, summary.active_issues);
            for (kind, count) in &summary.issue_type_distribution {
                println!("   - {}: {}", kind, count);
            }
        }
        _ => println!("\n👤 No data found for contributor '{}'", name),
    }
}

/// Load configuration from file or use defaults, along with the file it
/// came from. Runs before logging is set up, so problems go to stderr.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, Some(PathBuf::from(DEFAULT_CONFIG_FILE)))),
        Ok(None) => Ok((Config::default(), None)),
        Err(e) => {
            eprintln!("⚠️  Failed to load {}: {:#}", DEFAULT_CONFIG_FILE, e);
            Ok((Config::default(), None))
        }
    }
}
