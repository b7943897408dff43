use clap::Parser;
use site_report_etl::config::toml_config::TomlConfig;
use site_report_etl::core::ConfigProvider;
use site_report_etl::utils::{logger, validation::Validate};
use site_report_etl::{normalize_report, LocalStorage, ReportEngine, ReportPipeline};

#[derive(Parser)]
#[command(name = "toml-report")]
#[command(about = "Site report run configured by a TOML file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "report-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the input file from the config
    #[arg(long)]
    input: Option<String>,

    /// Dry run - classify the input and print the sections without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config file '{}': {}", args.config, e);
            eprintln!("Make sure the file exists and is valid TOML");
            std::process::exit(1);
        }
    };

    logger::init_logger(config.log_format(), args.verbose || config.verbose_logging());
    tracing::info!(config = %args.config, "Loaded configuration");

    if let Some(input) = args.input.clone() {
        tracing::info!(input = %input, "Input overridden from command line");
        config.input.path = input;
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        tracing::error!("Suggestion: {}", e.recovery_suggestion());
        eprintln!("{}", e.user_friendly_message());
        std::process::exit(e.exit_code().max(1));
    }

    let settings = config.classifier_settings()?;
    display_config_summary(&config, &settings.describe(), args.dry_run);

    if args.dry_run {
        perform_dry_run(&config).await?;
        return Ok(());
    }

    let pipeline = ReportPipeline::new(LocalStorage::new("."), config).with_classifier(settings.build()?);
    let engine = ReportEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("Report written to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                category = ?e.category(),
                severity = ?e.severity(),
                "Report run failed: {}",
                e
            );
            eprintln!("{}", e.user_friendly_message());
            eprintln!("Suggestion: {}", e.recovery_suggestion());
            std::process::exit(e.exit_code().max(1));
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, classifier: &str, dry_run: bool) {
    println!("Configuration Summary:");
    match &config.report.version {
        Some(version) => println!("  Report: {} v{}", config.report.name, version),
        None => println!("  Report: {}", config.report.name),
    }
    if let Some(description) = &config.report.description {
        println!("  Description: {}", description);
    }
    println!("  Input: {}", config.input_path());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", config.output_formats().join(", "));
    println!("  Classifier: {}", classifier);
    if dry_run {
        println!("  DRY RUN MODE ENABLED");
    }
    println!();
}

/// Runs the rule-based normalizer only; the classifier is not called.
async fn perform_dry_run(config: &TomlConfig) -> Result<(), Box<dyn std::error::Error>> {
    let content = tokio::fs::read_to_string(config.input_path()).await?;
    let lines: Vec<&str> = content.lines().filter(|l| !l.trim().is_empty()).collect();
    let sections = normalize_report(&lines, None);

    println!("Dry Run ({} lines):", lines.len());
    for (title, items) in [
        ("Leistungen", &sections.leistungen),
        ("Arbeitskräfte", &sections.arbeitskraefte),
        ("Material", &sections.material),
    ] {
        println!("  {} ({}):", title, items.len());
        for item in items {
            println!("    - {}", item);
        }
    }

    let workers = sections.workers();
    if !workers.is_empty() {
        println!("  Stunden:");
        for worker in workers {
            let hours = if worker.has_hours {
                format!("{}h", worker.hours)
            } else {
                "-".to_string()
            };
            println!("    {} {}", worker.name, hours);
        }
    }

    Ok(())
}
