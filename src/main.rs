use clap::Parser;
use site_report_etl::utils::error::ReportError;
use site_report_etl::utils::{logger, validation::Validate};
use site_report_etl::{CliConfig, LocalStorage, ReportEngine, ReportPipeline};

fn fail(e: &ReportError) -> ! {
    tracing::error!(
        category = ?e.category(),
        severity = ?e.severity(),
        "Report run failed: {}",
        e
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("{}", e.user_friendly_message());
    eprintln!("Suggestion: {}", e.recovery_suggestion());
    std::process::exit(e.exit_code().max(1));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    logger::init_logger(&config.log_format, config.verbose);

    tracing::info!("Starting site-report-etl");
    tracing::debug!(?config, "CLI config");

    if let Err(e) = config.validate() {
        fail(&e);
    }

    let settings = config.classifier_settings();
    tracing::info!(classifier = %settings.describe(), "Classifier selected");
    let classifier = match settings.build() {
        Ok(classifier) => classifier,
        Err(e) => fail(&e),
    };

    let pipeline = ReportPipeline::new(LocalStorage::new("."), config).with_classifier(classifier);
    let engine = ReportEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            println!("Report written to: {}", output_path);
        }
        Err(e) => fail(&e),
    }

    Ok(())
}
