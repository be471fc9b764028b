use clap::Parser;
use jdk_switcher_setup::utils::{logger, validation::Validate};
use jdk_switcher_setup::{CliConfig, LocalStorage, ProvisionEngine, RunReport, SetupError, SwitcherPipeline};

#[tokio::main]
async fn main() {
    let mut config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting jdk-switcher-setup");

    if let Err(e) = config.load_config_file().and_then(|_| config.validate()) {
        fail(&e, "❌ Configuration validation failed");
    }
    tracing::debug!("Effective config: {:?}", config);

    let dry_run = config.dry_run;
    let json = config.json;

    let storage = LocalStorage::new(".");
    let pipeline = SwitcherPipeline::new(storage, config);
    let engine = ProvisionEngine::new(pipeline);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be written");
        match engine.preview().await {
            Ok(script) => print!("{}", script.content),
            Err(e) => fail(&e, "❌ Dry run failed"),
        }
        return;
    }

    match engine.run().await {
        Ok(report) => {
            tracing::info!("✅ jdk_switcher setup completed successfully!");
            if json {
                if let Err(e) = print_json(&report) {
                    fail(&e, "❌ Could not serialize report");
                }
            } else {
                println!("✅ jdk_switcher setup completed successfully!");
                println!("📁 Output saved to: {}", report.output_path.display());
            }
        }
        Err(e) => fail(&e, "❌ jdk_switcher setup failed"),
    }
}

fn print_json(report: &RunReport) -> Result<(), SetupError> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn fail(e: &SetupError, context: &str) -> ! {
    tracing::error!(
        "{}: {} (Category: {:?}, Severity: {:?})",
        context,
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.severity().exit_code());
}
