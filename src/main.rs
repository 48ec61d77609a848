use clap::Parser;
use fluent_pool::utils::error::{ErrorSeverity, PoolError};
use fluent_pool::utils::{logger, validation::Validate};
use fluent_pool::{
    CliConfig, LabwareCatalog, LocalStorage, PlanSummary, PoolEngine, PoolPipeline,
};

fn exit_code(e: &PoolError) -> i32 {
    match e.severity() {
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}

fn report_failure(e: &PoolError) {
    tracing::error!(
        "❌ Pooling failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose);

    tracing::info!("Starting fluent-pool");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let catalog = match LabwareCatalog::with_overrides(config.labware_file.as_deref()) {
        Ok(catalog) => catalog,
        Err(e) => {
            report_failure(&e);
            std::process::exit(exit_code(&e));
        }
    };

    let dry_run = config.dry_run;
    let storage = LocalStorage::new(".".to_string());
    let pipeline = PoolPipeline::with_catalog(storage, config, catalog);
    let engine = PoolEngine::new(pipeline);

    if dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be written");
        match engine.plan().await {
            Ok((input, outcome)) => {
                println!("{}", PlanSummary::new(&input, &outcome).to_json()?);
            }
            Err(e) => {
                report_failure(&e);
                std::process::exit(exit_code(&e));
            }
        }
        return Ok(());
    }

    match engine.run().await {
        Ok(report) => {
            for warning in &report.warnings {
                eprintln!("WARNING: {}", warning);
            }
            tracing::info!("✅ Pooling worklist created");
            for file in &report.files {
                println!("File written: {}", file);
            }
        }
        Err(e) => {
            report_failure(&e);
            std::process::exit(exit_code(&e));
        }
    }

    Ok(())
}
