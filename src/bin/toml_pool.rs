use anyhow::Context;
use clap::Parser;
use fluent_pool::config::toml_config::TomlConfig;
use fluent_pool::core::ConfigProvider;
use fluent_pool::utils::{logger, validation::Validate};
use fluent_pool::{LabwareCatalog, LocalStorage, PlanSummary, PoolEngine, PoolPipeline};

#[derive(Parser)]
#[command(name = "toml-pool")]
#[command(about = "Pooling worklist generator driven by a TOML configuration")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "pool-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the per-sample volume from config
    #[arg(long)]
    volume: Option<f64>,

    /// Override the new-tips setting from config
    #[arg(long)]
    new_tips: Option<bool>,

    /// Dry run - print the plan without writing files
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based pooling tool");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    let mut config = TomlConfig::from_file(&args.config)
        .with_context(|| format!("Failed to load config file '{}'", args.config))?;

    // 應用命令列覆蓋設定
    if let Some(volume) = args.volume {
        config.pooling.volume = Some(volume);
        tracing::info!("🔧 Volume overridden to: {}", volume);
    }
    if let Some(new_tips) = args.new_tips {
        config.pooling.new_tips = Some(new_tips);
        tracing::info!("🔧 New tips overridden to: {}", new_tips);
    }

    if let Err(e) = config.validate() {
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        return Err(e).context("Configuration validation failed");
    }

    if !args.dry_run {
        display_config_summary(&config);
    }

    let catalog = LabwareCatalog::with_overrides(config.labware_file())
        .context("Failed to load labware definitions")?;
    let storage = LocalStorage::new(".".to_string());
    let pipeline = PoolPipeline::with_catalog(storage, config, catalog);
    let engine = PoolEngine::new(pipeline);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - no files will be written");
        let (input, outcome) = engine.plan().await.context("Pooling plan failed")?;
        println!("{}", PlanSummary::new(&input, &outcome).to_json()?);
        return Ok(());
    }

    let report = engine.run().await.context("Pooling run failed")?;
    for warning in &report.warnings {
        eprintln!("WARNING: {}", warning);
    }
    for file in &report.files {
        println!("File written: {}", file);
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    let settings = config.pool_settings();
    println!("📋 Configuration Summary:");
    println!("  Run: {}", config.run_name());
    println!("  Sample files: {}", config.sample_files().join(", "));
    if let Some(map_file) = config.map_file() {
        println!("  Mapping file: {}", map_file);
    }
    println!(
        "  Volume: {} ul ({})",
        settings.volume, settings.liquid_class
    );
    println!("  New tips between replicates: {}", settings.new_tips_between_replicates);
    println!(
        "  Destination: {} [{}] from well {}",
        settings.destination_labware_name,
        settings.destination_labware_type,
        settings.destination_start_offset
    );
    println!("  Output prefix: {}", config.output_prefix());
    println!();
}
