use bird_explorer::config::toml_config::TomlConfig;
use bird_explorer::core::query;
use bird_explorer::domain::ports::ConfigProvider;
use bird_explorer::utils::{logger, validation::Validate};
use bird_explorer::{ExplorerEngine, LocalStorage, SelectPipeline};
use clap::Parser;

#[derive(Parser)]
#[command(name = "toml-explorer")]
#[command(about = "Bird selector renderer with TOML configuration support")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "explorer-config.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Dry run - show what would be fetched and written without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based bird selector renderer");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    // 顯示配置摘要
    display_config_summary(&config);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No request will be issued");
        perform_dry_run(&config)?;
        return Ok(());
    }

    // 決定監控設定
    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = SelectPipeline::new(storage, config);
    let engine = ExplorerEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Bird selector rendered successfully!");
            println!("✅ Bird selector rendered successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Render process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            let exit_code = match e.severity() {
                bird_explorer::utils::error::ErrorSeverity::Low => 0,
                bird_explorer::utils::error::ErrorSeverity::Medium => 2,
                bird_explorer::utils::error::ErrorSeverity::High => 1,
                bird_explorer::utils::error::ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig) {
    tracing::info!("📋 Pipeline: {} v{}", config.pipeline.name, config.pipeline.version);
    tracing::info!("🌐 Endpoint: {}", config.api_endpoint());
    tracing::info!("🎯 Container: #{}", config.container_id());
    tracing::info!("📁 Output path: {}", config.output_path());
    tracing::info!("📄 Formats: {}", config.output_formats().join(", "));
}

fn perform_dry_run(config: &TomlConfig) -> bird_explorer::Result<()> {
    // 只建立 URL，不發出請求
    let url = query::sql_api_url(config.api_endpoint())?;
    tracing::info!("Would issue: GET {}", url);
    tracing::info!("Would append rendered groups to: #{}", config.container_id());
    for format in config.output_formats() {
        tracing::info!("Would write output format: {}", format);
    }
    Ok(())
}
