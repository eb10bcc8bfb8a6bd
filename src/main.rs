use nfenrich::cli::{Cli, Commands, ConfigAction};
use nfenrich::config::{Config, ConfigValidator};
use nfenrich::error::{EnrichError, Result};
use nfenrich::pipeline::Pipeline;

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse_args();

    // Initialize logging
    init_logging(cli.verbose);

    // Handle commands
    match cli.command {
        Commands::Run { capacity, strategy } => {
            cmd_run(cli.config, capacity, strategy)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "nfenrich=debug"
    } else {
        "nfenrich=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logs go to stderr; stdout is reserved for forwarded records
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_run(
    config_path: Option<std::path::PathBuf>,
    capacity: Option<usize>,
    strategy: Option<nfenrich::enrich::DetectorStrategy>,
) -> Result<()> {
    let mut config = load_config(config_path)?;

    if let Some(capacity) = capacity {
        config.enrichment.capacity = capacity;
    }
    if let Some(strategy) = strategy {
        config.enrichment.strategy = strategy;
    }
    ConfigValidator::validate(&config)?;

    tracing::info!(
        strategy = %config.enrichment.strategy,
        capacity = config.enrichment.capacity,
        "starting enrichment pipeline"
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut pipeline = Pipeline::new(&config);
    let stats = pipeline.run(stdin.lock(), &mut stdout.lock())?;

    tracing::info!(
        records = stats.records_in,
        forwarded = stats.forwarded,
        dropped = stats.dropped,
        malformed = stats.malformed,
        "enrichment pipeline stopped"
    );

    Ok(())
}

fn cmd_config(config_path: Option<std::path::PathBuf>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path)?;
            let json = serde_json::to_string_pretty(&config).map_err(|e| EnrichError::Json {
                source: e,
                context: "Failed to serialize config".to_string(),
            })?;
            println!("{}", json);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            // Create parent directory
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| EnrichError::Io {
                    source: e,
                    context: format!("Failed to create config directory: {:?}", parent),
                })?;
            }

            let config = Config::default();
            config.save(&path)?;

            println!("✓ Configuration initialized at: {}", path.display());
        }
        ConfigAction::Validate { file } => {
            let path = match file {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = Config::load(&path)?;
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
            println!("  Strategy: {}", config.enrichment.strategy);
            println!("  Capacity: {}", config.enrichment.capacity);
        }
    }

    Ok(())
}

fn load_config(config_path: Option<std::path::PathBuf>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'nfenrich config init' to create one."
        );
        return Ok(Config::default());
    }

    Config::load(&path)
}
