//! geosync CLI entry point

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use geosync::{
    commands::{
        cmd_init, cmd_serve, cmd_status, cmd_sync, print_status, print_sync_summary, SyncOptions,
    },
    config::Config,
    db::GeoDb,
    error::Result,
};
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "geosync")]
#[command(version, about = "Sync reference geography data and serve it over HTTP", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default config file and create the database
    Init {
        /// Force overwrite existing config
        #[arg(long)]
        force: bool,
    },

    /// Run the HTTP API
    Serve {
        /// Listen port (overrides config)
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Listen address (overrides config)
        #[arg(long)]
        host: Option<String>,
    },

    /// Fetch everything from the upstream API and upsert it
    Sync {
        /// Only re-run the city stage
        #[arg(long)]
        cities_only: bool,

        /// Upstream requests in flight per stage (overrides config)
        #[arg(long)]
        concurrency: Option<usize>,
    },

    /// Show configuration, table sizes and the last sync run
    Status,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    let registry = tracing_subscriber::registry().with(filter);
    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }

    match cli.command {
        Commands::Init { force } => {
            let base_dir = cli
                .config
                .as_deref()
                .and_then(|p| p.parent())
                .map(PathBuf::from);
            let config = cmd_init(base_dir, force).await?;

            println!("✓ geosync initialized successfully");
            println!("  Config: {}", config.paths.config_file.display());
            println!("  Database: {}", config.paths.db_file.display());
            println!("\nNext steps:");
            println!("  1. export {}=<your key>", config.upstream.api_key_env);
            println!("  2. Populate tables: geosync sync");
            println!("  3. Serve them: geosync serve");
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "geosync", &mut std::io::stdout());
        }

        Commands::Serve { port, host } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(port) = port {
                config.server.port = port;
            }
            if let Some(host) = host {
                config.server.host = host;
            }
            let db = GeoDb::connect(&config).await?;
            cmd_serve(&config, db).await?;
        }

        Commands::Sync {
            cities_only,
            concurrency,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(n) = concurrency {
                config.sync.fetch_concurrency = n;
                config.validate()?;
            }
            let db = GeoDb::connect(&config).await?;
            let summary = cmd_sync(&config, &db, SyncOptions { cities_only }).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_sync_summary(&summary);
            }
        }

        Commands::Status => {
            let config = load_config(cli.config.as_deref())?;
            let db = GeoDb::connect(&config).await?;
            let status = cmd_status(&config, &db).await?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                print_status(&status);
            }
        }
    }

    Ok(())
}

/// Load the config file if there is one; otherwise defaults rooted at ~/.geosync
fn load_config(path: Option<&std::path::Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path),
        None => Config::load_from(None),
    }
}
