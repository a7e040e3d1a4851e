use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use xcontrol_application::AppServices;
use xcontrol_core::cms::HOME_PAGE;
use xcontrol_infrastructure::{ConfigService, ProcessEnv, RuntimeConfigService, XControlPaths};
use xcontrol_server::logging::init_logging;
use xcontrol_server::HttpServer;

#[derive(Parser)]
#[command(name = "xcontrol")]
#[command(about = "XControl - dashboard backend", long_about = None)]
struct Cli {
    /// Configuration file (defaults to XCONTROL_CONFIG, ./xcontrol.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Listen address, overriding `[server] bind`
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the resolved configuration, runtime endpoints and CMS selection
    Inspect,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env = Arc::new(ProcessEnv);
    let config_path = XControlPaths::config_file(cli.config.as_deref(), env.as_ref());
    let config_service = ConfigService::new(config_path.clone(), env.clone());
    let config = config_service
        .get_config()
        .await
        .context("failed to load configuration")?;

    init_logging(Some(config.logging.level.as_str()));
    match &config_path {
        Some(path) => tracing::info!("Configuration loaded from {}", path.display()),
        None => tracing::info!("No configuration file found, using defaults"),
    }

    match cli.command {
        Commands::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| config.server.bind.clone());
            let services = Arc::new(AppServices::from_config(config));
            let server = HttpServer::bind(&addr, services)
                .await
                .with_context(|| format!("failed to bind {}", addr))?;

            tokio::select! {
                result = server.run() => result?,
                _ = tokio::signal::ctrl_c() => tracing::info!("Shutting down"),
            }
        }
        Commands::Inspect => {
            let runtime = RuntimeConfigService::new(XControlPaths::runtime_config_dir(
                config_path.as_deref(),
            ))
            .load_for_env(env.as_ref())
            .await?;
            let services = AppServices::from_config(config.clone());
            let report = json!({
                "configPath": config_path.as_ref().map(|path| path.display().to_string()),
                "config": config,
                "runtime": runtime,
                "cms": services.cms.overview(HOME_PAGE, false),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
