//! `edudash` - CLI for the school record manager
//!
//! This binary runs the REST API server and provides inspection commands for
//! the student document and configuration.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use edudash::cli::{Cli, Command, ConfigCommand, ServeCommand};
use edudash::{http, init_logging, AppState, Config, JsonFileStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    // Execute the command
    match cli.command {
        Command::Serve(serve_cmd) => handle_serve(config, &serve_cmd).await,
        Command::Status(status_cmd) => handle_status(&config, status_cmd.json).await,
        Command::Config(config_cmd) => handle_config(&config, config_cmd),
    }
}

async fn handle_serve(mut config: Config, cmd: &ServeCommand) -> anyhow::Result<()> {
    cmd.apply_to(&mut config);
    config.validate()?;

    let state = AppState::from_config(&config)
        .await
        .context("preparing student store")?;

    let bind = config.bind_address();
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("binding {bind}"))?;

    info!("School Dashboard API is ready ({} mode)", config.server.env);
    info!("Data stored in: {}", config.data_path().display());

    http::serve(listener, state, http::shutdown_signal()).await?;
    info!("Server stopped");
    Ok(())
}

async fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let store = JsonFileStore::new(config.data_path(), config.storage.seed_on_missing);
    let stats = store.stats().await?;

    if json {
        let status = serde_json::json!({
            "data_path": store.path(),
            "exists": store.path().exists(),
            "total_records": stats.total_records,
            "document_size_bytes": stats.document_size_bytes,
            "bind_address": config.bind_address(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("edudash status");
        println!("--------------");
        println!("Data file:     {}", store.path().display());
        if store.path().exists() {
            println!("Records:       {}", stats.total_records);
            println!("Size:          {} bytes", stats.document_size_bytes);
        } else {
            println!("Records:       (document not created yet)");
        }
        println!("Listen on:     {}", config.bind_address());
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Server]");
                println!("  Host:               {}", config.server.host);
                println!("  Port:               {}", config.server.port);
                println!("  Environment:        {}", config.server.env);
                println!();
                println!("[Storage]");
                println!("  Data path:          {}", config.data_path().display());
                println!("  Seed on missing:    {}", config.storage.seed_on_missing);
                println!();
                println!("[CORS]");
                println!(
                    "  Allowed origins:    {}",
                    config.cors.allowed_origins.join(", ")
                );
                println!("  Credentials:        {}", config.cors.allow_credentials);
                println!();
                println!("[Validation]");
                println!("  Enforce:            {}", config.validation.enforce);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
