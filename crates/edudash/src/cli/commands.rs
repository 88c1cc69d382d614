//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Serve command arguments.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Host to bind (overrides `server.host`)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind (overrides `server.port`)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl ServeCommand {
    /// Apply command-line overrides to a loaded configuration.
    pub fn apply_to(&self, config: &mut crate::Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_overrides_apply() {
        let mut config = crate::Config::default();
        let cmd = ServeCommand {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
        };
        cmd.apply_to(&mut config);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_serve_without_overrides_keeps_config() {
        let mut config = crate::Config::default();
        ServeCommand {
            host: None,
            port: None,
        }
        .apply_to(&mut config);

        assert_eq!(config, crate::Config::default());
    }

    #[test]
    fn test_config_command_debug() {
        let cmd = ConfigCommand::Show { json: false };
        let debug_str = format!("{cmd:?}");
        assert!(debug_str.contains("Show"));
    }
}
