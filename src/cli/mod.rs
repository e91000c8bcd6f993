//! CLI module - Command-line interface for Warden
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Warden - user accounts and token authentication
#[derive(Parser)]
#[command(name = "warden")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C (default)
    #[command(alias = "daemon")]
    Serve,

    /// Write a default config file with a freshly generated signing secret
    Init {
        /// Destination path
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Create an account directly in the database
    #[command(alias = "add-user")]
    CreateUser {
        #[arg(long)]
        full_name: String,

        #[arg(long)]
        username: String,

        /// Read from `WARDEN_PASSWORD` when omitted
        #[arg(long, env = "WARDEN_PASSWORD", hide_env_values = true)]
        password: String,

        #[arg(long, default_value = "Operator")]
        role: String,

        #[arg(long, default_value = "Active")]
        status: String,
    },
}

pub use commands::*;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["warden"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_create_user() {
        let cli = Cli::try_parse_from([
            "warden",
            "create-user",
            "--full-name",
            "Alice Liddell",
            "--username",
            "alice",
            "--password",
            "correctpass",
            "--role",
            "Admin",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::CreateUser {
                username,
                role,
                status,
                ..
            }) => {
                assert_eq!(username, "alice");
                assert_eq!(role, "Admin");
                assert_eq!(status, "Active");
            }
            _ => panic!("expected create-user"),
        }
    }

    #[test]
    fn parses_init_flags() {
        let cli = Cli::try_parse_from(["warden", "init", "--path", "/tmp/w.toml", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Init { force: true, path: Some(_) })
        ));
    }
}
