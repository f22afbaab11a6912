// SPDX-FileCopyrightText: 2026 GuestPulse Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! GuestPulse - hotel guest feedback and timed voting sessions.
//!
//! This is the binary entry point: the HTTP server plus the operator
//! commands that work directly against the database.

mod backup;
mod doctor;
mod export;
mod qr;
mod serve;
mod user;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use guestpulse_config::GuestPulseConfig;
use guestpulse_core::GuestPulseError;

/// GuestPulse - hotel guest feedback and timed voting sessions.
#[derive(Parser, Debug)]
#[command(name = "guestpulse", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Run diagnostic checks.
    Doctor {
        /// Disable colored output.
        #[arg(long)]
        plain: bool,
    },
    /// Copy the database to a file.
    Backup {
        /// Destination file.
        path: PathBuf,
    },
    /// Replace the database with a backup, keeping the current one as `<db>.pre-restore`.
    Restore {
        /// Backup file to restore from.
        path: PathBuf,
    },
    /// Manage operator accounts.
    User {
        #[command(subcommand)]
        action: UserCommand,
    },
    /// Write every review as CSV.
    Export {
        /// Output file. Defaults to the dated export name in the current directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the voting link and a QR code for a session slug.
    Qr {
        /// The session's link slug.
        slug: String,
    },
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    /// List every account.
    List,
    /// Create an account.
    Create {
        username: String,
        /// `admin` or `superadmin`.
        #[arg(long, default_value = "admin")]
        role: String,
        /// Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Set a new password for an account.
    ResetPassword {
        username: String,
        /// Prompted for when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Block an account from signing in.
    Deactivate { username: String },
    /// Allow a deactivated account to sign in again.
    Activate { username: String },
}

fn load_config(path: Option<&PathBuf>) -> GuestPulseConfig {
    let loaded = match path {
        Some(path) => guestpulse_config::load_and_validate_path(path),
        None => guestpulse_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            guestpulse_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli, config: GuestPulseConfig) -> Result<(), GuestPulseError> {
    match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Doctor { plain }) => doctor::run_doctor(&config, plain).await,
        Some(Commands::Backup { path }) => {
            backup::run_backup(&config.storage.database_path, &path.to_string_lossy())
        }
        Some(Commands::Restore { path }) => {
            backup::run_restore(&config.storage.database_path, &path.to_string_lossy())
        }
        Some(Commands::User { action }) => match action {
            UserCommand::List => user::run_list(&config).await,
            UserCommand::Create {
                username,
                role,
                password,
            } => user::run_create(&config, &username, &role, password).await,
            UserCommand::ResetPassword { username, password } => {
                user::run_reset_password(&config, &username, password).await
            }
            UserCommand::Deactivate { username } => {
                user::run_set_active(&config, &username, false).await
            }
            UserCommand::Activate { username } => {
                user::run_set_active(&config, &username, true).await
            }
        },
        Some(Commands::Export { output }) => export::run_export(&config, output).await,
        Some(Commands::Qr { slug }) => qr::run_qr(&config, &slug).await,
        None => {
            println!("guestpulse: use --help for available commands");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref());

    if let Err(e) = run(cli, config).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = guestpulse_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.server.port, GuestPulseConfig::default().server.port);
    }

    #[test]
    fn cli_parses_user_create() {
        let cli = Cli::try_parse_from([
            "guestpulse",
            "user",
            "create",
            "frontdesk",
            "--role",
            "superadmin",
            "--password",
            "s3cret",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::User {
                action:
                    UserCommand::Create {
                        username,
                        role,
                        password,
                    },
            }) => {
                assert_eq!(username, "frontdesk");
                assert_eq!(role, "superadmin");
                assert_eq!(password.as_deref(), Some("s3cret"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli =
            Cli::try_parse_from(["guestpulse", "doctor", "--plain", "--config", "/tmp/g.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/g.toml")));
        assert!(matches!(cli.command, Some(Commands::Doctor { plain: true })));
    }

    #[test]
    fn export_output_is_optional() {
        let cli = Cli::try_parse_from(["guestpulse", "export"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Export { output: None })));
    }
}
