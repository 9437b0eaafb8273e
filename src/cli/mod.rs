//! CLI module for alumni-sync.
//!
//! - Argument parsing
//! - Version display
//! - Feed and chat commands run against a live [`Engine`]
//!
//! # Usage
//!
//! ```ignore
//! use alumni_sync::cli::{parse_args, run_cli_command};
//!
//! let args = parse_args(std::env::args());
//! run_cli_command(args, SyncConfig::from_env())?;
//! ```

pub mod args;
pub mod commands;
pub mod version;

pub use args::{parse_args, CliArgs, CliCommand, USAGE};
pub use version::{handle_version_command, VERSION};

use std::sync::Arc;

use color_eyre::eyre::eyre;
use color_eyre::Result;

use crate::adapters::{FileKeyValueStore, ReqwestHttpClient};
use crate::app::Engine;
use crate::config::SyncConfig;

/// Build an engine backed by the file store and the real HTTP client.
pub fn build_engine(config: &SyncConfig) -> Result<Engine> {
    let data_dir = config.resolve_data_dir()?;
    let store = FileKeyValueStore::open(&data_dir)?;
    let http = ReqwestHttpClient::with_timeout(config.http_timeout);

    tracing::debug!("Using data directory {}", data_dir.display());
    Ok(Engine::new(config, Arc::new(http), Arc::new(store)))
}

/// Run a parsed command.
pub fn run_cli_command(args: CliArgs, config: SyncConfig) -> Result<()> {
    let config = match args.user_id {
        Some(user_id) => config.with_user_id(user_id),
        None => config,
    };

    match args.command {
        CliCommand::Version => {
            handle_version_command();
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(reason) => {
            return Err(eyre!("{}\n\n{}", reason, USAGE));
        }
        _ => {}
    }

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        let mut engine = build_engine(&config)?;
        let mut out = std::io::stdout().lock();

        match args.command {
            CliCommand::Feed => commands::run_feed(&mut engine, &mut out).await,
            CliCommand::Ack => commands::run_ack(&mut engine, &mut out).await,
            CliCommand::Chat { peer_id } => {
                commands::run_chat(&mut engine, &peer_id, &mut out).await
            }
            CliCommand::Send { peer_id, text } => {
                commands::run_send(&mut engine, &peer_id, &text, &mut out).await
            }
            CliCommand::Unsend {
                peer_id,
                message_id,
            } => commands::run_unsend(&mut engine, &peer_id, &message_id, &mut out).await,
            CliCommand::Version | CliCommand::Help | CliCommand::Invalid(_) => Ok(()),
        }
    })
}
