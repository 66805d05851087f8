//! Command-line configuration.

use std::{num::NonZeroUsize, path::PathBuf};

use chatsphere_app::RuntimeConfig;
use chatsphere_core::SessionConfig;
use clap::Parser;

/// Endpoint name shown when running against the in-process service.
pub const LOCAL_ENDPOINT: &str = "mem://local";

/// Chatsphere terminal client
#[derive(Parser, Debug, Clone)]
#[command(name = "chatsphere")]
#[command(about = "Terminal client for Chatsphere chat rooms")]
#[command(version)]
pub struct Args {
    /// WebSocket endpoint of the coordination service (ws://host:port)
    ///
    /// If not provided, runs against an in-process service.
    #[arg(short, long)]
    pub server: Option<String>,

    /// Username used when `/join` is given only a room
    #[arg(short, long)]
    pub username: Option<String>,

    /// Keep at most this many messages in the room log
    #[arg(long)]
    pub history: Option<NonZeroUsize>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes
    /// precedence.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Write logs to this file. Without it, nothing is logged: the terminal
    /// belongs to the UI.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Seed for the in-process service's room codes
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Args {
    /// True if no remote service was given.
    pub fn is_local(&self) -> bool {
        self.server.is_none()
    }

    /// Runtime settings derived from the arguments.
    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            endpoint: self.server.clone().unwrap_or_else(|| LOCAL_ENDPOINT.to_string()),
            session: SessionConfig { log_capacity: self.history },
            username: self.username.clone(),
        }
    }
}
