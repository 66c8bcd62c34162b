//! CLI - Command line interface for the addon
//!
//! # Examples
//!
//! ```bash
//! # Serve the addon (default)
//! onepace-torbox
//! onepace-torbox serve --bind 127.0.0.1:7000
//!
//! # Resolve streams for one episode and print the JSON
//! onepace-torbox resolve pp_onepace:1:1
//! onepace-torbox resolve RO_1
//! ```

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// =============================================================================
// Exit Codes
// =============================================================================

/// Exit codes for CLI operations (semantic for scripting)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// General error
    Error = 1,
    /// Unknown episode or stream id
    NotFound = 2,
    /// Episode known but nothing is cached yet
    NoStreams = 3,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code as u8)
    }
}

// =============================================================================
// Main CLI Structure
// =============================================================================

/// One Pace addon for Stremio, backed by Torbox
///
/// Run without arguments to serve the addon over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "onepace-torbox",
    version,
    about = "Stremio addon serving One Pace episodes through Torbox",
    after_help = "ENVIRONMENT:\n\
                  TORBOX_API_KEY    Torbox API key (streams stay empty without it)\n\
                  PORT              Listen port override\n\
                  RUST_LOG          Tracing filter"
)]
pub struct Cli {
    /// Path to config file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Subcommand to run (omit to serve)
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Subcommand with `serve` as the default
    pub fn command(&self) -> Command {
        self.command
            .clone()
            .unwrap_or(Command::Serve(ServeCmd::default()))
    }
}

// =============================================================================
// Subcommands
// =============================================================================

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the addon over HTTP
    Serve(ServeCmd),

    /// Resolve streams for one episode and print them as JSON
    #[command(visible_alias = "r")]
    Resolve(ResolveCmd),
}

/// Serve the addon
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ServeCmd {
    /// Listen address (host:port), overrides the config file
    #[arg(long, short = 'b')]
    pub bind: Option<String>,
}

/// Resolve one episode against Torbox
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct ResolveCmd {
    /// Stream id: `pp_onepace:<season>:<episode>` or an episode code like `RO_1`
    #[arg(required = true)]
    pub stream_id: String,

    /// Skip reconciliation waits (useful when the torrent is already listed)
    #[arg(long)]
    pub no_wait: bool,
}
