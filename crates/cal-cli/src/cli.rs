//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Calendar event manager.
///
/// Accepts batches of events as JSON and admits them to a shared timeline
/// only when no event overlaps another, either within the batch or against
/// already-stored events.
#[derive(Debug, Parser)]
#[command(name = "cal", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Submit a batch of new events from a JSON payload.
    Add {
        /// Path to a JSON array of events; reads stdin when omitted.
        file: Option<PathBuf>,

        /// Attribute the submission to this user ID.
        #[arg(long)]
        user: Option<i64>,
    },

    /// Rewrite an existing event's title and times from a JSON payload.
    Update {
        /// The event ID.
        id: i64,

        /// Path to a single JSON event; reads stdin when omitted.
        file: Option<PathBuf>,

        /// Attribute the request to this user ID.
        #[arg(long)]
        user: Option<i64>,
    },

    /// Delete an event.
    Delete {
        /// The event ID.
        id: i64,

        /// Attribute the request to this user ID.
        #[arg(long)]
        user: Option<i64>,
    },

    /// List events.
    List(ListArgs),

    /// Show a day's events bucketed by starting hour.
    Today {
        /// Date to look up (YYYY-MM-DD); defaults to today.
        date: Option<String>,

        /// Attribute the request to this user ID.
        #[arg(long)]
        user: Option<i64>,
    },
}

/// Filters for the list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only events starting strictly after this instant (RFC 3339).
    #[arg(long)]
    pub start_from: Option<String>,

    /// Only events starting strictly before this instant (RFC 3339).
    #[arg(long)]
    pub start_to: Option<String>,

    /// Only events ending strictly after this instant (RFC 3339).
    #[arg(long)]
    pub end_from: Option<String>,

    /// Only events ending strictly before this instant (RFC 3339).
    #[arg(long)]
    pub end_to: Option<String>,

    /// Title substring filter.
    #[arg(long)]
    pub title: Option<String>,

    /// 1-based result page.
    #[arg(long)]
    pub page: Option<u32>,

    /// Rows per page (max 1000).
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Attribute the request to this user ID.
    #[arg(long)]
    pub user: Option<i64>,

    /// Output JSONL instead of human-readable lines.
    #[arg(long)]
    pub json: bool,
}
