//! Calendar CLI library.
//!
//! This crate provides the CLI interface for the calendar.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, ListArgs};
pub use config::Config;
