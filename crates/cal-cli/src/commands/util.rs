//! Shared helpers for command implementations.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use cal_core::{Owner, UserId};

/// Reads a JSON payload from a file, or stdin when no path (or `-`) is given.
pub fn read_payload(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path.as_os_str() != "-" => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut payload = String::new();
            std::io::stdin()
                .read_to_string(&mut payload)
                .context("failed to read stdin")?;
            Ok(payload)
        }
    }
}

/// Resolves the `--user` flag into an owner scope.
///
/// No flag means the request is unattributed and operates on the global
/// timeline.
pub fn resolve_owner(user: Option<i64>) -> Result<Owner> {
    match user {
        None => Ok(Owner::Global),
        Some(id) => {
            let id = UserId::new(id).context("invalid --user")?;
            Ok(Owner::User(id))
        }
    }
}

/// Parses an optional RFC 3339 timestamp flag.
pub fn parse_timestamp(s: Option<&str>, name: &str) -> Result<Option<DateTime<Utc>>> {
    match s {
        None => Ok(None),
        Some(s) => {
            let dt = DateTime::parse_from_rfc3339(s).with_context(|| {
                format!(
                    "invalid --{name} timestamp, expected ISO 8601 (e.g., 2025-01-29T12:00:00Z)"
                )
            })?;
            Ok(Some(dt.with_timezone(&Utc)))
        }
    }
}
