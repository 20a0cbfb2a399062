//! Validation error shapes and the submission rejection taxonomy.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::event::Event;

/// A single field invariant violation on one event.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FieldViolation {
    #[error("title must not be blank")]
    BlankTitle,

    #[error("end {end} must be after start {start}")]
    EndNotAfterStart {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// All field violations for one event in a submitted batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Position of the offending event in the submitted batch.
    pub index: usize,
    /// The submitted title, which may itself be the offending field.
    pub title: String,
    pub violations: Vec<FieldViolation>,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event[{}] \"{}\": ", self.index, self.title)?;
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldError {}

/// A candidate event conflicting with another event's interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlapError {
    /// The candidate that was refused.
    pub event: Event,
    /// The first event it was found to conflict with.
    pub conflicting: Event,
}

impl fmt::Display for OverlapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "event {} overlaps {}",
            render_event(&self.event),
            render_event(&self.conflicting)
        )
    }
}

impl std::error::Error for OverlapError {}

fn render_event(event: &Event) -> String {
    let bounds = format!(
        "{} - {}",
        event.start().format("%Y-%m-%d %H:%M:%S"),
        event.end().format("%Y-%m-%d %H:%M:%S")
    );
    match event.id() {
        Some(id) => format!("\"{}\" [{id}] ({bounds})", event.title()),
        None => format!("\"{}\" ({bounds})", event.title()),
    }
}

/// The durable-store collaborator itself failed.
///
/// This is the one rejection class where a caller-level retry is
/// appropriate: no semantic rejection occurred.
#[derive(Debug, Error)]
#[error("store failure: {source}")]
pub struct StoreError {
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl StoreError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Why a submission was rejected.
///
/// Each variant carries exactly the payload needed to render its message.
/// Stages never mix: a batch rejection reports the first failing stage
/// only, with every offending event within that stage listed.
#[derive(Debug)]
pub enum Rejection {
    /// One or more events violate field invariants.
    Field(Vec<FieldError>),
    /// A candidate overlaps another candidate in the same batch.
    LocalOverlap(Vec<OverlapError>),
    /// A candidate overlaps a previously committed event.
    PersistedOverlap {
        errors: Vec<OverlapError>,
        /// 0-based index of the check group that contained the conflict.
        group: usize,
        /// First candidate index covered by the group.
        group_start: usize,
        /// Last candidate index covered by the group.
        group_end: usize,
    },
    /// Update/delete target missing, or not owned by the requester.
    /// Deliberately indistinguishable from "does not exist".
    NotFound,
    /// The store collaborator failed; retryable.
    Store(StoreError),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(errors) => {
                write!(f, "validation failed:")?;
                for error in errors {
                    write!(f, "\n{error}")?;
                }
                Ok(())
            }
            Self::LocalOverlap(errors) => {
                write!(f, "overlapping events in submission:")?;
                for error in errors {
                    write!(f, "\n{error}")?;
                }
                Ok(())
            }
            Self::PersistedOverlap {
                errors,
                group,
                group_start,
                group_end,
            } => {
                write!(
                    f,
                    "overlapping events detected in group {group} (events {group_start}-{group_end}):"
                )?;
                for error in errors {
                    write!(f, "\n{error}")?;
                }
                Ok(())
            }
            Self::NotFound => write!(f, "event not found"),
            Self::Store(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for Rejection {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(error) => Some(error),
            _ => None,
        }
    }
}

impl From<StoreError> for Rejection {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}
