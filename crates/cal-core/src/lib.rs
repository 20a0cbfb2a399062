//! Core domain logic for the calendar.
//!
//! This crate contains the fundamental types and logic for:
//! - Intervals: half-open UTC time ranges and their overlap test
//! - Events: validated calendar entries with an optional owner
//! - Validation: the staged batch pipeline that admits or rejects
//!   submissions as a whole, checking candidates against each other and
//!   against the durable store

mod error;
mod event;
mod interval;
mod overlap;
mod pipeline;
mod types;

pub use error::{FieldError, FieldViolation, OverlapError, Rejection, StoreError};
pub use event::{Event, EventDraft};
pub use interval::{Interval, InvalidInterval};
pub use overlap::check_local_overlaps;
pub use pipeline::{EventStore, PERSIST_CHECK_GROUP, SubmissionService, check_persisted_overlaps};
pub use types::{EventId, IdError, Owner, UserId};
