//! Update command: rewrite one event's title and times.

use anyhow::{Context, Result};

use cal_core::{EventDraft, EventId, Owner, Rejection, SubmissionService};
use cal_db::Database;

/// Applies a single-event payload to an existing event.
///
/// A target that does not exist and a target owned by someone else both
/// report the same not-found rejection.
pub fn run(db: Database, id: i64, payload: &str, requester: Owner) -> Result<()> {
    let draft: EventDraft =
        serde_json::from_str(payload).context("failed to deserialize event payload")?;
    let id = EventId::new(id).context("invalid event ID")?;

    let existing = db.fetch_one(id)?.ok_or(Rejection::NotFound)?;
    let mut service = SubmissionService::new(db);
    let updated = service.submit_update(existing, &draft, requester)?;

    println!("{}", serde_json::to_string(&updated)?);
    Ok(())
}
