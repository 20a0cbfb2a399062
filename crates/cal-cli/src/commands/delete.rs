//! Delete command.

use anyhow::{Context, Result};

use cal_core::{EventId, Owner, Rejection, SubmissionService};
use cal_db::Database;

/// Deletes one event, subject to the ownership check.
pub fn run(db: Database, id: i64, requester: Owner) -> Result<()> {
    let id = EventId::new(id).context("invalid event ID")?;

    let existing = db.fetch_one(id)?.ok_or(Rejection::NotFound)?;
    let mut service = SubmissionService::new(db);
    service.submit_delete(&existing, requester)?;

    println!("deleted event {id}");
    Ok(())
}
