//! Add command: submit a batch of new events.

use anyhow::{Context, Result};

use cal_core::{EventDraft, Owner, SubmissionService};
use cal_db::Database;

/// Deserializes the payload and runs the full validation pipeline.
///
/// The whole batch is admitted or rejected: on success the committed
/// events are printed as JSON, on rejection the structured reason
/// propagates and the process exits non-zero.
pub fn run(db: Database, payload: &str, requester: Owner) -> Result<()> {
    let drafts: Vec<EventDraft> =
        serde_json::from_str(payload).context("failed to deserialize event payload")?;
    tracing::debug!(batch = drafts.len(), %requester, "submitting batch");

    let mut service = SubmissionService::new(db);
    let committed = service.submit_create(&drafts, requester)?;

    println!("{}", serde_json::to_string(&committed)?);
    Ok(())
}
