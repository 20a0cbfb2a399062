//! Staged batch validation and submission.
//!
//! Stages run cheap-to-expensive: structural validation, then in-memory
//! pairwise overlap checks, then store-backed overlap checks, then the
//! transactional commit. A failing stage rejects the whole batch and no
//! later stage runs.

use crate::error::{FieldError, OverlapError, Rejection, StoreError};
use crate::event::{Event, EventDraft};
use crate::interval::Interval;
use crate::overlap::check_local_overlaps;
use crate::types::{EventId, Owner};

/// Candidates per persisted-overlap check group.
///
/// Large batches are partitioned so a single submission cannot drive an
/// unbounded run of store queries before its first conflict surfaces.
pub const PERSIST_CHECK_GROUP: usize = 100;

/// The durable-store collaborator contract.
///
/// Kept as an explicit interface boundary so batching behavior is visible
/// and the store can be stubbed in tests. The store's own transaction
/// semantics make each `commit_batch` atomic; cross-request serialization
/// is not provided here.
pub trait EventStore {
    /// Returns persisted events whose interval overlaps `interval`,
    /// scoped to `owner` (an owned scope sees that owner's events plus
    /// global ones; the global scope sees everything), excluding the
    /// record identified by `exclude` when given.
    fn query_overlapping(
        &self,
        interval: &Interval,
        owner: Owner,
        exclude: Option<EventId>,
    ) -> Result<Vec<Event>, StoreError>;

    /// Writes a batch as a single unit, assigning identities to events
    /// that lack one and rewriting rows for events that carry one. On
    /// failure nothing is partially visible.
    fn commit_batch(&mut self, events: Vec<Event>) -> Result<Vec<Event>, StoreError>;

    /// Removes one event, reporting whether a row existed.
    fn delete_one(&mut self, id: EventId) -> Result<bool, StoreError>;
}

/// Checks candidates against previously committed events.
///
/// Candidates are partitioned into groups of [`PERSIST_CHECK_GROUP`];
/// each candidate queries the store once and records at most one
/// conflict. The first group with any conflict aborts the submission,
/// reporting the group's index and candidate range.
pub fn check_persisted_overlaps<S: EventStore + ?Sized>(
    store: &S,
    events: &[Event],
    exclude: Option<EventId>,
    owner: Owner,
) -> Result<(), Rejection> {
    for (group, chunk) in events.chunks(PERSIST_CHECK_GROUP).enumerate() {
        let mut errors = Vec::new();
        for event in chunk {
            let matches = store.query_overlapping(event.interval(), owner, exclude)?;
            if let Some(conflicting) = matches.into_iter().next() {
                errors.push(OverlapError {
                    event: event.clone(),
                    conflicting,
                });
            }
        }
        if !errors.is_empty() {
            let group_start = group * PERSIST_CHECK_GROUP;
            let group_end = group_start + chunk.len() - 1;
            return Err(Rejection::PersistedOverlap {
                errors,
                group,
                group_start,
                group_end,
            });
        }
    }
    Ok(())
}

/// Boundary-facing orchestrator for event submissions.
///
/// Known race window: two concurrent submissions can each pass the
/// persisted-overlap check before either commits, producing an overlap
/// neither observed. Closing it requires a serializable transaction
/// around check+write or a store-enforced uniqueness guard over
/// `(owner, interval)`; each individual commit is still atomic.
pub struct SubmissionService<S> {
    store: S,
}

impl<S: EventStore> SubmissionService<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// Releases the wrapped store.
    pub fn into_store(self) -> S {
        self.store
    }

    /// Validates and commits a batch of new events.
    ///
    /// Every event lacking a non-global owner is attributed to
    /// `requester` before the overlap stages run. All-or-nothing: any
    /// rejection means nothing from the batch was written.
    pub fn submit_create(
        &mut self,
        drafts: &[EventDraft],
        requester: Owner,
    ) -> Result<Vec<Event>, Rejection> {
        let mut events = build_events(drafts)?;
        for event in &mut events {
            event.assign_owner(requester);
        }
        tracing::debug!(batch = events.len(), "structurally valid");

        let overlaps = check_local_overlaps(&events);
        if !overlaps.is_empty() {
            return Err(Rejection::LocalOverlap(overlaps));
        }
        tracing::debug!(batch = events.len(), "locally consistent");

        check_persisted_overlaps(&self.store, &events, None, requester)?;
        tracing::debug!(batch = events.len(), "globally consistent");

        let committed = self.store.commit_batch(events)?;
        tracing::debug!(batch = committed.len(), "committed");
        Ok(committed)
    }

    /// Rewrites an existing event's title and interval.
    ///
    /// The stored row naturally overlaps itself before the new values are
    /// written, so the persisted check excludes the event's own identity.
    /// A single-event update has no batch peers; the local stage is
    /// skipped. A target not owned by `requester` reports not-found.
    pub fn submit_update(
        &mut self,
        existing: Event,
        draft: &EventDraft,
        requester: Owner,
    ) -> Result<Event, Rejection> {
        if !existing.is_owned_by(requester) {
            return Err(Rejection::NotFound);
        }
        let Some(id) = existing.id() else {
            return Err(Rejection::NotFound);
        };

        let mut event = existing;
        if let Err(violations) = event.apply(draft) {
            return Err(Rejection::Field(vec![FieldError {
                index: 0,
                title: draft.title.clone(),
                violations,
            }]));
        }
        tracing::debug!(event = %id, "structurally valid");

        check_persisted_overlaps(&self.store, std::slice::from_ref(&event), Some(id), requester)?;
        tracing::debug!(event = %id, "globally consistent");

        let committed = self.store.commit_batch(vec![event])?;
        committed
            .into_iter()
            .next()
            .ok_or_else(|| Rejection::Store(StoreError::new("commit returned an empty batch")))
    }

    /// Deletes an existing event.
    ///
    /// A target not owned by `requester` reports not-found, the same as a
    /// missing row, so the response never reveals another owner's event.
    pub fn submit_delete(&mut self, existing: &Event, requester: Owner) -> Result<(), Rejection> {
        if !existing.is_owned_by(requester) {
            return Err(Rejection::NotFound);
        }
        let Some(id) = existing.id() else {
            return Err(Rejection::NotFound);
        };

        if self.store.delete_one(id)? {
            tracing::debug!(event = %id, "deleted");
            Ok(())
        } else {
            Err(Rejection::NotFound)
        }
    }
}

/// Structural stage: builds events from drafts, collecting every failing
/// event's violations before rejecting.
fn build_events(drafts: &[EventDraft]) -> Result<Vec<Event>, Rejection> {
    let mut events = Vec::with_capacity(drafts.len());
    let mut errors = Vec::new();
    for (index, draft) in drafts.iter().enumerate() {
        match Event::from_draft(draft) {
            Ok(event) => events.push(event),
            Err(violations) => errors.push(FieldError {
                index,
                title: draft.title.clone(),
                violations,
            }),
        }
    }
    if errors.is_empty() {
        Ok(events)
    } else {
        Err(Rejection::Field(errors))
    }
}
