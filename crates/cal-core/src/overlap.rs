//! Overlap detection within a submitted batch.

use crate::error::OverlapError;
use crate::event::Event;

/// Checks a batch of candidates against each other.
///
/// Candidates are scanned in input order against a growing accepted set.
/// A candidate that conflicts is reported against the first accepted
/// event it hits and is withheld from the accepted set, so a chain of
/// mutually-overlapping events reports once per offending candidate
/// rather than combinatorially. O(n²) in batch size; batches are bounded
/// by the caller.
#[must_use]
pub fn check_local_overlaps(events: &[Event]) -> Vec<OverlapError> {
    let mut accepted: Vec<&Event> = Vec::with_capacity(events.len());
    let mut errors = Vec::new();

    'candidates: for candidate in events {
        for existing in &accepted {
            if candidate.interval().overlaps(existing.interval()) {
                errors.push(OverlapError {
                    event: candidate.clone(),
                    conflicting: (*existing).clone(),
                });
                continue 'candidates;
            }
        }
        accepted.push(candidate);
    }

    errors
}
