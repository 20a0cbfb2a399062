//! Calendar events and their input payloads.

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FieldViolation;
use crate::interval::Interval;
use crate::types::{EventId, Owner};

/// Raw event fields as they arrive in an input payload.
///
/// Drafts carry no owner: ownership is assigned by the system when a
/// request is attributed to an identity, so a payload cannot place an
/// event on another user's timeline. Instants keep their input offset
/// until [`Event`] construction normalizes them to UTC.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// A validated calendar event.
///
/// Only constructible through validation; no partially-valid event value
/// exists. The ID is absent until the durable store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    id: Option<EventId>,
    title: String,
    #[serde(flatten)]
    interval: Interval,
    #[serde(rename = "user_id")]
    owner: Owner,
}

impl Event {
    /// Validates raw fields into an event.
    ///
    /// Collects every violation rather than stopping at the first: a blank
    /// title and an inverted interval are both reported. Bounds are never
    /// silently swapped.
    pub fn new<Tz: TimeZone>(
        title: impl Into<String>,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Self, Vec<FieldViolation>> {
        let title = title.into();
        let (title, interval) = Self::validate(title, start, end)?;
        Ok(Self {
            id: None,
            title,
            interval,
            owner: Owner::Global,
        })
    }

    /// Validates a draft payload into an event.
    pub fn from_draft(draft: &EventDraft) -> Result<Self, Vec<FieldViolation>> {
        Self::new(draft.title.clone(), draft.start, draft.end)
    }

    /// Rebuilds an event from a stored row.
    ///
    /// Rows were validated at admission; this does not re-validate.
    #[must_use]
    pub const fn from_stored(
        id: EventId,
        title: String,
        interval: Interval,
        owner: Owner,
    ) -> Self {
        Self {
            id: Some(id),
            title,
            interval,
            owner,
        }
    }

    /// Returns the event with its store-assigned identity.
    #[must_use]
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    /// Rewrites title and interval in place, re-validating both.
    ///
    /// On failure the event is left untouched.
    pub fn apply(&mut self, draft: &EventDraft) -> Result<(), Vec<FieldViolation>> {
        let (title, interval) = Self::validate(draft.title.clone(), draft.start, draft.end)?;
        self.title = title;
        self.interval = interval;
        Ok(())
    }

    fn validate<Tz: TimeZone>(
        title: String,
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<(String, Interval), Vec<FieldViolation>> {
        let mut violations = Vec::new();
        if title.trim().is_empty() {
            violations.push(FieldViolation::BlankTitle);
        }
        match Interval::new(start, end) {
            Ok(interval) if violations.is_empty() => Ok((title, interval)),
            Ok(_) => Err(violations),
            Err(invalid) => {
                violations.push(FieldViolation::EndNotAfterStart {
                    start: invalid.start,
                    end: invalid.end,
                });
                Err(violations)
            }
        }
    }

    /// Assigns an owner, once.
    ///
    /// A no-op when the event already has a non-global owner or when the
    /// assigned owner is itself global.
    pub fn assign_owner(&mut self, owner: Owner) {
        if self.owner.is_global() && !owner.is_global() {
            self.owner = owner;
        }
    }

    /// True when the event is global or owned by `candidate`.
    #[must_use]
    pub fn is_owned_by(&self, candidate: Owner) -> bool {
        match self.owner {
            Owner::Global => true,
            Owner::User(id) => candidate.user_id() == Some(id),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Option<EventId> {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub const fn interval(&self) -> &Interval {
        &self.interval
    }

    #[must_use]
    pub const fn owner(&self) -> Owner {
        self.owner
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.interval.start()
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.interval.end()
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::types::UserId;

    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn event(title: &str, start: &str, end: &str) -> Event {
        Event::new(title, utc(start), utc(end)).unwrap()
    }

    fn user(id: i64) -> Owner {
        Owner::User(UserId::new(id).unwrap())
    }

    #[test]
    fn rejects_blank_title() {
        let violations =
            Event::new("   ", utc("2025-01-01T12:00:00Z"), utc("2025-01-01T13:00:00Z"))
                .unwrap_err();
        assert_eq!(violations, vec![FieldViolation::BlankTitle]);
    }

    #[test]
    fn rejects_inverted_interval_without_swapping() {
        let violations = Event::new(
            "Standup",
            utc("2025-01-01T13:00:00Z"),
            utc("2025-01-01T12:00:00Z"),
        )
        .unwrap_err();
        assert_eq!(
            violations,
            vec![FieldViolation::EndNotAfterStart {
                start: utc("2025-01-01T13:00:00Z"),
                end: utc("2025-01-01T12:00:00Z"),
            }]
        );
    }

    #[test]
    fn collects_all_violations() {
        let violations = Event::new(
            "",
            utc("2025-01-01T13:00:00Z"),
            utc("2025-01-01T13:00:00Z"),
        )
        .unwrap_err();
        assert_eq!(violations.len(), 2);
        assert!(violations.contains(&FieldViolation::BlankTitle));
    }

    #[test]
    fn draft_with_offset_normalizes_to_utc() {
        let draft: EventDraft = serde_json::from_str(
            r#"{"title":"Standup","start":"2025-01-01T14:00:00+02:00","end":"2025-01-01T15:00:00+02:00"}"#,
        )
        .unwrap();
        let event = Event::from_draft(&draft).unwrap();
        assert_eq!(event.start(), utc("2025-01-01T12:00:00Z"));
        assert_eq!(event.end(), utc("2025-01-01T13:00:00Z"));
    }

    #[test]
    fn draft_ignores_owner_in_payload() {
        // A payload naming an owner cannot spoof ownership; the field
        // simply does not exist on the draft.
        let draft: EventDraft = serde_json::from_str(
            r#"{"title":"Standup","start":"2025-01-01T12:00:00Z","end":"2025-01-01T13:00:00Z","user_id":99}"#,
        )
        .unwrap();
        let event = Event::from_draft(&draft).unwrap();
        assert_eq!(event.owner(), Owner::Global);
    }

    #[test]
    fn assign_owner_is_write_once() {
        let mut event = event("Standup", "2025-01-01T12:00:00Z", "2025-01-01T13:00:00Z");
        event.assign_owner(user(1));
        event.assign_owner(user(2));
        assert_eq!(event.owner(), user(1));
    }

    #[test]
    fn assign_global_owner_is_noop() {
        let mut event = event("Standup", "2025-01-01T12:00:00Z", "2025-01-01T13:00:00Z");
        event.assign_owner(Owner::Global);
        assert_eq!(event.owner(), Owner::Global);
        event.assign_owner(user(1));
        event.assign_owner(Owner::Global);
        assert_eq!(event.owner(), user(1));
    }

    #[test]
    fn global_event_is_owned_by_everyone() {
        let event = event("Standup", "2025-01-01T12:00:00Z", "2025-01-01T13:00:00Z");
        assert!(event.is_owned_by(Owner::Global));
        assert!(event.is_owned_by(user(1)));
    }

    #[test]
    fn owned_event_is_owned_by_its_user_only() {
        let mut event = event("Standup", "2025-01-01T12:00:00Z", "2025-01-01T13:00:00Z");
        event.assign_owner(user(1));
        assert!(event.is_owned_by(user(1)));
        assert!(!event.is_owned_by(user(2)));
        assert!(!event.is_owned_by(Owner::Global));
    }

    #[test]
    fn apply_failure_leaves_event_untouched() {
        let mut event = event("Standup", "2025-01-01T12:00:00Z", "2025-01-01T13:00:00Z");
        let draft: EventDraft = serde_json::from_str(
            r#"{"title":"","start":"2025-01-01T14:00:00Z","end":"2025-01-01T15:00:00Z"}"#,
        )
        .unwrap();

        assert!(event.apply(&draft).is_err());
        assert_eq!(event.title(), "Standup");
        assert_eq!(event.start(), utc("2025-01-01T12:00:00Z"));
    }

    #[test]
    fn apply_rewrites_title_and_interval() {
        let mut event = event("Standup", "2025-01-01T12:00:00Z", "2025-01-01T13:00:00Z");
        let draft: EventDraft = serde_json::from_str(
            r#"{"title":"Retro","start":"2025-01-01T14:00:00Z","end":"2025-01-01T15:00:00Z"}"#,
        )
        .unwrap();

        event.apply(&draft).unwrap();
        assert_eq!(event.title(), "Retro");
        assert_eq!(event.start(), utc("2025-01-01T14:00:00Z"));
        assert_eq!(event.end(), utc("2025-01-01T15:00:00Z"));
    }

    #[test]
    fn serializes_with_flat_bounds_and_user_id() {
        let event = event("Standup", "2025-01-01T12:00:00Z", "2025-01-01T13:00:00Z");
        let committed = event.with_id(EventId::new(5).unwrap());

        let value: serde_json::Value = serde_json::to_value(&committed).unwrap();
        assert_eq!(value["id"], 5);
        assert_eq!(value["title"], "Standup");
        assert_eq!(value["user_id"], serde_json::Value::Null);
        assert!(value["start"].as_str().unwrap().starts_with("2025-01-01T12:00:00"));
        assert!(value["end"].as_str().unwrap().starts_with("2025-01-01T13:00:00"));
    }
}
