//! Storage layer for the calendar.
//!
//! Provides persistence for events using `rusqlite`.
//!
//! # Thread Safety
//!
//! The [`Database`] type wraps a `rusqlite::Connection`, which is `Send` but
//! not `Sync`: a `Database` can be moved between threads but needs external
//! synchronization to be shared.
//!
//! # Schema
//!
//! Timestamps are stored as TEXT in RFC 3339 format with a fixed
//! millisecond precision (e.g., `2025-01-15T10:30:00.000Z`), always UTC.
//! The fixed width keeps lexicographic ordering identical to chronological
//! ordering, so range and overlap predicates compare strings directly.
//! `owner_id` is NULL for global events.

use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, params, params_from_iter};
use thiserror::Error;

use cal_core::{Event, EventId, EventStore, Interval, Owner, StoreError, UserId};

/// Upper bound on a listing page, also the default page size.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// An error from the underlying database.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Failed to parse a stored timestamp.
    #[error("invalid timestamp in row {id}: {timestamp}")]
    TimestampParse {
        id: i64,
        timestamp: String,
        #[source]
        source: chrono::ParseError,
    },
    /// A stored row violates an event invariant.
    #[error("invalid stored event {id}: {message}")]
    InvalidRow { id: i64, message: String },
    /// An update targeted a row that no longer exists.
    #[error("no stored event with id {0}")]
    MissingRow(i64),
    /// A day query ran off the end of the calendar.
    #[error("date out of range: {0}")]
    DateRange(NaiveDate),
}

impl From<DbError> for StoreError {
    fn from(error: DbError) -> Self {
        Self::new(error)
    }
}

/// Filters for listing events.
///
/// Date bounds are strict (`start_at > start_from`, `start_at <
/// start_to`, likewise for `end_at`); the title filter is a substring
/// match. Pages are 1-based and capped at [`MAX_PAGE_SIZE`] rows.
#[derive(Debug, Clone, Default)]
pub struct EventQuery {
    pub start_from: Option<DateTime<Utc>>,
    pub start_to: Option<DateTime<Utc>>,
    pub end_from: Option<DateTime<Utc>>,
    pub end_to: Option<DateTime<Utc>>,
    pub title: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Database connection wrapper.
///
/// See the [module documentation](self) for thread safety considerations.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens a database at the given path, creating it if necessary.
    ///
    /// The database schema is automatically initialized on first open.
    pub fn open(path: &Path) -> Result<Self, DbError> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Opens an in-memory database.
    ///
    /// Useful for testing. The database is destroyed when the connection closes.
    pub fn open_in_memory() -> Result<Self, DbError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// This is idempotent - safe to call on an already-initialized database.
    fn init(&self) -> Result<(), DbError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS events (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                start_at TEXT NOT NULL,
                end_at TEXT NOT NULL,
                owner_id INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_events_start ON events(start_at);
            CREATE INDEX IF NOT EXISTS idx_events_end ON events(end_at);
            CREATE INDEX IF NOT EXISTS idx_events_owner ON events(owner_id);
            ",
        )?;
        Ok(())
    }

    /// Fetches a single event by ID.
    pub fn fetch_one(&self, id: EventId) -> Result<Option<Event>, DbError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, title, start_at, end_at, owner_id FROM events WHERE id = ?",
                [id.get()],
                read_row,
            )
            .optional()?;
        row.map(row_to_event).transpose()
    }

    /// Lists events visible to `requester`, ordered by start then ID.
    ///
    /// An owned scope sees its own events plus global ones; the global
    /// scope sees only global events.
    pub fn list_events(
        &self,
        requester: Owner,
        query: &EventQuery,
    ) -> Result<Vec<Event>, DbError> {
        let mut sql = String::from("SELECT id, title, start_at, end_at, owner_id FROM events");
        let mut params: Vec<Value> = Vec::new();
        push_owner_scope(&mut sql, &mut params, requester, true);

        let date_filters = [
            ("start_at >", query.start_from),
            ("start_at <", query.start_to),
            ("end_at >", query.end_from),
            ("end_at <", query.end_to),
        ];
        for (predicate, bound) in date_filters {
            if let Some(bound) = bound {
                sql.push_str(&format!(" AND {predicate} ?"));
                params.push(Value::Text(format_timestamp(bound)));
            }
        }
        if let Some(title) = query.title.as_deref().filter(|title| !title.is_empty()) {
            sql.push_str(" AND title LIKE ?");
            params.push(Value::Text(format!("%{title}%")));
        }

        sql.push_str(" ORDER BY start_at ASC, id ASC LIMIT ? OFFSET ?");
        let page_size = query.page_size.unwrap_or(MAX_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let page = query.page.unwrap_or(1).max(1);
        params.push(Value::Integer(i64::from(page_size)));
        params.push(Value::Integer(i64::from(page_size) * i64::from(page - 1)));

        self.select_events(&sql, params)
    }

    /// Lists events overlapping the given day, `[00:00, next day 00:00)`.
    pub fn events_on_day(&self, day: NaiveDate, requester: Owner) -> Result<Vec<Event>, DbError> {
        let day_start = day.and_time(NaiveTime::MIN).and_utc();
        let day_end = day
            .succ_opt()
            .ok_or(DbError::DateRange(day))?
            .and_time(NaiveTime::MIN)
            .and_utc();

        let mut sql =
            String::from("SELECT id, title, start_at, end_at, owner_id FROM events WHERE start_at < ? AND end_at > ?");
        let mut params: Vec<Value> = vec![
            Value::Text(format_timestamp(day_end)),
            Value::Text(format_timestamp(day_start)),
        ];
        push_owner_scope(&mut sql, &mut params, requester, true);
        sql.push_str(" ORDER BY start_at ASC, id ASC");

        self.select_events(&sql, params)
    }

    /// Writes a batch in one transaction: events without an ID insert,
    /// events with one rewrite their row. Any failure rolls the whole
    /// batch back.
    fn write_batch(&mut self, events: Vec<Event>) -> Result<Vec<Event>, DbError> {
        let tx = self.conn.transaction()?;
        let mut committed = Vec::with_capacity(events.len());
        {
            let mut insert = tx.prepare(
                "INSERT INTO events (title, start_at, end_at, owner_id) VALUES (?, ?, ?, ?)",
            )?;
            let mut update = tx.prepare(
                "UPDATE events SET title = ?, start_at = ?, end_at = ?, owner_id = ? WHERE id = ?",
            )?;
            for event in events {
                let owner_id = event.owner().user_id().map(UserId::get);
                match event.id() {
                    Some(id) => {
                        let changed = update.execute(params![
                            event.title(),
                            format_timestamp(event.start()),
                            format_timestamp(event.end()),
                            owner_id,
                            id.get(),
                        ])?;
                        if changed == 0 {
                            return Err(DbError::MissingRow(id.get()));
                        }
                        committed.push(event);
                    }
                    None => {
                        insert.execute(params![
                            event.title(),
                            format_timestamp(event.start()),
                            format_timestamp(event.end()),
                            owner_id,
                        ])?;
                        let rowid = tx.last_insert_rowid();
                        let id = EventId::new(rowid).map_err(|_| DbError::InvalidRow {
                            id: rowid,
                            message: "non-positive rowid".to_string(),
                        })?;
                        committed.push(event.with_id(id));
                    }
                }
            }
        }
        tx.commit()?;
        tracing::debug!(batch = committed.len(), "batch committed");
        Ok(committed)
    }

    fn delete_event(&mut self, id: EventId) -> Result<bool, DbError> {
        let deleted = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [id.get()])?;
        Ok(deleted > 0)
    }

    fn select_events(&self, sql: &str, params: Vec<Value>) -> Result<Vec<Event>, DbError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(params), read_row)?;
        let mut events = Vec::new();
        for row in rows {
            events.push(row_to_event(row?)?);
        }
        Ok(events)
    }
}

impl EventStore for Database {
    fn query_overlapping(
        &self,
        interval: &Interval,
        owner: Owner,
        exclude: Option<EventId>,
    ) -> Result<Vec<Event>, StoreError> {
        let mut sql = String::from(
            "SELECT id, title, start_at, end_at, owner_id FROM events WHERE start_at < ? AND end_at > ?",
        );
        let mut params: Vec<Value> = vec![
            Value::Text(format_timestamp(interval.end())),
            Value::Text(format_timestamp(interval.start())),
        ];
        push_owner_scope(&mut sql, &mut params, owner, false);
        if let Some(exclude) = exclude {
            sql.push_str(" AND id != ?");
            params.push(Value::Integer(exclude.get()));
        }
        sql.push_str(" ORDER BY start_at ASC, id ASC");

        self.select_events(&sql, params).map_err(Into::into)
    }

    fn commit_batch(&mut self, events: Vec<Event>) -> Result<Vec<Event>, StoreError> {
        self.write_batch(events).map_err(Into::into)
    }

    fn delete_one(&mut self, id: EventId) -> Result<bool, StoreError> {
        self.delete_event(id).map_err(Into::into)
    }
}

/// Appends the owner-visibility predicate.
///
/// An owned scope matches that owner's rows plus global rows. The global
/// scope matches everything in overlap checks (`restrict_global = false`:
/// a global event conflicts with every timeline) but only global rows in
/// listings (`restrict_global = true`).
fn push_owner_scope(sql: &mut String, params: &mut Vec<Value>, owner: Owner, restrict_global: bool) {
    let conjunction = if sql.contains(" WHERE ") { " AND" } else { " WHERE" };
    match owner.user_id() {
        Some(user) => {
            sql.push_str(conjunction);
            sql.push_str(" (owner_id IS NULL OR owner_id = ?)");
            params.push(Value::Integer(user.get()));
        }
        None if restrict_global => {
            sql.push_str(conjunction);
            sql.push_str(" owner_id IS NULL");
        }
        None => {}
    }
}

struct EventRow {
    id: i64,
    title: String,
    start_at: String,
    end_at: String,
    owner_id: Option<i64>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
    Ok(EventRow {
        id: row.get(0)?,
        title: row.get(1)?,
        start_at: row.get(2)?,
        end_at: row.get(3)?,
        owner_id: row.get(4)?,
    })
}

fn row_to_event(row: EventRow) -> Result<Event, DbError> {
    let id = EventId::new(row.id).map_err(|_| DbError::InvalidRow {
        id: row.id,
        message: "non-positive id".to_string(),
    })?;
    let start = parse_timestamp(&row.start_at, row.id)?;
    let end = parse_timestamp(&row.end_at, row.id)?;
    let interval = Interval::new(start, end).map_err(|err| DbError::InvalidRow {
        id: row.id,
        message: err.to_string(),
    })?;
    Ok(Event::from_stored(
        id,
        row.title,
        interval,
        Owner::from_raw(row.owner_id),
    ))
}

fn parse_timestamp(timestamp: &str, id: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|source| DbError::TimestampParse {
            id,
            timestamp: timestamp.to_string(),
            source,
        })
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
