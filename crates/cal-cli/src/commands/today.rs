//! Today command: a day's events bucketed by starting hour.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};

use cal_core::{Event, Owner};
use cal_db::Database;

/// Prints the day's events grouped by starting hour.
///
/// Events that started before the day land in the `00:00` bucket.
/// Returns whether any events were found; an empty day exits non-zero.
pub fn run(db: &Database, date: Option<&str>, requester: Owner) -> Result<bool> {
    let day = match date {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .with_context(|| format!("could not parse date {s}, expected YYYY-MM-DD"))?,
        None => Utc::now().date_naive(),
    };

    let events = db.events_on_day(day, requester)?;
    if events.is_empty() {
        println!("No events today");
        return Ok(false);
    }

    for (hour, bucket) in bucket_by_hour(&events, day) {
        println!("{hour}");
        println!("=====");
        for event in bucket {
            println!("{}", format_event(event));
        }
    }

    Ok(true)
}

/// Buckets events by starting hour, in chronological bucket order.
fn bucket_by_hour(events: &[Event], day: NaiveDate) -> BTreeMap<String, Vec<&Event>> {
    let mut buckets: BTreeMap<String, Vec<&Event>> = BTreeMap::new();
    for event in events {
        let label = if event.start().date_naive() == day {
            event.start().format("%H:00").to_string()
        } else {
            "00:00".to_string()
        };
        buckets.entry(label).or_default().push(event);
    }
    buckets
}

fn format_event(event: &Event) -> String {
    format!(
        "{} | {} - {}",
        event.title(),
        event.start().format("%Y-%m-%d %H:%M:%S"),
        event.end().format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};

    use super::*;

    fn event(title: &str, start: &str, end: &str) -> Event {
        Event::new(
            title,
            start.parse::<DateTime<Utc>>().unwrap(),
            end.parse::<DateTime<Utc>>().unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn buckets_by_starting_hour() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let events = [
            event("Standup", "2025-01-15T09:15:00Z", "2025-01-15T09:30:00Z"),
            event("Planning", "2025-01-15T09:45:00Z", "2025-01-15T10:30:00Z"),
            event("Lunch", "2025-01-15T12:00:00Z", "2025-01-15T13:00:00Z"),
        ];

        let buckets = bucket_by_hour(&events, day);
        let labels: Vec<&String> = buckets.keys().collect();
        assert_eq!(labels, vec!["09:00", "12:00"]);
        assert_eq!(buckets["09:00"].len(), 2);
    }

    #[test]
    fn spanning_event_lands_in_midnight_bucket() {
        let day = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        let events = [event(
            "Overnight",
            "2025-01-14T22:00:00Z",
            "2025-01-15T02:00:00Z",
        )];

        let buckets = bucket_by_hour(&events, day);
        assert_eq!(buckets["00:00"].len(), 1);
    }
}
