//! List command for querying stored events.

use anyhow::Result;

use cal_core::{Event, Owner};
use cal_db::{Database, EventQuery};

use crate::ListArgs;
use crate::commands::util::parse_timestamp;

/// Runs the list command, one event per output line.
///
/// Human-readable lines by default; `--json` switches to JSONL.
pub fn run(db: &Database, requester: Owner, args: &ListArgs) -> Result<()> {
    let query = EventQuery {
        start_from: parse_timestamp(args.start_from.as_deref(), "start-from")?,
        start_to: parse_timestamp(args.start_to.as_deref(), "start-to")?,
        end_from: parse_timestamp(args.end_from.as_deref(), "end-from")?,
        end_to: parse_timestamp(args.end_to.as_deref(), "end-to")?,
        title: args.title.clone(),
        page: args.page,
        page_size: args.page_size,
    };

    let events = db.list_events(requester, &query)?;
    for event in events {
        if args.json {
            println!("{}", serde_json::to_string(&event)?);
        } else {
            println!("{}", format_event(&event));
        }
    }

    Ok(())
}

fn format_event(event: &Event) -> String {
    let id = event
        .id()
        .map_or_else(|| "-".to_string(), |id| id.to_string());
    format!(
        "{id} | {} | {} - {}",
        event.title(),
        event.start().format("%Y-%m-%d %H:%M:%S"),
        event.end().format("%Y-%m-%d %H:%M:%S")
    )
}
