//! One-off recurrence calculation, without touching the database.

use chrono::{Local, SecondsFormat, Utc};
use clap::Args;
use household_core::{next_due, RecurrencePolicy};
use serde_json::json;

use super::{parse_instant, print_json, CmdResult};

#[derive(Args)]
pub struct NextDueArgs {
    /// Policy as JSON ('{"type":"weekly","daysOfWeek":[1,3,5]}') or a bare kind ("monthly")
    #[arg(long)]
    pub policy: String,
    /// Reference time (default: now)
    #[arg(long)]
    pub from: Option<String>,
    /// Do calendar arithmetic in UTC instead of the local zone
    #[arg(long)]
    pub utc: bool,
}

pub fn run(args: NextDueArgs) -> CmdResult {
    let policy: RecurrencePolicy = args.policy.parse()?;
    let from = match args.from.as_deref() {
        Some(s) => parse_instant(s, args.utc)?,
        None => Utc::now(),
    };

    let (from, next) = if args.utc {
        (
            from.to_rfc3339_opts(SecondsFormat::Secs, true),
            next_due(&policy, &from)?.to_rfc3339_opts(SecondsFormat::Secs, true),
        )
    } else {
        let local = from.with_timezone(&Local);
        (
            local.to_rfc3339_opts(SecondsFormat::Secs, false),
            next_due(&policy, &local)?.to_rfc3339_opts(SecondsFormat::Secs, false),
        )
    };

    print_json(&json!({
        "policy": policy,
        "from": from,
        "next_due": next,
    }))
}
