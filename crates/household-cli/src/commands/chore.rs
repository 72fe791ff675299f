//! Chore management, agenda views and completion.

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::Subcommand;
use household_core::{
    Agenda, Chore, ChoreDraft, ChorePriority, ChoreRepository, CompletionLog, Config, CoreError,
    HouseholdDb, Rotation,
};

use super::{parse_date, parse_instant, print_json, split_list, start_of, today, CmdResult, PolicyArgs};

#[derive(Subcommand)]
pub enum ChoreAction {
    /// Create a chore
    Add {
        /// Chore name
        name: String,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Comma-separated person IDs, in rotation order
        #[arg(long, required = true)]
        assign: String,
        /// Rotation: fixed or round_robin (default: fixed)
        #[arg(long, default_value = "fixed")]
        rotation: String,
        /// Priority: low, medium or high (default: from config)
        #[arg(long)]
        priority: Option<String>,
        /// Room (default: from config)
        #[arg(long)]
        room: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Estimated minutes
        #[arg(long)]
        minutes: Option<u32>,
        /// First due date (default: start of today)
        #[arg(long)]
        due: Option<String>,
    },
    /// List chores
    List {
        /// Filter by room
        #[arg(long)]
        room: Option<String>,
        /// Filter by assigned person ID
        #[arg(long)]
        assignee: Option<String>,
    },
    /// Show one chore
    Get {
        /// Chore ID
        id: String,
    },
    /// Update a chore
    Update {
        /// Chore ID
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        policy: PolicyArgs,
        /// Comma-separated person IDs
        #[arg(long)]
        assign: Option<String>,
        #[arg(long)]
        rotation: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        room: Option<String>,
        /// New description; pass an empty string to clear it
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        minutes: Option<u32>,
        /// New due date
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a chore and its history
    Remove {
        /// Chore ID
        id: String,
    },
    /// Chores due today, overdue ones included
    Today,
    /// Chores due before today
    Overdue,
    /// Chores due in the coming days, today excluded
    Upcoming {
        /// Number of days (default: from config)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Chores due on a given date
    On {
        /// Date as YYYY-MM-DD or "today"
        date: String,
    },
    /// Mark a chore done and schedule the next occurrence
    Complete {
        /// Chore ID
        id: String,
        /// Person ID of whoever did it
        #[arg(long)]
        by: String,
        #[arg(long)]
        notes: Option<String>,
        /// Completion time (default: now)
        #[arg(long)]
        at: Option<String>,
    },
    /// Completion history, newest first
    History {
        /// Only this chore
        #[arg(long)]
        chore: Option<String>,
        /// Maximum entries
        #[arg(long)]
        limit: Option<usize>,
    },
}

enum View {
    Today,
    Overdue,
    Upcoming(u32),
    On(NaiveDate),
}

fn agenda_view<Tz: TimeZone>(
    db: &HouseholdDb,
    now: DateTime<Tz>,
    view: View,
) -> Result<Vec<Chore>, CoreError> {
    let agenda = Agenda::new(db, now);
    match view {
        View::Today => agenda.today(),
        View::Overdue => agenda.overdue(),
        View::Upcoming(days) => agenda.upcoming(days),
        View::On(date) => agenda.on(date),
    }
}

fn show(db: &HouseholdDb, use_utc: bool, view: View) -> CmdResult {
    let chores = if use_utc {
        agenda_view(db, Utc::now(), view)?
    } else {
        agenda_view(db, Local::now(), view)?
    };
    print_json(&chores)
}

fn parse_due(due: Option<&str>, use_utc: bool) -> Result<DateTime<Utc>, String> {
    match due {
        Some(s) => parse_instant(s, use_utc),
        None => Ok(start_of(today(use_utc), use_utc)),
    }
}

pub fn run(action: ChoreAction) -> CmdResult {
    let config = Config::load_or_default();
    let use_utc = config.time.use_utc;
    let db = HouseholdDb::open()?;

    match action {
        ChoreAction::Add {
            name,
            policy,
            assign,
            rotation,
            priority,
            room,
            description,
            minutes,
            due,
        } => {
            let frequency = policy
                .to_policy()?
                .ok_or("a recurrence is required: use --every, --days, --interval or --policy")?;
            let priority = match priority {
                Some(p) => p.parse::<ChorePriority>()?,
                None => config.chores.default_priority,
            };
            let chore = ChoreDraft {
                name,
                description,
                room: room.or(Some(config.chores.default_room)),
                frequency,
                assignees: split_list(&assign),
                rotation: rotation.parse::<Rotation>()?,
                priority,
                estimated_minutes: minutes,
                next_due: parse_due(due.as_deref(), use_utc)?,
            }
            .into_chore(Utc::now())?;
            db.create_chore(&chore)?;
            tracing::info!(id = %chore.id, "chore created");
            print_json(&chore)?;
        }
        ChoreAction::List { room, assignee } => {
            let chores: Vec<_> = db
                .list_chores()?
                .into_iter()
                .filter(|c| room.as_ref().map_or(true, |r| c.room.eq_ignore_ascii_case(r)))
                .filter(|c| assignee.as_ref().map_or(true, |a| c.assignees.contains(a)))
                .collect();
            print_json(&chores)?;
        }
        ChoreAction::Get { id } => match db.get_chore(&id)? {
            Some(chore) => print_json(&chore)?,
            None => return Err(format!("chore not found: {id}").into()),
        },
        ChoreAction::Update {
            id,
            name,
            policy,
            assign,
            rotation,
            priority,
            room,
            description,
            minutes,
            due,
        } => {
            let mut chore = db
                .get_chore(&id)?
                .ok_or_else(|| format!("chore not found: {id}"))?;

            if let Some(n) = name {
                let n = n.trim().to_string();
                if n.is_empty() {
                    return Err("name must not be empty".into());
                }
                chore.name = n;
            }
            if let Some(frequency) = policy.to_policy()? {
                chore.frequency = frequency;
            }
            if let Some(a) = assign {
                let assignees = split_list(&a);
                if assignees.is_empty() {
                    return Err("at least one assignee is required".into());
                }
                chore.assignees = assignees;
            }
            if let Some(r) = rotation {
                chore.rotation = r.parse()?;
            }
            if let Some(p) = priority {
                chore.priority = p.parse()?;
            }
            if let Some(r) = room {
                chore.set_room(&r);
            }
            if let Some(d) = description {
                chore.description = Some(d.trim().to_string()).filter(|d| !d.is_empty());
            }
            if let Some(m) = minutes {
                chore.estimated_minutes = Some(m);
            }
            if let Some(d) = due {
                chore.next_due = parse_instant(&d, use_utc)?;
            }

            db.update_chore(&chore)?;
            print_json(&chore)?;
        }
        ChoreAction::Remove { id } => {
            db.delete_chore(&id)?;
            println!("Chore removed: {id}");
        }
        ChoreAction::Today => show(&db, use_utc, View::Today)?,
        ChoreAction::Overdue => show(&db, use_utc, View::Overdue)?,
        ChoreAction::Upcoming { days } => {
            let days = days.unwrap_or(config.chores.upcoming_days);
            show(&db, use_utc, View::Upcoming(days))?;
        }
        ChoreAction::On { date } => show(&db, use_utc, View::On(parse_date(&date, use_utc)?))?,
        ChoreAction::Complete { id, by, notes, at } => {
            let at = match at {
                Some(s) => parse_instant(&s, use_utc)?,
                None => Utc::now(),
            };
            let outcome = if use_utc {
                db.complete_chore(&id, &by, &at, notes)?
            } else {
                db.complete_chore(&id, &by, &at.with_timezone(&Local), notes)?
            };
            print_json(&outcome)?;
        }
        ChoreAction::History { chore, limit } => {
            print_json(&db.list_completions(chore.as_deref(), limit)?)?;
        }
    }
    Ok(())
}
