use chrono::Utc;
use clap::Args;
use household_core::{ChoreStats, Config, HouseholdDb, LeaderboardEntry, PersonRepository};
use serde::Serialize;

use super::{print_json, CmdResult};

#[derive(Args)]
pub struct StatsArgs {
    /// Trailing window in days (default: from config)
    #[arg(long)]
    pub window_days: Option<u32>,
}

#[derive(Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: ChoreStats,
    leaderboard: Vec<LeaderboardEntry>,
}

pub fn run(args: StatsArgs) -> CmdResult {
    let window_days = args
        .window_days
        .unwrap_or_else(|| Config::load_or_default().stats.window_days);
    let db = HouseholdDb::open()?;

    let stats = ChoreStats::collect(&db, Utc::now(), window_days)?;
    let leaderboard = stats.leaderboard(&db.list_people()?);
    print_json(&StatsReport { stats, leaderboard })
}
