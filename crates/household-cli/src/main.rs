use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "household-cli", version, about = "Household chore tracker CLI")]
struct Cli {
    /// Suppress all log output
    #[arg(long, global = true)]
    quiet: bool,
    /// Enable debug logging
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Household member management
    Person {
        #[command(subcommand)]
        action: commands::person::PersonAction,
    },
    /// Chore management, agenda and completion
    Chore {
        #[command(subcommand)]
        action: commands::chore::ChoreAction,
    },
    /// Completion statistics and leaderboard
    Stats(commands::stats::StatsArgs),
    /// Compute the next due date for a recurrence policy
    NextDue(commands::next_due::NextDueArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

/// Log filter from `HOUSEHOLD_LOG`, overridden by `--quiet` / `--verbose`.
fn init_tracing(quiet: bool, verbose: bool) {
    let filter = if quiet {
        EnvFilter::new("off")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("HOUSEHOLD_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose);

    let result = match cli.command {
        Commands::Person { action } => commands::person::run(action),
        Commands::Chore { action } => commands::chore::run(action),
        Commands::Stats(args) => commands::stats::run(args),
        Commands::NextDue(args) => commands::next_due::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
