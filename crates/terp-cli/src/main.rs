use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "terp-cli", version)]
#[command(about = "Time-tracking calculation core: day calculation, recalculation scoping, and scheduler inspection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate one employee's daily value
    CalculateDay(commands::calculate::CalculateDayArgs),
    /// Report which days/months a booking change dirties
    Recalculate(commands::recalculate::RecalculateArgs),
    /// Scheduler seed/tick/inspect
    Scheduler {
        #[command(subcommand)]
        action: commands::scheduler::SchedulerAction,
    },
    /// Scheduler configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::CalculateDay(args) => commands::calculate::run(args),
        Commands::Recalculate(args) => commands::recalculate::run(args),
        Commands::Scheduler { action } => commands::scheduler::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
