mod cmd;
mod context;
mod output;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use cmd::{
    config::ConfigSubcommand, invoices::InvoiceSubcommand, jobs::JobSubcommand,
    views::KanbanSubcommand,
};
use context::GlobalArgs;
use std::path::PathBuf;
use tileops_core::dates::YearMonth;

#[derive(Parser)]
#[command(
    name = "tileops",
    about = "Jobs, schedules and invoices for a tile contractor",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    /// Act as this profile id (default in demo mode: the demo owner)
    #[arg(long = "as", global = true, env = "TILEOPS_PROFILE", value_name = "PROFILE_ID")]
    profile: Option<String>,

    /// Config file (default: ./tileops.yaml when present)
    #[arg(long, global = true, env = "TILEOPS_CONFIG")]
    config: Option<PathBuf>,

    /// Render as of this date instead of today (YYYY-MM-DD)
    #[arg(long, global = true, env = "TILEOPS_TODAY", value_name = "DATE")]
    today: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List, inspect, create and move jobs
    Jobs {
        #[command(subcommand)]
        subcommand: JobSubcommand,
    },

    /// Show the status board, or drop a card on another column
    Kanban {
        #[command(subcommand)]
        subcommand: Option<KanbanSubcommand>,
    },

    /// Month grid of scheduled jobs
    Calendar {
        /// Month to show (YYYY-MM, default: this month)
        #[arg(long)]
        month: Option<YearMonth>,
    },

    /// Crew timeline for a month plus a week either side
    Timeline {
        /// Month to show (YYYY-MM, default: this month)
        #[arg(long)]
        month: Option<YearMonth>,
    },

    /// Revenue, pipeline, variance and workload figures
    Analytics,

    /// Active crew members
    Team {
        /// Show map markers instead of the roster
        #[arg(long)]
        map: bool,
    },

    /// Manage invoices (owner only)
    Invoices {
        #[command(subcommand)]
        subcommand: InvoiceSubcommand,
    },

    /// Inspect or scaffold the config file
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to bind (default: from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (default: from config; 0 = OS-assigned)
        #[arg(long)]
        port: Option<u16>,

        /// Open a browser once listening
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = GlobalArgs {
        json: cli.json,
        profile: cli.profile,
        config: cli.config,
        today: cli.today,
    };

    let result = match cli.command {
        Commands::Jobs { subcommand } => cmd::jobs::run(&args, subcommand),
        Commands::Kanban { subcommand } => cmd::views::kanban(&args, subcommand),
        Commands::Calendar { month } => cmd::views::calendar(&args, month),
        Commands::Timeline { month } => cmd::views::timeline(&args, month),
        Commands::Analytics => cmd::analytics::run(&args),
        Commands::Team { map } => cmd::team::run(&args, map),
        Commands::Invoices { subcommand } => cmd::invoices::run(&args, subcommand),
        Commands::Config { subcommand } => cmd::config::run(&args, subcommand),
        Commands::Serve { host, port, open } => cmd::serve::run(&args, host, port, open),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
