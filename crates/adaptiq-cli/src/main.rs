//! adaptiq CLI: drive adaptive quiz sessions from a terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "adaptiq", version, about = "Adaptive quiz session engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create starter config and example question pool
    Init,

    /// Validate question pool TOML files
    Validate {
        /// Path to pool file or directory
        #[arg(long)]
        pool: PathBuf,

        /// Questions per session, bonus included
        #[arg(long, default_value = "9")]
        session_size: usize,
    },

    /// Select the next session for a learner
    Session {
        /// Question pool file
        #[arg(long)]
        pool: Option<PathBuf>,

        /// Learner id
        #[arg(long)]
        learner: Option<String>,

        /// Where to write the session plan
        #[arg(long, default_value = "plan.json")]
        out: PathBuf,

        /// Seed for reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Record answers for a session plan
    Record {
        /// Question pool file
        #[arg(long)]
        pool: Option<PathBuf>,

        /// Session plan written by `adaptiq session`
        #[arg(long, default_value = "plan.json")]
        plan: PathBuf,

        /// Per-position correctness (comma-separated, e.g. "1,0,1")
        #[arg(long)]
        answers: String,

        /// Learner id
        #[arg(long)]
        learner: Option<String>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show a learner's mastery summary
    Mastery {
        /// Question pool file
        #[arg(long)]
        pool: Option<PathBuf>,

        /// Learner id
        #[arg(long)]
        learner: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Discard a learner's adaptive state
    Reset {
        /// Learner id
        #[arg(long)]
        learner: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Simulate a learner of known ability over many sessions
    Simulate {
        /// Question pool file
        #[arg(long)]
        pool: Option<PathBuf>,

        /// True ability of the simulated learner
        #[arg(long, allow_negative_numbers = true)]
        ability: f64,

        /// Number of sessions to run
        #[arg(long, default_value = "20")]
        sessions: u32,

        /// Seed for reproducible runs
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("adaptiq=info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Validate { pool, session_size } => commands::validate::execute(pool, session_size),
        Commands::Session {
            pool,
            learner,
            out,
            seed,
            config,
        } => commands::session::execute(pool, learner, out, seed, config),
        Commands::Record {
            pool,
            plan,
            answers,
            learner,
            format,
            config,
        } => commands::record::execute(pool, plan, answers, learner, format, config),
        Commands::Mastery {
            pool,
            learner,
            config,
        } => commands::mastery::execute(pool, learner, config),
        Commands::Reset { learner, config } => commands::reset::execute(learner, config),
        Commands::Simulate {
            pool,
            ability,
            sessions,
            seed,
            config,
        } => commands::simulate::execute(pool, ability, sessions, seed, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
