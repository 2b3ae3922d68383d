use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod utils;

use config::ClientConfig;

/// Demonstrator CLI for the ndn-core workspace.
#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    /// Sets the level of verbosity
    #[clap(short, long, global = true)]
    verbose: bool,

    /// Path to a TOML config file (overridden by NDN_* environment variables)
    #[clap(short = 'c', long, global = true)]
    config: Option<String>,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an NDN URI and print its canonical form and wire encoding
    Name {
        /// Name in NDN URI format, e.g. /a/b/c
        uri: String,
    },

    /// Decode a hex-encoded TLV block and print its element tree
    TlvDump {
        /// Hex-encoded TLV bytes
        hex: String,
    },

    /// Insert synthetic Data packets into a content store and inspect eviction
    Store {
        /// Number of Data packets to insert
        #[clap(short, long, default_value_t = 4)]
        count: usize,
    },

    /// Schedule and drain a handful of deadline events
    Scheduler {
        /// Number of events to schedule
        #[clap(short, long, default_value_t = 4)]
        count: usize,
    },

    /// Print the effective configuration (defaults, file, then NDN_* env vars)
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if cli.verbose { "debug" } else { "info" })).init();

    let cfg = ClientConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Name { uri } => commands::name::run(&uri),
        Commands::TlvDump { hex } => commands::tlv::run(&hex),
        Commands::Store { count } => commands::store::run(cfg.store_capacity, count),
        Commands::Scheduler { count } => commands::scheduler::run(count),
        Commands::Config => {
            utils::print_header("Effective configuration");
            println!("{cfg:#?}");
            Ok(())
        }
    }
}
