//! pmap CLI - Inspect and exercise the port map registry
//!
//! A command-line tool for probing ports on this node, classifying the
//! dynamic port range, and walking brick port assignments in-process.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;

#[derive(Parser)]
#[command(name = "pmap")]
#[command(author, version, about = "Port map registry for storage cluster nodes")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file (defaults to ~/.pmap/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether ports can be bound right now
    Probe {
        /// Port numbers to probe
        #[arg(required = true)]
        ports: Vec<u16>,
    },

    /// Classify the dynamic port range as free or foreign
    Scan {
        /// List every foreign port
        #[arg(long)]
        foreign: bool,
    },

    /// Assign and bind ports for brick paths
    Assign {
        /// Brick paths to assign ports to
        #[arg(required = true)]
        resources: Vec<String>,

        /// Multiplex every brick onto the first assigned port
        #[arg(long)]
        mux: bool,
    },

    /// Show current configuration
    Config,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = commands::config_store(cli.config)?;

    match cli.command {
        Commands::Probe { ports } => commands::probe::run(&store, &ports, cli.json).await?,
        Commands::Scan { foreign } => commands::scan::run(&store, foreign, cli.json).await?,
        Commands::Assign { resources, mux } => {
            commands::assign::run(&store, &resources, mux, cli.json).await?
        }
        Commands::Config => commands::config::show(&store, cli.json).await?,
    }

    Ok(())
}
