//! tegel CLI: generate compiler-backend skeletons.
//!
//! Commands:
//! - `backend`: write `<name>_backend.hpp` / `<name>_backend.cpp`
//! - `nodes`: list the built-in AST node vocabulary
//! - `config`: show or write the configuration file
//! - `cursor`: print the loop positions of an iteration over N items
//!
//! Generation itself lives in [`tegel_core::dispatcher::Dispatcher`].

mod commands;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "tegel",
    about = "Compiler backend skeleton generator for visitor and backend classes",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to tegel.config.json (default: ./tegel.config.json)
    #[arg(long, global = true, default_value = tegel_core::config::CONFIG_FILE)]
    config: PathBuf,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the declaration and definition files of a backend
    Backend(commands::backend::BackendArgs),

    /// List the AST node names a generated visitor dispatches over
    Nodes {
        /// Print in declaration-file (alphabetical) order
        #[arg(long)]
        sorted: bool,
    },

    /// Print the effective configuration
    Config {
        /// Write a starter config file instead of printing
        #[arg(long)]
        write: bool,
    },

    /// Show cursor positions (index:first:last:length) for a list of LEN items
    Cursor {
        /// Number of items
        len: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Backend(args) => commands::backend::run(&cli.config, args),
        Commands::Nodes { sorted } => {
            commands::nodes::run(sorted);
            Ok(())
        }
        Commands::Config { write } => commands::config::run(&cli.config, write),
        Commands::Cursor { len } => {
            commands::cursor::run(len);
            Ok(())
        }
    }
}
