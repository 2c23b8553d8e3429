//! fixmem - demo and inspector for fixed-capacity arenas

mod config;
mod demo;
mod inspect;
mod logging;

use std::io;
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::{CliConfig, Overrides};

/// Fixed-capacity arena and arena-backed stack
#[derive(Parser)]
#[command(name = "fixmem")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ./fixmem.toml when present)
    #[arg(short, long, global = true, env = "FIXMEM_CONFIG")]
    config: Option<PathBuf>,

    /// Arena capacity in bytes
    #[arg(long, global = true)]
    capacity: Option<usize>,

    /// Log filter directive, e.g. `debug` or `fixmem_memory=trace`
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Push and pop integers and records on stacks sharing one arena
    Demo,

    /// Show capacity transitions and arena usage while a stack fills and drains
    Inspect {
        /// Number of integers to push before draining
        #[arg(short, long, default_value_t = 32)]
        push: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        capacity: cli.capacity,
        log_level: cli.log_level,
    };
    let config = CliConfig::load(cli.config.as_deref(), &overrides)?;
    logging::init(&config.log)?;
    debug!(?config, "configuration loaded");

    let mut out = io::stdout().lock();
    match cli.command.unwrap_or(Commands::Demo) {
        Commands::Demo => demo::run(&config.arena, &mut out),
        Commands::Inspect { push } => inspect::run(&config.arena, push, &mut out),
    }
}
