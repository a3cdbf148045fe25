//! mvsass CLI - build pipeline for the mvsass SCSS utility library.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "mvsass")]
#[command(about = "Build pipeline for the mvsass SCSS utility library")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to mvsass.toml config file
    #[arg(short, long, default_value = "mvsass.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble dist/mvsass.scss and copy the Ruby helpers (default)
    Build {
        /// Fail on manifest entries that match zero or several fragments
        #[arg(long)]
        strict: bool,
    },

    /// Remove the library output and compiled example CSS
    Clean,

    /// Remove compiled example CSS
    CleanExample,

    /// Compile the example stylesheets once
    CompileExample,

    /// Clean, compile, watch and host the example site
    Example {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },

    /// Host the example site without watching
    Host {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to serve
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Write a default mvsass.toml
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    // Execute command
    match cli.command.unwrap_or(Commands::Build { strict: false }) {
        Commands::Build { strict } => {
            commands::build::run(&cli.config, strict)?;
        }
        Commands::Clean => {
            commands::clean::run(&cli.config, true)?;
        }
        Commands::CleanExample => {
            commands::clean::run(&cli.config, false)?;
        }
        Commands::CompileExample => {
            commands::example::compile(&cli.config)?;
        }
        Commands::Example { port, no_open } => {
            commands::example::run(&cli.config, port, !no_open).await?;
        }
        Commands::Host { port, dir } => {
            commands::host::run(&cli.config, port, dir).await?;
        }
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes)?;
        }
    }

    Ok(())
}
