//! verso CLI - multi-version documentation site assembler.
//!
//! Provides commands for:
//! - `assemble`: Build aliases, landing page, root manifest and navigation
//! - `dropdown`: Refresh the versions dropdown only

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AssembleArgs, DropdownArgs};
use output::Output;

/// verso - assemble per-ref documentation builds into one site.
#[derive(Parser)]
#[command(name = "verso", version, about)]
struct Cli {
    /// Log progress at info level (otherwise `RUST_LOG` decides).
    #[arg(short, long, global = true, env = "VERSO_VERBOSE")]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recreate aliases, write the landing redirect and inject navigation.
    Assemble(AssembleArgs),
    /// Scope search indexes and inject the versions dropdown only.
    Dropdown(DropdownArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Assemble(args) => args.execute(),
        Commands::Dropdown(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn verbose_is_global() {
        let cli = Cli::try_parse_from(["verso", "dropdown", "--verbose", "site"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Dropdown(_)));
    }
}
