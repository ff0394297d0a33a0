//! SiteNav CLI - Navigation provider.
//!
//! Provides commands for:
//! - `tree`: Print the full navigation model of a localization
//! - `top`, `context`, `breadcrumb`: Print the navigation links for a path
//! - `subtree`: Print a bounded subtree, optionally with its ancestors

mod commands;
mod error;
mod navigation;
mod output;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{LinksArgs, SubtreeArgs, TreeArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// SiteNav - Navigation provider.
#[derive(Parser)]
#[command(name = "sitenav", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the full navigation model.
    Tree(TreeArgs),
    /// Print the top-level menu links.
    Top(LinksArgs),
    /// Print the links of the section containing a path.
    Context(LinksArgs),
    /// Print the breadcrumb trail for a path.
    Breadcrumb(LinksArgs),
    /// Print a bounded navigation subtree.
    Subtree(SubtreeArgs),
}

impl Commands {
    fn verbose(&self) -> bool {
        match self {
            Self::Tree(args) => args.common.verbose,
            Self::Top(args) | Self::Context(args) | Self::Breadcrumb(args) => args.common.verbose,
            Self::Subtree(args) => args.common.verbose,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.verbose() {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Tree(args) => args.execute(VERSION),
        Commands::Top(args) => args.execute(commands::LinkQuery::Top, VERSION),
        Commands::Context(args) => args.execute(commands::LinkQuery::Context, VERSION),
        Commands::Breadcrumb(args) => args.execute(commands::LinkQuery::Breadcrumb, VERSION),
        Commands::Subtree(args) => args.execute(VERSION),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output.error(&format!("Error: {err}"));
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subtree_flags() {
        let cli = Cli::try_parse_from([
            "sitenav",
            "subtree",
            "--id",
            "t5-k12",
            "--ancestors",
            "--levels",
            "2",
            "--localization",
            "fr",
            "--verbose",
        ])
        .unwrap();

        assert!(cli.command.verbose());
        let Commands::Subtree(args) = cli.command else {
            panic!("expected subtree command");
        };
        assert_eq!(args.id.as_deref(), Some("t5-k12"));
        assert!(args.ancestors);
        assert_eq!(args.levels, 2);
        assert_eq!(args.common.localization.as_deref(), Some("fr"));
    }

    #[test]
    fn test_parse_links_path() {
        let cli = Cli::try_parse_from(["sitenav", "breadcrumb", "/products/widget.html"]).unwrap();

        let Commands::Breadcrumb(args) = cli.command else {
            panic!("expected breadcrumb command");
        };
        assert_eq!(args.path, "/products/widget.html");
        assert!(!args.common.verbose);
    }
}
