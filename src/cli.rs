//! Command-line argument surface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the scbake scaffolder.
#[derive(Parser, Debug)]
#[command(
    name = "scbake",
    version,
    about = "A manifest-driven project scaffolder",
    long_about = "scbake is a single-binary CLI for scaffolding new projects\n\
                  and applying layered infrastructure templates.\n\
                  Every run is atomic: either all changes land, or the tree\n\
                  is restored to its pre-run state.",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    /// Show what changes would be made without executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Override safety checks for file overwrites
    #[arg(long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    New(NewArgs),
    Apply(ApplyArgs),
    List(ListArgs),
}

#[derive(Parser, Debug)]
#[command(about = "Create a new standalone project")]
pub struct NewArgs {
    /// Name of the project directory to create
    pub name: String,

    /// Language project pack to apply (e.g. 'go')
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Tooling template(s) to apply (e.g. 'makefile,git')
    #[arg(long = "with", value_name = "TEMPLATE", value_delimiter = ',')]
    pub with: Vec<String>,
}

#[derive(Parser, Debug)]
#[command(about = "Apply a language pack or tooling template to a project")]
pub struct ApplyArgs {
    /// Language project pack to apply (e.g. 'go')
    #[arg(long, value_name = "LANG")]
    pub lang: Option<String>,

    /// Tooling template(s) to apply (e.g. 'makefile,git')
    #[arg(long = "with", value_name = "TEMPLATE", value_delimiter = ',')]
    pub with: Vec<String>,

    /// Project path (defaults to the current directory)
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(about = "List supported handlers and recorded manifest entries")]
pub struct ListArgs {
    /// Emit machine-readable JSON
    #[arg(long)]
    pub json: bool,

    /// Project path to inspect (defaults to the current directory)
    pub path: Option<PathBuf>,
}
