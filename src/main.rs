//! CLI entry point: parse arguments, pick a reporter, dispatch to the
//! workflow, and map any failure to a non-zero exit.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};

mod cli;
mod error;
mod executor;
mod fsutil;
mod handlers;
mod manifest;
mod preflight;
mod priority;
mod reporter;
mod task;
mod template;
mod transaction;
mod workflow;

use crate::cli::{Command, RootArgs};
use crate::handlers::Registry;
use crate::workflow::{RunRequest, APPLY_TOTAL_STEPS, NEW_EXTRA_STEPS};

fn main() {
    let args = RootArgs::parse();
    if let Err(err) = run(args) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: RootArgs) -> Result<()> {
    let registry = Registry::builtin();

    match args.command {
        Command::New(new_args) => {
            let mut reporter =
                reporter::auto(APPLY_TOTAL_STEPS + NEW_EXTRA_STEPS, args.dry_run);
            workflow::run_new(
                &new_args.name,
                new_args.lang,
                new_args.with,
                args.dry_run,
                args.force,
                &registry,
                reporter.as_mut(),
            )?;
            println!("✅ Success! New project '{}' created.", new_args.name);
        }
        Command::Apply(apply_args) => {
            let (target_path, manifest_path_arg) = resolve_target(apply_args.path.as_deref())?;
            let mut reporter = reporter::auto(APPLY_TOTAL_STEPS, args.dry_run);
            let request = RunRequest {
                lang: apply_args.lang,
                with: apply_args.with,
                target_path,
                manifest_path_arg,
                dry_run: args.dry_run,
                force: args.force,
            };
            workflow::run_apply(&request, &registry, reporter.as_mut())?;
            println!("✅ Success! 'apply' command finished.");
        }
        Command::List(list_args) => {
            let start = list_args.path.unwrap_or_else(|| PathBuf::from("."));
            workflow::run_list(&start, list_args.json, &registry)?;
        }
    }
    Ok(())
}

/// Resolve the optional path argument: absolute form for execution, the
/// argument as given for manifest portability.
fn resolve_target(path: Option<&Path>) -> Result<(PathBuf, String)> {
    let arg = path.unwrap_or_else(|| Path::new("."));
    let absolute = fsutil::abs_clean(arg)?;
    Ok((absolute, arg.display().to_string()))
}
