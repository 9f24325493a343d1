//! The executable units of work that make up a scaffolding plan.
//!
//! Tasks are a closed set: directory creation, template rendering, and
//! external command invocation. Each carries a description and a priority;
//! the engine's only polymorphic call is [`Task::execute`].

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::fsutil;
use crate::manifest::Manifest;
use crate::template::{self, TemplateBundle};
use crate::transaction::TransactionManager;

/// Longest stderr excerpt carried in a subprocess failure.
const STDERR_TAIL_BYTES: usize = 2048;

/// Poll interval while waiting on a child process.
const CHILD_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cross-cutting data every task needs to run, passed by reference to each
/// `execute`.
pub struct TaskContext<'a> {
    /// Cooperative cancellation flag; an in-flight subprocess is killed
    /// when it flips.
    pub cancelled: Arc<AtomicBool>,
    /// Absolute path the task operates in.
    pub target_path: PathBuf,
    /// Read-only view of the manifest, including pending changes from this
    /// run, so rendered templates can see their own project entry.
    pub manifest: &'a Manifest,
    pub dry_run: bool,
    pub force: bool,
    /// Active transaction. `None` only in dry-run, where nothing touches
    /// disk anyway.
    pub tx: Option<&'a TransactionManager>,
}

/// An ordered sequence of tasks assembled from handler outputs. Not itself
/// persisted; the engine sorts it by priority before running.
#[derive(Default)]
pub struct Plan {
    pub tasks: Vec<Task>,
}

/// One atomic operation in a plan.
pub enum Task {
    /// Ensure a directory (and its parents) exists.
    CreateDirectory {
        path: PathBuf,
        description: String,
        priority: u32,
    },
    /// Render an embedded template against the manifest and write it below
    /// the target path.
    RenderTemplate {
        bundle: &'static TemplateBundle,
        template_id: &'static str,
        /// Destination relative to the target path.
        output_path: String,
        description: String,
        priority: u32,
    },
    /// Run an external command, optionally inside the target path.
    ExecCommand {
        cmd: String,
        args: Vec<String>,
        /// Paths (relative to the target) the command is expected to
        /// create, pre-registered with the transaction so rollback can
        /// clean up after an opaque tool.
        predicted_created: Vec<String>,
        run_in_target: bool,
        description: String,
        priority: u32,
    },
}

impl Task {
    /// Human-readable summary for progress reporting.
    pub fn description(&self) -> &str {
        match self {
            Task::CreateDirectory { description, .. }
            | Task::RenderTemplate { description, .. }
            | Task::ExecCommand { description, .. } => description,
        }
    }

    /// Execution order key; lower runs first.
    pub fn priority(&self) -> u32 {
        match self {
            Task::CreateDirectory { priority, .. }
            | Task::RenderTemplate { priority, .. }
            | Task::ExecCommand { priority, .. } => *priority,
        }
    }

    /// Perform the work. Dry-run is a full no-op for every variant.
    pub fn execute(&self, ctx: &TaskContext) -> Result<()> {
        match self {
            Task::CreateDirectory { path, .. } => create_directory(path, ctx),
            Task::RenderTemplate {
                bundle,
                template_id,
                output_path,
                ..
            } => render_template(bundle, template_id, output_path, ctx),
            Task::ExecCommand {
                cmd,
                args,
                predicted_created,
                run_in_target,
                ..
            } => exec_command(cmd, args, predicted_created, *run_in_target, ctx),
        }
    }
}

fn create_directory(path: &Path, ctx: &TaskContext) -> Result<()> {
    if ctx.dry_run {
        return Ok(());
    }
    let abs_path = fsutil::abs_clean(path)?;
    if let Some(tx) = ctx.tx {
        tx.track(&abs_path)?;
    }
    // Re-creating an existing chain is a no-op.
    fsutil::create_dir_all_secure(&abs_path)?;
    Ok(())
}

fn render_template(
    bundle: &TemplateBundle,
    template_id: &str,
    output_path: &str,
    ctx: &TaskContext,
) -> Result<()> {
    if ctx.dry_run {
        return Ok(());
    }

    let text = bundle.get(template_id)?;
    let rendered = template::render(template_id, text, ctx.manifest)?;

    let abs_target = fsutil::abs_clean(&ctx.target_path)?;
    let abs_final = fsutil::abs_clean(&abs_target.join(output_path))?;
    if abs_final.strip_prefix(&abs_target).is_err() {
        return Err(Error::PathEscape {
            path: abs_final,
            root: abs_target,
        });
    }

    if let Some(parent) = abs_final.parent() {
        fsutil::create_dir_all_secure(parent)?;
    }

    match fs::metadata(&abs_final) {
        Ok(_) if !ctx.force => {
            return Err(Error::Preexists(output_path.to_string()));
        }
        Ok(_) => {}
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
        Err(err) => return Err(err.into()),
    }

    if let Some(tx) = ctx.tx {
        tx.track(&abs_final)?;
    }

    write_rendered(&abs_final, &rendered)
}

fn write_rendered(path: &Path, contents: &str) -> Result<()> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(fsutil::FILE_MODE)
        .open(path)?;
    file.write_all(contents.as_bytes())?;
    // Surface flush/close failures instead of losing them on drop.
    file.sync_all()?;
    Ok(())
}

fn exec_command(
    cmd: &str,
    args: &[String],
    predicted_created: &[String],
    run_in_target: bool,
    ctx: &TaskContext,
) -> Result<()> {
    if ctx.dry_run {
        return Ok(());
    }

    // Give rollback path-level visibility into what the opaque command is
    // about to create.
    if let Some(tx) = ctx.tx {
        for rel in predicted_created {
            tx.track(&ctx.target_path.join(rel))?;
        }
    }

    let mut command = Command::new(cmd);
    command.args(args);
    if run_in_target {
        command.current_dir(&ctx.target_path);
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::inherit());
    command.stderr(Stdio::piped());

    let command_line = render_command_line(cmd, args);
    let mut child = command.spawn().map_err(|err| Error::Subprocess {
        command: command_line.clone(),
        status: "failed to spawn".to_string(),
        stderr_tail: err.to_string(),
    })?;

    // Drain stderr on a helper thread so a chatty child cannot fill the
    // pipe and wedge the poll loop.
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf);
            buf
        })
    });

    let status = loop {
        if ctx.cancelled.load(Ordering::Relaxed) {
            let _ = child.kill();
            let _ = child.wait();
            collect_stderr(stderr_handle);
            return Err(Error::Subprocess {
                command: command_line,
                status: "cancelled".to_string(),
                stderr_tail: String::new(),
            });
        }
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => std::thread::sleep(CHILD_POLL_INTERVAL),
            Err(err) => {
                collect_stderr(stderr_handle);
                return Err(err.into());
            }
        }
    };

    let stderr = collect_stderr(stderr_handle);
    if !status.success() {
        return Err(Error::Subprocess {
            command: command_line,
            status: status.to_string(),
            stderr_tail: fsutil::truncate_string(
                String::from_utf8_lossy(&stderr).trim(),
                STDERR_TAIL_BYTES,
            ),
        });
    }
    Ok(())
}

fn collect_stderr(handle: Option<std::thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn render_command_line(cmd: &str, args: &[String]) -> String {
    let mut line = cmd.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

#[cfg(test)]
#[path = "task_tests.rs"]
mod tests;
