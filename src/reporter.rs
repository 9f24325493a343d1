//! Progress reporting for orchestration steps and individual tasks.
//!
//! The engine talks to a [`Reporter`]; the CLI picks the plain line-based
//! implementation for dry runs and piped output, and the animated spinner
//! when stdout is a terminal.

use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const SPINNER_FRAMES: [&str; 8] = ["⣷", "⣯", "⣟", "⡿", "⢿", "⣻", "⣽", "⣾"];
const SPINNER_DELAY: Duration = Duration::from_millis(100);

/// Sink for orchestration milestones and per-task progress.
pub trait Reporter {
    /// Log a high-level orchestration milestone.
    fn step(&mut self, emoji: &str, message: &str);

    /// Update the denominator for step logging.
    fn set_total_steps(&mut self, total: usize);

    /// A task is about to run (`current` is 1-based).
    fn task_start(&mut self, description: &str, current: usize, total: usize);

    /// The task announced by the last `task_start` finished.
    fn task_end(&mut self, failed: bool);
}

/// Pick the best reporter for the execution context: plain for dry runs and
/// non-interactive output, spinner for a TTY.
pub fn auto(total_steps: usize, dry_run: bool) -> Box<dyn Reporter> {
    if dry_run || !std::io::stdout().is_terminal() {
        Box::new(PlainReporter::new(total_steps, dry_run))
    } else {
        Box::new(SpinnerReporter::new(total_steps))
    }
}

/// Static, line-based output for non-interactive or dry-run environments.
pub struct PlainReporter {
    current_step: usize,
    total_steps: usize,
    dry_run: bool,
}

impl PlainReporter {
    pub fn new(total_steps: usize, dry_run: bool) -> Self {
        Self {
            current_step: 0,
            total_steps,
            dry_run,
        }
    }
}

impl Reporter for PlainReporter {
    fn step(&mut self, emoji: &str, message: &str) {
        self.current_step += 1;
        // Dry runs keep the preamble and then let the plan preview speak.
        if self.dry_run && self.current_step > 2 {
            return;
        }
        println!("[{}/{}] {} {}", self.current_step, self.total_steps, emoji, message);
    }

    fn set_total_steps(&mut self, total: usize) {
        self.total_steps = total;
    }

    fn task_start(&mut self, description: &str, _current: usize, _total: usize) {
        if self.dry_run {
            println!("  [DRY RUN] {description}");
        }
    }

    fn task_end(&mut self, _failed: bool) {}
}

/// Interactive reporter with an animated braille spinner on the active task
/// line.
pub struct SpinnerReporter {
    current_step: usize,
    total_steps: usize,
    active: Option<ActiveTask>,
}

struct ActiveTask {
    description: String,
    index: usize,
    total: usize,
    done: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl SpinnerReporter {
    pub fn new(total_steps: usize) -> Self {
        Self {
            current_step: 0,
            total_steps,
            active: None,
        }
    }
}

impl Reporter for SpinnerReporter {
    fn step(&mut self, emoji: &str, message: &str) {
        self.current_step += 1;
        println!("[{}/{}] {} {}", self.current_step, self.total_steps, emoji, message);
    }

    fn set_total_steps(&mut self, total: usize) {
        self.total_steps = total;
    }

    fn task_start(&mut self, description: &str, current: usize, total: usize) {
        let done = Arc::new(AtomicBool::new(false));
        let thread_done = Arc::clone(&done);
        let line_prefix = format!("[{current}/{total}]");
        let line_description = description.to_string();
        let handle = std::thread::spawn(move || {
            let mut frame = 0;
            while !thread_done.load(Ordering::Relaxed) {
                print!(
                    "\r{} {} {}",
                    line_prefix,
                    SPINNER_FRAMES[frame % SPINNER_FRAMES.len()],
                    line_description
                );
                let _ = std::io::stdout().flush();
                frame += 1;
                std::thread::sleep(SPINNER_DELAY);
            }
        });
        self.active = Some(ActiveTask {
            description: description.to_string(),
            index: current,
            total,
            done,
            handle,
        });
    }

    fn task_end(&mut self, failed: bool) {
        let Some(active) = self.active.take() else {
            return;
        };
        active.done.store(true, Ordering::Relaxed);
        let _ = active.handle.join();
        let marker = if failed { "❌" } else { "✅" };
        println!(
            "\r[{}/{}] {} {}",
            active.index, active.total, marker, active.description
        );
    }
}

/// Records every event; used by tests to assert ordering guarantees.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingReporter {
    pub steps: Vec<String>,
    pub started: Vec<String>,
    pub outcomes: Vec<bool>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn step(&mut self, _emoji: &str, message: &str) {
        self.steps.push(message.to_string());
    }

    fn set_total_steps(&mut self, _total: usize) {}

    fn task_start(&mut self, description: &str, _current: usize, _total: usize) {
        self.started.push(description.to_string());
    }

    fn task_end(&mut self, failed: bool) {
        self.outcomes.push(!failed);
    }
}
