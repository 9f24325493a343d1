//! The execution engine: runs a plan in priority order.

use crate::error::{Error, Result};
use crate::reporter::Reporter;
use crate::task::{Plan, TaskContext};

/// Run every task in the plan, lowest priority first. Ties keep their
/// insertion order, so same-band tasks retain the sequence allocator's
/// ordering. Stops at the first failure and returns it wrapped with the
/// task description; undoing any partial work is the caller's deferred
/// rollback, not the engine's job.
pub fn execute(plan: &mut Plan, ctx: &TaskContext, reporter: &mut dyn Reporter) -> Result<()> {
    plan.tasks.sort_by_key(|task| task.priority());

    let total = plan.tasks.len();
    for (index, task) in plan.tasks.iter().enumerate() {
        reporter.task_start(task.description(), index + 1, total);

        let result = if ctx.dry_run {
            Ok(())
        } else {
            task.execute(ctx)
        };

        reporter.task_end(result.is_err());
        if let Err(err) = result {
            return Err(Error::task(task.description(), err));
        }
    }
    Ok(())
}
