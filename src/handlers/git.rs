//! Tooling template that initializes a Git repository and snapshots the
//! scaffolded tree.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;

pub struct GitHandler;

impl Handler for GitHandler {
    fn tasks(&self, _target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let seq = priority::VERSION_CONTROL.sequence();

        // Predicting ".git" lets the transaction remove the whole repo if a
        // later task fails.
        plan.push(Task::ExecCommand {
            cmd: "git".to_string(),
            args: vec!["init".into()],
            predicted_created: vec![".git".to_string()],
            run_in_target: true,
            description: "Initialize Git repository".to_string(),
            priority: seq.next()?,
        });
        plan.push(Task::ExecCommand {
            cmd: "git".to_string(),
            args: vec!["add".into(), ".".into()],
            predicted_created: Vec::new(),
            run_in_target: true,
            description: "Stage files".to_string(),
            priority: seq.next()?,
        });
        // The run always materializes at least scbake.toml, so the commit
        // has something to snapshot.
        plan.push(Task::ExecCommand {
            cmd: "git".to_string(),
            args: vec!["commit".into(), "-m".into(), "scbake: apply templates".into()],
            predicted_created: Vec::new(),
            run_in_target: true,
            description: "Create initial commit".to_string(),
            priority: seq.next()?,
        });

        Ok(plan)
    }
}
