//! Language pack for Go projects.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::manifest::sanitize_project_name;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[
    ("gitignore.tpl", include_str!("../../templates/go/gitignore.tpl")),
    ("main.go.tpl", include_str!("../../templates/go/main.go.tpl")),
]);

pub struct GoHandler;

impl Handler for GoHandler {
    fn tasks(&self, target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let seq = priority::LANG_SETUP.sequence();

        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "gitignore.tpl",
            output_path: ".gitignore".to_string(),
            description: "Create .gitignore".to_string(),
            priority: seq.next()?,
        });
        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "main.go.tpl",
            output_path: "main.go".to_string(),
            description: "Create main.go".to_string(),
            priority: seq.next()?,
        });

        // Idempotency: a missing go.mod means initialization, an existing
        // one means maintenance.
        if target_path.join("go.mod").exists() {
            plan.push(Task::ExecCommand {
                cmd: "go".to_string(),
                args: vec!["mod".into(), "tidy".into()],
                predicted_created: Vec::new(),
                run_in_target: true,
                description: "Run go mod tidy (project exists)".to_string(),
                priority: seq.next()?,
            });
        } else {
            let module_name = sanitize_project_name(target_path)?;
            plan.push(Task::ExecCommand {
                cmd: "go".to_string(),
                args: vec!["mod".into(), "init".into(), module_name.clone()],
                predicted_created: vec!["go.mod".to_string()],
                run_in_target: true,
                description: format!("Run go mod init {module_name}"),
                priority: seq.next()?,
            });
            plan.push(Task::ExecCommand {
                cmd: "go".to_string(),
                args: vec!["mod".into(), "tidy".into()],
                predicted_created: vec!["go.sum".to_string()],
                run_in_target: true,
                description: "Run go mod tidy".to_string(),
                priority: seq.next()?,
            });
        }

        Ok(plan)
    }
}
