//! Tooling template for a Dev Container environment.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[
    (
        "Dockerfile.tpl",
        include_str!("../../templates/devcontainer/Dockerfile.tpl"),
    ),
    (
        "devcontainer.json.tpl",
        include_str!("../../templates/devcontainer/devcontainer.json.tpl"),
    ),
]);

pub struct DevcontainerHandler;

impl Handler for DevcontainerHandler {
    fn tasks(&self, target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let dir_seq = priority::DIR_CREATE.sequence();
        let seq = priority::DEV_ENV.sequence();

        plan.push(Task::CreateDirectory {
            path: target_path.join(".devcontainer"),
            description: "Create .devcontainer directory".to_string(),
            priority: dir_seq.next()?,
        });
        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "Dockerfile.tpl",
            output_path: ".devcontainer/Dockerfile".to_string(),
            description: "Create .devcontainer/Dockerfile".to_string(),
            priority: seq.next()?,
        });
        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "devcontainer.json.tpl",
            output_path: ".devcontainer/devcontainer.json".to_string(),
            description: "Create .devcontainer/devcontainer.json".to_string(),
            priority: seq.next()?,
        });

        Ok(plan)
    }
}
