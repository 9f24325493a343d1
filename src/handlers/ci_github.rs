//! Tooling template for a GitHub Actions CI workflow.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[(
    "main.yml.tpl",
    include_str!("../../templates/ci_github/main.yml.tpl"),
)]);

pub struct CiGithubHandler;

impl Handler for CiGithubHandler {
    fn tasks(&self, target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let dir_seq = priority::DIR_CREATE.sequence();
        let seq = priority::CI.sequence();

        // Explicit directory tasks keep the whole chain in the journal, so
        // rollback removes the empty .github scaffolding too.
        plan.push(Task::CreateDirectory {
            path: target_path.join(".github"),
            description: "Create .github directory".to_string(),
            priority: dir_seq.next()?,
        });
        plan.push(Task::CreateDirectory {
            path: target_path.join(".github/workflows"),
            description: "Create .github/workflows directory".to_string(),
            priority: dir_seq.next()?,
        });
        // The template sees the full manifest, so it can key off whatever
        // projects are recorded.
        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "main.yml.tpl",
            output_path: ".github/workflows/main.yml".to_string(),
            description: "Create GitHub Actions CI workflow".to_string(),
            priority: seq.next()?,
        });

        Ok(plan)
    }
}
