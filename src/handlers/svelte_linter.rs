//! Tooling template for ESLint configuration in Svelte projects.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[(
    "eslint.config.js.tpl",
    include_str!("../../templates/svelte_linter/eslint.config.js.tpl"),
)]);

pub struct SvelteLinterHandler;

impl Handler for SvelteLinterHandler {
    fn tasks(&self, _target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let seq = priority::LINTER.sequence();

        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "eslint.config.js.tpl",
            output_path: "eslint.config.js".to_string(),
            description: "Create Svelte ESLint configuration".to_string(),
            priority: seq.next()?,
        });
        plan.push(Task::ExecCommand {
            cmd: "npm".to_string(),
            args: vec![
                "install".into(),
                "--save-dev".into(),
                "eslint".into(),
                "eslint-plugin-svelte".into(),
                "globals".into(),
                "@eslint/js".into(),
                "prettier".into(),
                "eslint-config-prettier".into(),
            ],
            predicted_created: Vec::new(),
            run_in_target: true,
            description: "Install Svelte ESLint dependencies".to_string(),
            priority: seq.next()?,
        });
        plan.push(Task::ExecCommand {
            cmd: "npm".to_string(),
            args: vec![
                "pkg".into(),
                "set".into(),
                "scripts.lint=npx eslint .".into(),
                "scripts.lint:fix=npx eslint . --fix".into(),
            ],
            predicted_created: Vec::new(),
            run_in_target: true,
            description: "Add standard lint scripts to package.json".to_string(),
            priority: seq.next()?,
        });

        Ok(plan)
    }
}
