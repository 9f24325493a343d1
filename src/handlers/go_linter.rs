//! Tooling template for golangci-lint configuration.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[(
    "golangci.yml.tpl",
    include_str!("../../templates/go_linter/golangci.yml.tpl"),
)]);

pub struct GoLinterHandler;

impl Handler for GoLinterHandler {
    fn tasks(&self, _target_path: &Path) -> Result<Vec<Task>> {
        let seq = priority::LINTER.sequence();
        Ok(vec![Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "golangci.yml.tpl",
            output_path: ".golangci.yml".to_string(),
            description: "Create Go linter configuration (.golangci.yml)".to_string(),
            priority: seq.next()?,
        }])
    }
}
