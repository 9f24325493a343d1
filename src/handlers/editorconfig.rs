//! Tooling template for universal editor configuration.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[(
    "editorconfig.tpl",
    include_str!("../../templates/editorconfig/editorconfig.tpl"),
)]);

pub struct EditorconfigHandler;

impl Handler for EditorconfigHandler {
    fn tasks(&self, _target_path: &Path) -> Result<Vec<Task>> {
        let seq = priority::CONFIG_UNIVERSAL.sequence();
        Ok(vec![Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "editorconfig.tpl",
            output_path: ".editorconfig".to_string(),
            description: "Create standardized .editorconfig".to_string(),
            priority: seq.next()?,
        }])
    }
}
