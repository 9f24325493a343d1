//! Tooling template for the universal Makefile.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[(
    "makefile.tpl",
    include_str!("../../templates/makefile/makefile.tpl"),
)]);

pub struct MakefileHandler;

impl Handler for MakefileHandler {
    fn tasks(&self, _target_path: &Path) -> Result<Vec<Task>> {
        let seq = priority::BUILD_SYSTEM.sequence();
        Ok(vec![Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "makefile.tpl",
            output_path: "Makefile".to_string(),
            description: "Create smart Makefile".to_string(),
            priority: seq.next()?,
        }])
    }
}
