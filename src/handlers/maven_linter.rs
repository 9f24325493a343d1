//! Tooling template for Maven Checkstyle configuration.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;
use crate::template::TemplateBundle;

static TEMPLATES: TemplateBundle = TemplateBundle::new(&[
    (
        "checkstyle.xml.tpl",
        include_str!("../../templates/maven_linter/checkstyle.xml.tpl"),
    ),
    (
        "pom_snippet.xml.tpl",
        include_str!("../../templates/maven_linter/pom_snippet.xml.tpl"),
    ),
]);

pub struct MavenLinterHandler;

impl Handler for MavenLinterHandler {
    fn tasks(&self, _target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let seq = priority::LINTER.sequence();

        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "checkstyle.xml.tpl",
            output_path: "checkstyle.xml".to_string(),
            description: "Create Maven Checkstyle configuration".to_string(),
            priority: seq.next()?,
        });
        // The plugin snippet is a standalone file; merging it into pom.xml
        // is left to the user.
        plan.push(Task::RenderTemplate {
            bundle: &TEMPLATES,
            template_id: "pom_snippet.xml.tpl",
            output_path: "maven-checkstyle-plugin.xml".to_string(),
            description: "Create Maven pom.xml snippet (Checkstyle)".to_string(),
            priority: seq.next()?,
        });

        Ok(plan)
    }
}
