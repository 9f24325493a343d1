//! Language pack for Spring Boot projects, bootstrapped from the Spring
//! Initializr service.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;

const ZIP_FILE: &str = "spring-init.zip";

pub struct SpringHandler;

impl Handler for SpringHandler {
    fn tasks(&self, target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let dir_seq = priority::DIR_CREATE.sequence();
        let lang_seq = priority::LANG_SETUP.sequence();

        plan.push(Task::CreateDirectory {
            path: target_path.to_path_buf(),
            description: format!("Create project directory '{}'", target_path.display()),
            priority: dir_seq.next()?,
        });

        // An existing pom.xml means the project is already initialized.
        if target_path.join("pom.xml").exists() {
            return Ok(plan);
        }

        let project_name = target_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());
        let encoded_name = query_escape(&project_name);
        // Java package segments cannot carry hyphens or spaces.
        let package_name: String = project_name
            .chars()
            .filter(|c| *c != '-' && *c != ' ')
            .collect();

        let zip_url = format!(
            "https://start.spring.io/starter.zip?type=maven-project&language=java&groupId=com.example&artifactId={encoded_name}&name={encoded_name}&packageName=com.example.{package_name}&packaging=jar&javaVersion=17&dependencies=web,lombok,actuator"
        );

        plan.push(Task::ExecCommand {
            cmd: "curl".to_string(),
            args: vec!["-f".into(), "-sS".into(), "-o".into(), ZIP_FILE.into(), zip_url],
            predicted_created: vec![ZIP_FILE.to_string()],
            run_in_target: true,
            description: format!("Download Spring Boot starter for '{project_name}'"),
            priority: lang_seq.next()?,
        });
        plan.push(Task::ExecCommand {
            cmd: "unzip".to_string(),
            args: vec!["-q".into(), "-o".into(), ZIP_FILE.into()],
            predicted_created: vec![
                "pom.xml".into(),
                "src".into(),
                "mvnw".into(),
                "mvnw.cmd".into(),
                ".mvn".into(),
                "HELP.md".into(),
                ".gitignore".into(),
                ".gitattributes".into(),
            ],
            run_in_target: true,
            description: "Extract project files".to_string(),
            priority: lang_seq.next()?,
        });
        plan.push(Task::ExecCommand {
            cmd: "rm".to_string(),
            args: vec![ZIP_FILE.into()],
            predicted_created: Vec::new(),
            run_in_target: true,
            description: "Cleanup initialization artifacts".to_string(),
            priority: lang_seq.next()?,
        });
        plan.push(Task::ExecCommand {
            cmd: "chmod".to_string(),
            args: vec!["+x".into(), "mvnw".into()],
            predicted_created: Vec::new(),
            run_in_target: true,
            description: "Make Maven wrapper executable".to_string(),
            priority: lang_seq.next()?,
        });

        Ok(plan)
    }
}

/// Percent-encode a string for use in a URL query value.
fn query_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b' ' => out.push_str("%20"),
            other => out.push_str(&format!("%{other:02X}")),
        }
    }
    out
}
