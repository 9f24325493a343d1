//! Language pack for Svelte (Vite) projects.

use std::path::Path;

use crate::error::Result;
use crate::handlers::Handler;
use crate::priority;
use crate::task::Task;

pub struct SvelteHandler;

impl Handler for SvelteHandler {
    fn tasks(&self, target_path: &Path) -> Result<Vec<Task>> {
        let mut plan = Vec::new();
        let dir_seq = priority::DIR_CREATE.sequence();
        let lang_seq = priority::LANG_SETUP.sequence();

        // The npm tasks run with cwd = target, so the directory must exist
        // before the language band starts.
        plan.push(Task::CreateDirectory {
            path: target_path.to_path_buf(),
            description: format!("Create project directory '{}'", target_path.display()),
            priority: dir_seq.next()?,
        });

        // An existing package.json means the project is already
        // initialized; leave it alone.
        if target_path.join("package.json").exists() {
            return Ok(plan);
        }

        plan.push(Task::ExecCommand {
            cmd: "npm".to_string(),
            args: vec![
                "create".into(),
                "vite@latest".into(),
                // "." scaffolds into the (empty) target directory; "--"
                // bypasses the interactive prompts.
                ".".into(),
                "--".into(),
                "--template".into(),
                "svelte".into(),
            ],
            predicted_created: vec![
                "package.json".into(),
                "index.html".into(),
                "vite.config.js".into(),
                "svelte.config.js".into(),
                "jsconfig.json".into(),
                "src".into(),
                "public".into(),
                "README.md".into(),
                ".vscode".into(),
                ".gitignore".into(),
            ],
            run_in_target: true,
            description: "Run npm create vite@latest .".to_string(),
            priority: lang_seq.next()?,
        });
        plan.push(Task::ExecCommand {
            cmd: "npm".to_string(),
            args: vec!["install".into()],
            predicted_created: vec!["node_modules".into(), "package-lock.json".into()],
            run_in_target: true,
            description: "Run npm install".to_string(),
            priority: lang_seq.next()?,
        });
        // Pin the standard script names so `npm run build` keeps working
        // even if the upstream template renames its defaults.
        plan.push(Task::ExecCommand {
            cmd: "npm".to_string(),
            args: vec![
                "pkg".into(),
                "set".into(),
                "scripts.dev=vite".into(),
                "scripts.build=vite build".into(),
                "scripts.preview=vite preview".into(),
                "scripts.check=svelte-check --tsconfig ./tsconfig.json".into(),
            ],
            predicted_created: Vec::new(),
            run_in_target: true,
            description: "Ensure standard NPM scripts are set".to_string(),
            priority: lang_seq.next()?,
        });

        Ok(plan)
    }
}
