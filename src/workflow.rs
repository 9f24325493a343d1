//! Orchestration of a scaffolding run: root discovery, transaction scope,
//! plan assembly, execution, and manifest persistence.
//!
//! The atomicity contract lives here. A transaction is opened before any
//! task runs; if anything afterwards fails, the rollback restores the
//! pre-run filesystem before the error reaches the user.

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};

use crate::executor;
use crate::fsutil;
use crate::handlers::{self, Registry};
use crate::manifest::{self, Manifest, Project, TemplateRef};
use crate::preflight;
use crate::reporter::Reporter;
use crate::task::{Plan, TaskContext};
use crate::transaction::TransactionManager;

/// Orchestration milestones per `apply` run, for step numbering.
pub const APPLY_TOTAL_STEPS: usize = 5;

/// Extra milestones `new` adds in front of the embedded apply.
pub const NEW_EXTRA_STEPS: usize = 2;

/// Sentinel template-group name recorded in the manifest for `--with` runs.
const ROOT_TEMPLATES_GROUP: &str = "root-templates";

/// All the flags and arguments for one scaffolding run.
pub struct RunRequest {
    pub lang: Option<String>,
    pub with: Vec<String>,
    /// Absolute path tasks execute in.
    pub target_path: PathBuf,
    /// The path argument as given, recorded in the manifest so entries stay
    /// portable across checkouts.
    pub manifest_path_arg: String,
    pub dry_run: bool,
    pub force: bool,
}

/// Manifest entries a run will add once it succeeds.
#[derive(Default)]
struct ManifestChanges {
    projects: Vec<Project>,
    templates: Vec<TemplateRef>,
}

/// The main logic behind `scbake apply` (and the second half of `new`).
pub fn run_apply(
    request: &RunRequest,
    registry: &Registry,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    reporter.step("📖", "Loading manifest (scbake.toml)...");
    let (manifest, root_path) = manifest::load(&request.target_path)
        .with_context(|| format!("failed to load {}", fsutil::MANIFEST_FILE_NAME))?;

    // The safety net: opened before any task runs, rolled back on any
    // error below, neutralized by the explicit commit at the end.
    let tx = if request.dry_run {
        None
    } else {
        Some(TransactionManager::new(&root_path).context("initialize transaction manager")?)
    };

    reporter.step("📝", "Building execution plan...");
    let requested_templates = dedupe(&request.with);
    let (mut plan, changes) = build_plan(request, &requested_templates, registry)?;

    // Shallow future view: pending entries merged in, so templates rendered
    // during this run can already see their own project entry.
    let mut future_manifest = manifest.clone();
    future_manifest.merge(changes.projects.clone(), changes.templates.clone());

    let ctx = TaskContext {
        cancelled: Arc::new(AtomicBool::new(false)),
        target_path: fsutil::abs_clean(&request.target_path)?,
        manifest: &future_manifest,
        dry_run: request.dry_run,
        force: request.force,
        tx: tx.as_ref(),
    };

    if request.dry_run {
        println!("DRY RUN: No changes will be made.");
        println!("Plan contains the following tasks:");
        return executor::execute(&mut plan, &ctx, reporter).map_err(Into::into);
    }

    let tx = tx.as_ref().expect("transaction present outside dry-run");
    let outcome =
        execute_and_finalize(&mut plan, &ctx, manifest, changes, &root_path, tx, reporter);
    match outcome {
        Ok(()) => Ok(()),
        Err(err) => match tx.rollback() {
            Ok(()) => Err(err),
            // Never swallow the original failure; attach the rollback
            // aggregate so the user learns which paths need attention.
            Err(rollback_err) => Err(err.context(rollback_err.to_string())),
        },
    }
}

/// Run the plan, persist the manifest, and commit. Any error here leaves
/// the rollback in `run_apply` armed.
fn execute_and_finalize(
    plan: &mut Plan,
    ctx: &TaskContext,
    mut manifest: Manifest,
    changes: ManifestChanges,
    root_path: &Path,
    tx: &TransactionManager,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    reporter.step("🚀", "Executing plan...");
    executor::execute(plan, ctx, reporter).context("task execution failed")?;

    reporter.step("✍️", "Updating manifest...");
    manifest.merge(changes.projects, changes.templates);

    // Track the manifest before saving so a failure between the save and
    // the commit still rolls the file back in sync with the tree.
    let manifest_path = root_path.join(fsutil::MANIFEST_FILE_NAME);
    tx.track(&manifest_path)
        .context("failed to track manifest file")?;
    manifest::save(&manifest, root_path).context("manifest save failed")?;

    reporter.step("✅", "Committing transaction...");
    // Point of no return: the backups are deleted.
    tx.commit().context("failed to commit transaction")?;
    Ok(())
}

fn build_plan(
    request: &RunRequest,
    requested_templates: &[String],
    registry: &Registry,
) -> Result<(Plan, ManifestChanges)> {
    let mut plan = Plan::default();
    let mut changes = ManifestChanges::default();

    if let Some(lang) = &request.lang {
        preflight::check_binaries(handlers::required_binaries(lang))?;

        let lang_tasks = registry
            .lang(lang)?
            .tasks(&request.target_path)
            .with_context(|| format!("failed to get tasks for lang '{lang}'"))?;
        plan.tasks.extend(lang_tasks);

        let project_name = manifest::sanitize_project_name(&request.target_path)
            .context("could not determine project name")?;
        changes.projects.push(Project {
            name: project_name,
            path: request.manifest_path_arg.clone(),
            language: lang.clone(),
            templates: Vec::new(),
        });
    }

    if !requested_templates.is_empty() {
        for template_name in requested_templates {
            let template_tasks = registry
                .template(template_name)?
                .tasks(&request.target_path)
                .with_context(|| {
                    format!("failed to get tasks for template '{template_name}'")
                })?;
            plan.tasks.extend(template_tasks);
        }
        changes.templates.push(TemplateRef {
            name: ROOT_TEMPLATES_GROUP.to_string(),
            path: request.manifest_path_arg.clone(),
        });
    }

    if request.lang.is_none() && requested_templates.is_empty() {
        return Err(anyhow!(
            "no language or templates specified. Use --lang or --with"
        ));
    }

    Ok((plan, changes))
}

/// Drop duplicate template names while keeping first-seen order, so a
/// repeated `--with` entry cannot double its tasks.
fn dedupe(requested: &[String]) -> Vec<String> {
    let mut seen = std::collections::BTreeSet::new();
    requested
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// The logic behind `scbake new`: create the directory, bootstrap an empty
/// manifest so root discovery anchors there, then apply into it. On failure
/// the directory is removed again, but only if this run created it.
pub fn run_new(
    project_name: &str,
    lang: Option<String>,
    with: Vec<String>,
    dry_run: bool,
    force: bool,
    registry: &Registry,
    reporter: &mut dyn Reporter,
) -> Result<()> {
    let target_path = fsutil::abs_clean(Path::new(project_name))?;
    if target_path.exists() {
        return Err(anyhow!("directory '{project_name}' already exists"));
    }

    reporter.step("📁", &format!("Creating directory: {project_name}"));
    let mut dir_created = false;
    let outcome = (|| -> Result<()> {
        if !dry_run {
            fsutil::create_dir_all_secure(&target_path)
                .with_context(|| format!("failed to create '{project_name}'"))?;
            dir_created = true;
            bootstrap_manifest(&target_path)?;
        }

        reporter.step("🚀", "Applying templates...");
        let request = RunRequest {
            lang,
            with,
            target_path: target_path.clone(),
            manifest_path_arg: ".".to_string(),
            dry_run,
            force,
        };
        run_apply(&request, registry, reporter)
    })();

    if outcome.is_err() && dir_created {
        eprintln!("Cleaning up failed project directory '{project_name}'...");
        let _ = std::fs::remove_dir_all(&target_path);
    }
    outcome
}

/// Write an empty manifest so the engine can find the project root.
fn bootstrap_manifest(target_path: &Path) -> Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let path = target_path.join(fsutil::MANIFEST_FILE_NAME);
    std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .mode(fsutil::PRIVATE_FILE_MODE)
        .open(&path)
        .with_context(|| format!("failed to bootstrap manifest at {}", path.display()))?;
    Ok(())
}

/// The logic behind `scbake list`: registered handlers plus whatever the
/// discovered manifest records.
pub fn run_list(start_path: &Path, json: bool, registry: &Registry) -> Result<()> {
    let (manifest, root_path) = manifest::load(start_path)
        .with_context(|| format!("failed to load {}", fsutil::MANIFEST_FILE_NAME))?;

    if json {
        let document = serde_json::json!({
            "root": root_path,
            "languages": registry.lang_names(),
            "templates": registry.template_names(),
            "manifest": manifest,
        });
        println!("{}", serde_json::to_string_pretty(&document)?);
        return Ok(());
    }

    println!("Supported languages: {}", registry.lang_names().join(", "));
    println!("Supported templates: {}", registry.template_names().join(", "));
    println!();
    println!("Project root: {}", root_path.display());
    if manifest.projects.is_empty() {
        println!("No projects recorded in {}.", fsutil::MANIFEST_FILE_NAME);
    } else {
        println!("Projects:");
        for project in &manifest.projects {
            println!(
                "  {} ({}) at {}",
                project.name, project.language, project.path
            );
        }
    }
    if !manifest.templates.is_empty() {
        println!("Applied template groups:");
        for template in &manifest.templates {
            println!("  {} at {}", template.name, template.path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
