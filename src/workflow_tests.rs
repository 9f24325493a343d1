use super::*;
use crate::error::Result as CoreResult;
use crate::handlers::Handler;
use crate::reporter::RecordingReporter;
use crate::task::Task;
use crate::template::TemplateBundle;
use std::fs;
use tempfile::TempDir;

static MOCK_TEMPLATES: TemplateBundle = TemplateBundle::new(&[
    ("step1.tpl", "step one v{{ scbake_version }}\n"),
    ("ok.tpl", "all good\n"),
]);

/// Writes one file successfully, then fails on a doomed command.
struct StepThenFailHandler;

impl Handler for StepThenFailHandler {
    fn tasks(&self, _target_path: &Path) -> CoreResult<Vec<Task>> {
        Ok(vec![
            Task::RenderTemplate {
                bundle: &MOCK_TEMPLATES,
                template_id: "step1.tpl",
                output_path: "step1.txt".to_string(),
                description: "Write step1.txt".to_string(),
                priority: 1000,
            },
            Task::ExecCommand {
                cmd: "sh".to_string(),
                args: vec!["-c".into(), "exit 7".into()],
                predicted_created: Vec::new(),
                run_in_target: true,
                description: "Doomed command".to_string(),
                priority: 1001,
            },
        ])
    }
}

/// Renders a single file; the well-behaved mock.
struct OkHandler;

impl Handler for OkHandler {
    fn tasks(&self, _target_path: &Path) -> CoreResult<Vec<Task>> {
        Ok(vec![Task::RenderTemplate {
            bundle: &MOCK_TEMPLATES,
            template_id: "ok.tpl",
            output_path: "ok.txt".to_string(),
            description: "Write ok.txt".to_string(),
            priority: 1000,
        }])
    }
}

fn registry_with_mocks() -> Registry {
    let mut registry = Registry::builtin();
    registry.register_template("boom", Box::new(StepThenFailHandler));
    registry.register_template("mock", Box::new(OkHandler));
    registry.register_lang("mocklang", Box::new(OkHandler));
    registry
}

fn request(root: &Path, lang: Option<&str>, with: &[&str], dry_run: bool) -> RunRequest {
    RunRequest {
        lang: lang.map(String::from),
        with: with.iter().map(|s| s.to_string()).collect(),
        target_path: fsutil::abs_clean(root).unwrap(),
        manifest_path_arg: ".".to_string(),
        dry_run,
        force: false,
    }
}

fn bootstrap_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(fsutil::MANIFEST_FILE_NAME), "").unwrap();
    dir
}

#[test]
fn create_then_fail_rolls_everything_back() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();
    let mut reporter = RecordingReporter::default();

    let err = run_apply(&request(root.path(), None, &["boom"], false), &registry, &mut reporter)
        .unwrap_err();
    assert!(format!("{err:#}").contains("Doomed command"));

    assert!(!root.path().join("step1.txt").exists());
    assert_eq!(
        fs::read_to_string(root.path().join(fsutil::MANIFEST_FILE_NAME)).unwrap(),
        ""
    );
    assert!(!root.path().join(fsutil::INTERNAL_DIR).exists());
}

#[test]
fn successful_apply_writes_manifest_and_commits() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();
    let mut reporter = RecordingReporter::default();

    run_apply(&request(root.path(), None, &["mock"], false), &registry, &mut reporter).unwrap();

    assert_eq!(
        fs::read_to_string(root.path().join("ok.txt")).unwrap(),
        "all good\n"
    );
    let (manifest, _) = manifest::load(root.path()).unwrap();
    assert_eq!(manifest.templates.len(), 1);
    assert_eq!(manifest.templates[0].name, "root-templates");
    assert_eq!(manifest.templates[0].path, ".");
    assert!(!root.path().join(fsutil::INTERNAL_DIR).exists());
}

#[test]
fn language_runs_record_a_project_entry() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();
    let mut reporter = RecordingReporter::default();

    run_apply(
        &request(root.path(), Some("mocklang"), &[], false),
        &registry,
        &mut reporter,
    )
    .unwrap();

    let (manifest, _) = manifest::load(root.path()).unwrap();
    assert_eq!(manifest.projects.len(), 1);
    assert_eq!(manifest.projects[0].language, "mocklang");
    assert_eq!(manifest.projects[0].path, ".");
    assert!(!manifest.projects[0].name.is_empty());
}

#[test]
fn reapplying_merges_rather_than_duplicates() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();

    let mut reporter = RecordingReporter::default();
    run_apply(
        &request(root.path(), Some("mocklang"), &[], false),
        &registry,
        &mut reporter,
    )
    .unwrap();

    // Second run with force so the render may overwrite.
    let mut second = request(root.path(), Some("mocklang"), &[], false);
    second.force = true;
    let mut reporter = RecordingReporter::default();
    run_apply(&second, &registry, &mut reporter).unwrap();

    let (manifest, _) = manifest::load(root.path()).unwrap();
    assert_eq!(manifest.projects.len(), 1);
}

#[test]
fn repeated_template_names_are_deduplicated() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();
    let mut reporter = RecordingReporter::default();

    run_apply(
        &request(root.path(), None, &["mock", "mock"], false),
        &registry,
        &mut reporter,
    )
    .unwrap();
    assert_eq!(reporter.started, vec!["Write ok.txt"]);
}

#[test]
fn dry_run_reports_the_plan_without_touching_disk() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();
    let mut reporter = RecordingReporter::default();

    run_apply(&request(root.path(), None, &["boom"], true), &registry, &mut reporter).unwrap();

    assert_eq!(reporter.started, vec!["Write step1.txt", "Doomed command"]);
    assert!(!root.path().join("step1.txt").exists());
    assert_eq!(
        fs::read_to_string(root.path().join(fsutil::MANIFEST_FILE_NAME)).unwrap(),
        ""
    );
    assert!(!root.path().join(fsutil::INTERNAL_DIR).exists());
}

#[test]
fn second_apply_without_force_fails_preexists_and_restores() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();

    let mut reporter = RecordingReporter::default();
    run_apply(&request(root.path(), None, &["mock"], false), &registry, &mut reporter).unwrap();
    let manifest_after_first =
        fs::read_to_string(root.path().join(fsutil::MANIFEST_FILE_NAME)).unwrap();

    let mut reporter = RecordingReporter::default();
    let err = run_apply(&request(root.path(), None, &["mock"], false), &registry, &mut reporter)
        .unwrap_err();
    assert!(format!("{err:#}").contains("already exists"));

    // Post-state equals post-first-run state.
    assert_eq!(
        fs::read_to_string(root.path().join("ok.txt")).unwrap(),
        "all good\n"
    );
    assert_eq!(
        fs::read_to_string(root.path().join(fsutil::MANIFEST_FILE_NAME)).unwrap(),
        manifest_after_first
    );
}

#[test]
fn unknown_template_fails_before_any_task() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();
    let mut reporter = RecordingReporter::default();

    let err = run_apply(
        &request(root.path(), None, &["no-such-template"], false),
        &registry,
        &mut reporter,
    )
    .unwrap_err();
    assert!(format!("{err:#}").contains("unknown template"));
    assert!(reporter.started.is_empty());
}

#[test]
fn empty_request_is_rejected() {
    let root = bootstrap_root();
    let registry = registry_with_mocks();
    let mut reporter = RecordingReporter::default();

    let err = run_apply(&request(root.path(), None, &[], false), &registry, &mut reporter)
        .unwrap_err();
    assert!(format!("{err:#}").contains("no language or templates"));
}

#[test]
fn dedupe_keeps_first_seen_order() {
    let input = vec![
        "b".to_string(),
        "a".to_string(),
        "b".to_string(),
        "c".to_string(),
        "a".to_string(),
    ];
    assert_eq!(dedupe(&input), vec!["b", "a", "c"]);
}
