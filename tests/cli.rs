//! End-to-end tests through the built binary in temporary sandboxes.

mod common;

use common::{run_scbake, snapshot_tree, stderr_of, stdout_of, tool_available};
use tempfile::TempDir;

#[test]
fn fresh_new_with_git_scaffolds_and_commits() {
    if !tool_available("git") {
        eprintln!("Skipping: git not available");
        return;
    }

    let sandbox = TempDir::new().unwrap();
    let output = run_scbake(sandbox.path(), &["new", "app", "--with", "git"]);
    assert!(
        output.status.success(),
        "new failed: {}",
        stderr_of(&output)
    );

    let app = sandbox.path().join("app");
    assert!(app.is_dir());
    assert!(app.join("scbake.toml").is_file());
    assert!(app.join(".git").is_dir());
    // The transaction scaffold must be gone after commit.
    assert!(!app.join(".scbake").exists());

    let manifest = std::fs::read_to_string(app.join("scbake.toml")).unwrap();
    assert!(manifest.contains("root-templates"), "manifest: {manifest}");
}

#[test]
fn new_refuses_an_existing_directory() {
    let sandbox = TempDir::new().unwrap();
    std::fs::create_dir(sandbox.path().join("taken")).unwrap();

    let output = run_scbake(sandbox.path(), &["new", "taken", "--with", "makefile"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("already exists"));
}

#[test]
fn dry_run_apply_echoes_the_plan_and_changes_nothing() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(sandbox.path().join("scbake.toml"), "").unwrap();
    let before = snapshot_tree(sandbox.path());

    let output = run_scbake(
        sandbox.path(),
        &["apply", "--dry-run", "--with", "makefile"],
    );
    assert!(
        output.status.success(),
        "dry-run failed: {}",
        stderr_of(&output)
    );

    let stdout = stdout_of(&output);
    assert!(stdout.contains("DRY RUN"), "stdout: {stdout}");
    assert!(stdout.contains("Create smart Makefile"), "stdout: {stdout}");

    assert_eq!(before, snapshot_tree(sandbox.path()));
    assert_eq!(
        std::fs::read_to_string(sandbox.path().join("scbake.toml")).unwrap(),
        ""
    );
}

#[test]
fn reapplying_a_template_without_force_fails_preexists() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(sandbox.path().join("scbake.toml"), "").unwrap();

    let first = run_scbake(sandbox.path(), &["apply", "--with", "makefile"]);
    assert!(first.status.success(), "first: {}", stderr_of(&first));
    let makefile = std::fs::read_to_string(sandbox.path().join("Makefile")).unwrap();
    let manifest = std::fs::read_to_string(sandbox.path().join("scbake.toml")).unwrap();
    assert!(!manifest.is_empty());

    let second = run_scbake(sandbox.path(), &["apply", "--with", "makefile"]);
    assert!(!second.status.success());
    assert!(
        stderr_of(&second).contains("already exists"),
        "stderr: {}",
        stderr_of(&second)
    );

    // Post-state equals post-first-run state.
    assert_eq!(
        std::fs::read_to_string(sandbox.path().join("Makefile")).unwrap(),
        makefile
    );
    assert_eq!(
        std::fs::read_to_string(sandbox.path().join("scbake.toml")).unwrap(),
        manifest
    );
    assert!(!sandbox.path().join(".scbake").exists());
}

#[test]
fn force_overwrites_an_existing_render_target() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(sandbox.path().join("scbake.toml"), "").unwrap();
    std::fs::write(sandbox.path().join("Makefile"), "stale").unwrap();

    let output = run_scbake(sandbox.path(), &["apply", "--force", "--with", "makefile"]);
    assert!(output.status.success(), "{}", stderr_of(&output));
    let makefile = std::fs::read_to_string(sandbox.path().join("Makefile")).unwrap();
    assert!(makefile.contains(".DEFAULT_GOAL"));
}

#[test]
fn unknown_template_exits_nonzero() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(sandbox.path().join("scbake.toml"), "").unwrap();

    let output = run_scbake(sandbox.path(), &["apply", "--with", "not-a-template"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("unknown template"));
    // Nothing was created or left behind.
    assert_eq!(snapshot_tree(sandbox.path()).len(), 1);
}

#[test]
fn apply_without_lang_or_templates_is_an_error() {
    let sandbox = TempDir::new().unwrap();
    let output = run_scbake(sandbox.path(), &["apply"]);
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("no language or templates"));
}

#[test]
fn list_json_reports_handlers_and_manifest() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(sandbox.path().join("scbake.toml"), "").unwrap();

    let output = run_scbake(sandbox.path(), &["list", "--json"]);
    assert!(output.status.success(), "{}", stderr_of(&output));

    let document: serde_json::Value = serde_json::from_str(&stdout_of(&output)).unwrap();
    let languages: Vec<&str> = document["languages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(languages.contains(&"go"));
    let templates: Vec<&str> = document["templates"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    assert!(templates.contains(&"git") && templates.contains(&"makefile"));
}

#[test]
fn multiple_templates_land_in_band_order() {
    let sandbox = TempDir::new().unwrap();
    std::fs::write(sandbox.path().join("scbake.toml"), "").unwrap();

    let output = run_scbake(
        sandbox.path(),
        &[
            "apply",
            "--dry-run",
            "--with",
            "makefile,editorconfig,ci_github",
        ],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));

    // ConfigUniversal (1000) < CI (1100) < BuildSystem (1400), regardless
    // of the order the templates were requested in.
    let stdout = stdout_of(&output);
    let editorconfig = stdout.find(".editorconfig").expect("editorconfig task");
    let ci = stdout.find("CI workflow").expect("ci task");
    let makefile = stdout.find("smart Makefile").expect("makefile task");
    assert!(editorconfig < ci && ci < makefile, "stdout: {stdout}");
}

#[test]
fn new_go_project_initializes_module_when_go_is_present() {
    if !tool_available("go") {
        eprintln!("Skipping: go not available");
        return;
    }

    let sandbox = TempDir::new().unwrap();
    let output = run_scbake(
        sandbox.path(),
        &["new", "gosvc", "--lang", "go", "--with", "makefile"],
    );
    assert!(output.status.success(), "{}", stderr_of(&output));

    let app = sandbox.path().join("gosvc");
    assert!(app.join("main.go").is_file());
    assert!(app.join("go.mod").is_file());
    assert!(app.join("Makefile").is_file());
    let go_mod = std::fs::read_to_string(app.join("go.mod")).unwrap();
    assert!(go_mod.contains("module gosvc"), "go.mod: {go_mod}");

    let manifest = std::fs::read_to_string(app.join("scbake.toml")).unwrap();
    assert!(manifest.contains("language = \"go\""), "manifest: {manifest}");
}
