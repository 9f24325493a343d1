//! Reading, writing, and merging the `scbake.toml` manifest.
//!
//! The manifest is the persistent source of truth for which projects and
//! tooling templates have been applied under a root. Loading discovers the
//! project root by walking upward; saving is atomic (temp file, fsync,
//! rename).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fsutil;

/// Root structure of the `scbake.toml` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub scbake_version: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub templates: Vec<TemplateRef>,
}

/// A distinct code unit, like a Go backend or a Svelte frontend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub path: String,
    pub language: String,
    #[serde(default)]
    pub templates: Vec<String>,
}

/// A root-level tooling template applied to the repo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRef {
    pub name: String,
    pub path: String,
}

impl Manifest {
    /// An in-memory manifest stamped with the build version, used when no
    /// file exists yet.
    pub fn empty() -> Self {
        Self {
            scbake_version: env!("CARGO_PKG_VERSION").to_string(),
            projects: Vec::new(),
            templates: Vec::new(),
        }
    }

    /// Merge pending changes in, skipping entries already present.
    /// Projects are keyed by `path`; templates by `(name, path)`.
    pub fn merge(&mut self, projects: Vec<Project>, templates: Vec<TemplateRef>) {
        for project in projects {
            if !self.projects.iter().any(|p| p.path == project.path) {
                self.projects.push(project);
            }
        }
        for template in templates {
            let dup = self
                .templates
                .iter()
                .any(|t| t.name == template.name && t.path == template.path);
            if !dup {
                self.templates.push(template);
            }
        }
    }
}

/// Look for `scbake.toml` or `.git` starting at `start_path` and walking up.
/// Falls back to the normalized start directory so `scbake new` works in a
/// fresh tree. A file argument is treated as its parent directory.
pub fn find_project_root(start_path: &Path) -> Result<PathBuf> {
    let mut start_dir = fsutil::abs_clean(start_path)?;
    if start_dir.is_file() {
        if let Some(parent) = start_dir.parent() {
            start_dir = parent.to_path_buf();
        }
    }

    let mut current = start_dir.clone();
    loop {
        if current.join(fsutil::MANIFEST_FILE_NAME).exists() {
            return Ok(current);
        }
        // Secondary marker: respect the git root in monorepos where the
        // manifest does not exist yet.
        if current.join(fsutil::GIT_DIR).exists() {
            return Ok(current);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }

    Ok(start_dir)
}

/// Read the manifest at the root discovered from `start_path`, or synthesize
/// an empty one if the file is absent. Returns the manifest together with the
/// discovered root.
pub fn load(start_path: &Path) -> Result<(Manifest, PathBuf)> {
    let root = find_project_root(start_path)?;
    let manifest_path = root.join(fsutil::MANIFEST_FILE_NAME);

    let data = match fs::read_to_string(&manifest_path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok((Manifest::empty(), root));
        }
        Err(err) => return Err(err.into()),
    };

    // An empty bootstrap file (written by `scbake new`) decodes to defaults.
    if data.trim().is_empty() {
        return Ok((Manifest::empty(), root));
    }

    let manifest: Manifest = toml::from_str(&data)?;
    Ok((manifest, root))
}

/// Atomically write the manifest to `scbake.toml` under `root`: temp file,
/// fsync, rename. The temp file is removed if anything fails before the
/// rename.
pub fn save(manifest: &Manifest, root: &Path) -> Result<()> {
    use std::os::unix::fs::OpenOptionsExt;

    let final_path = root.join(fsutil::MANIFEST_FILE_NAME);
    let temp_path = root.join(format!("{}.tmp", fsutil::MANIFEST_FILE_NAME));

    let encoded = toml::to_string_pretty(manifest)?;

    let result = (|| -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(fsutil::PRIVATE_FILE_MODE)
            .open(&temp_path)?;
        file.write_all(encoded.as_bytes())?;
        file.sync_all()?;
        drop(file);
        fs::rename(&temp_path, &final_path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

/// Derive a project/module name from a path: base name, lowercased, spaces
/// replaced with hyphens. Pure `.` or `/` inputs resolve through the
/// absolute form first.
pub fn sanitize_project_name(path: &Path) -> Result<String> {
    let base = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            let abs = fsutil::abs_clean(path)?;
            abs.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| abs.display().to_string())
        }
    };
    Ok(base.to_lowercase().replace(' ', "-"))
}
