//! Crate-wide error kinds.
//!
//! The core modules return these typed variants so callers and tests can
//! match on the failure class; the workflow and CLI boundaries wrap them
//! with `anyhow` context.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for core scaffolding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the scaffolding core.
#[derive(Debug, Error)]
pub enum Error {
    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required external binary was not found on `$PATH`.
    #[error("'{0}' command not found in $PATH. Please install it to continue")]
    PreflightMissingTool(String),

    /// The requested language pack is not registered.
    #[error("unknown language: {0}")]
    UnknownLanguage(String),

    /// The requested tooling template is not registered.
    #[error("unknown template: {0}")]
    UnknownTemplate(String),

    /// A priority sequence ran past its band ceiling.
    #[error("priority sequence exceeded band ceiling: {current} > {ceiling}")]
    BandExceeded { current: u32, ceiling: u32 },

    /// A tracked or written path resolves outside the project root.
    #[error("refusing to touch path '{path}' outside project root '{root}'")]
    PathEscape { path: PathBuf, root: PathBuf },

    /// A render target already exists and `--force` was not given.
    #[error("file already exists: {0}. Use --force to overwrite")]
    Preexists(String),

    /// An external command exited non-zero or was cancelled.
    #[error("command '{command}' failed ({status}): {stderr_tail}")]
    Subprocess {
        command: String,
        status: String,
        stderr_tail: String,
    },

    /// A named template is missing from its embedded bundle.
    #[error("no embedded template named '{0}'")]
    TemplateMissing(String),

    /// A template placeholder could not be resolved against the manifest.
    #[error("template '{template}': unresolved placeholder '{placeholder}'")]
    TemplateRender {
        template: String,
        placeholder: String,
    },

    /// The manifest file could not be decoded.
    #[error("failed to decode manifest: {0}")]
    ManifestDecode(#[from] toml::de::Error),

    /// The manifest could not be encoded for saving.
    #[error("failed to encode manifest: {0}")]
    ManifestEncode(#[from] toml::ser::Error),

    /// One or more undo steps failed; the filesystem is in a best-effort
    /// state and the listed paths need manual attention.
    #[error("rollback completed with errors: {}", .0.join("; "))]
    RollbackPartial(Vec<String>),

    /// Task execution failed; wraps the underlying error with the task
    /// description for the user-facing report.
    #[error("task failed ({description}): {source}")]
    Task {
        description: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap a task failure with its human-readable description.
    pub fn task(description: impl Into<String>, source: Error) -> Self {
        Self::Task {
            description: description.into(),
            source: Box::new(source),
        }
    }
}
