//! Task producers for language packs and tooling templates.
//!
//! A handler turns a target path into a list of tasks; it never sees the
//! transaction or the engine. Handlers are addressed by name through a
//! [`Registry`], which tests can extend with mocks.

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::task::Task;

mod ci_github;
mod devcontainer;
mod editorconfig;
mod git;
mod go_linter;
mod golang;
mod makefile;
mod maven_linter;
mod spring;
mod svelte;
mod svelte_linter;

/// A producer of tasks for one language or tooling concern.
pub trait Handler {
    fn tasks(&self, target_path: &Path) -> Result<Vec<Task>>;
}

/// Name-addressable maps of language and template handlers.
pub struct Registry {
    langs: BTreeMap<String, Box<dyn Handler>>,
    templates: BTreeMap<String, Box<dyn Handler>>,
}

impl Registry {
    /// The registry with every built-in handler installed.
    pub fn builtin() -> Self {
        let mut registry = Self {
            langs: BTreeMap::new(),
            templates: BTreeMap::new(),
        };
        registry.register_lang("go", Box::new(golang::GoHandler));
        registry.register_lang("svelte", Box::new(svelte::SvelteHandler));
        registry.register_lang("spring", Box::new(spring::SpringHandler));

        registry.register_template("editorconfig", Box::new(editorconfig::EditorconfigHandler));
        registry.register_template("ci_github", Box::new(ci_github::CiGithubHandler));
        registry.register_template("go_linter", Box::new(go_linter::GoLinterHandler));
        registry.register_template("svelte_linter", Box::new(svelte_linter::SvelteLinterHandler));
        registry.register_template("maven_linter", Box::new(maven_linter::MavenLinterHandler));
        registry.register_template("makefile", Box::new(makefile::MakefileHandler));
        registry.register_template("devcontainer", Box::new(devcontainer::DevcontainerHandler));
        registry.register_template("git", Box::new(git::GitHandler));
        registry
    }

    /// Install or replace a language handler. Tests use this to inject
    /// mocks and failure cases.
    pub fn register_lang(&mut self, name: &str, handler: Box<dyn Handler>) {
        self.langs.insert(name.to_string(), handler);
    }

    /// Install or replace a template handler.
    pub fn register_template(&mut self, name: &str, handler: Box<dyn Handler>) {
        self.templates.insert(name.to_string(), handler);
    }

    pub fn lang(&self, name: &str) -> Result<&dyn Handler> {
        self.langs
            .get(name)
            .map(|handler| &**handler)
            .ok_or_else(|| Error::UnknownLanguage(name.to_string()))
    }

    pub fn template(&self, name: &str) -> Result<&dyn Handler> {
        self.templates
            .get(name)
            .map(|handler| &**handler)
            .ok_or_else(|| Error::UnknownTemplate(name.to_string()))
    }

    /// Sorted names of the registered language packs.
    pub fn lang_names(&self) -> Vec<&str> {
        self.langs.keys().map(String::as_str).collect()
    }

    /// Sorted names of the registered tooling templates.
    pub fn template_names(&self) -> Vec<&str> {
        self.templates.keys().map(String::as_str).collect()
    }
}

/// External binaries a language pack shells out to, checked before any task
/// runs.
pub fn required_binaries(lang: &str) -> &'static [&'static str] {
    match lang {
        "go" => &["go"],
        "svelte" => &["npm"],
        "spring" => &["curl", "unzip", "java"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_knows_every_handler() {
        let registry = Registry::builtin();
        assert_eq!(registry.lang_names(), vec!["go", "spring", "svelte"]);
        assert_eq!(
            registry.template_names(),
            vec![
                "ci_github",
                "devcontainer",
                "editorconfig",
                "git",
                "go_linter",
                "makefile",
                "maven_linter",
                "svelte_linter",
            ]
        );
    }

    #[test]
    fn unknown_names_are_typed_errors() {
        let registry = Registry::builtin();
        assert!(matches!(
            registry.lang("cobol"),
            Err(Error::UnknownLanguage(name)) if name == "cobol"
        ));
        assert!(matches!(
            registry.template("zz"),
            Err(Error::UnknownTemplate(name)) if name == "zz"
        ));
    }

    #[test]
    fn every_builtin_task_stays_inside_its_band() {
        use crate::priority;

        let bands = [
            priority::DIR_CREATE,
            priority::LANG_SETUP,
            priority::CONFIG_UNIVERSAL,
            priority::CI,
            priority::LINTER,
            priority::BUILD_SYSTEM,
            priority::DEV_ENV,
            priority::VERSION_CONTROL,
        ];
        let in_some_band = |p: u32| {
            bands
                .iter()
                .any(|band| p >= band.base && (band.ceiling == 0 || p <= band.ceiling))
        };

        let registry = Registry::builtin();
        let target = std::env::temp_dir().join("scbake-band-check");
        for name in registry.template_names() {
            let tasks = registry.template(name).unwrap().tasks(&target).unwrap();
            assert!(!tasks.is_empty(), "template '{name}' produced no tasks");
            for task in tasks {
                assert!(
                    in_some_band(task.priority()),
                    "template '{name}' task '{}' has out-of-band priority {}",
                    task.description(),
                    task.priority()
                );
            }
        }
        for name in registry.lang_names() {
            let tasks = registry.lang(name).unwrap().tasks(&target).unwrap();
            assert!(!tasks.is_empty(), "lang '{name}' produced no tasks");
            for task in tasks {
                assert!(in_some_band(task.priority()));
            }
        }
    }
}
