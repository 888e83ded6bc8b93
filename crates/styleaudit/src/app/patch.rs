//! Build-flag patching for Angular-style workspace files.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::domain::errors::PatchError;
use crate::infra::config::Config;

/// Keys leading from a project entry to its build configurations.
const BUILD_CONFIGURATIONS: [&str; 3] = ["architect", "build", "configurations"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    pub file: PathBuf,
    pub project: String,
    pub flags: Vec<String>,
}

impl PatchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            file: config.patch.file(),
            project: config.patch.project(),
            flags: config.patch.flags(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOutcome {
    pub file: PathBuf,
    /// Flags whose value actually changed.
    pub changed: Vec<String>,
}

/// Set every flag in `flags` to `true` under
/// `projects.<project>.architect.build.configurations`.
pub fn apply_build_flags(
    document: &mut Value,
    project: &str,
    flags: &[String],
) -> Result<Vec<String>, PatchError> {
    let mut path = String::from("projects");
    let mut current = child_object(document, "$", "projects")?;
    current = child_object_in(current, &path, project)?;
    path = format!("{path}.{project}");

    for key in BUILD_CONFIGURATIONS {
        current = child_object_in(current, &path, key)?;
        path = format!("{path}.{key}");
    }

    let mut changed = Vec::new();
    for flag in flags {
        let previous = current.insert(flag.clone(), Value::Bool(true));
        if previous != Some(Value::Bool(true)) {
            changed.push(flag.clone());
        }
    }
    Ok(changed)
}

/// Read, patch, and rewrite the workspace file with two-space indentation.
pub fn patch_file(options: &PatchOptions) -> Result<PatchOutcome> {
    let document = read_document(&options.file)?;
    let (rendered, changed) = patch_document(document, &options.project, &options.flags)
        .with_context(|| format!("failed to patch {}", options.file.display()))?;

    fs::write(&options.file, rendered)
        .with_context(|| format!("failed to write {}", options.file.display()))?;
    tracing::info!(file = %options.file.display(), changed = changed.len(), "patched build flags");

    Ok(PatchOutcome {
        file: options.file.clone(),
        changed,
    })
}

fn read_document(path: &Path) -> Result<Value> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&data).with_context(|| format!("invalid JSON in {}", path.display()))
}

fn patch_document(
    mut document: Value,
    project: &str,
    flags: &[String],
) -> Result<(String, Vec<String>)> {
    let changed = apply_build_flags(&mut document, project, flags)?;
    let mut rendered =
        serde_json::to_string_pretty(&document).context("failed to serialize patched JSON")?;
    rendered.push('\n');
    Ok((rendered, changed))
}

fn child_object<'a>(
    value: &'a mut Value,
    parent: &str,
    key: &str,
) -> Result<&'a mut Map<String, Value>, PatchError> {
    let object = value.as_object_mut().ok_or_else(|| PatchError::NotAnObject {
        path: parent.to_owned(),
    })?;
    child_object_in(object, parent, key)
}

fn child_object_in<'a>(
    object: &'a mut Map<String, Value>,
    parent: &str,
    key: &str,
) -> Result<&'a mut Map<String, Value>, PatchError> {
    object
        .get_mut(key)
        .ok_or_else(|| PatchError::MissingKey {
            parent: parent.to_owned(),
            key: key.to_owned(),
        })?
        .as_object_mut()
        .ok_or_else(|| PatchError::NotAnObject {
            path: format!("{parent}.{key}"),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flags() -> Vec<String> {
        vec!["sourceMap".into(), "namedChunks".into()]
    }

    fn workspace() -> Value {
        json!({
            "version": 1,
            "projects": {
                "app": {
                    "root": "",
                    "architect": {
                        "build": {
                            "builder": "@angular-devkit/build-angular:browser",
                            "configurations": {
                                "production": { "optimization": true },
                                "sourceMap": false
                            }
                        }
                    }
                }
            }
        })
    }

    #[test]
    fn sets_flags_under_configurations() {
        let mut document = workspace();
        let changed = apply_build_flags(&mut document, "app", &flags()).expect("patch applies");

        let configurations = &document["projects"]["app"]["architect"]["build"]["configurations"];
        assert_eq!(configurations["sourceMap"], json!(true));
        assert_eq!(configurations["namedChunks"], json!(true));
        assert_eq!(configurations["production"]["optimization"], json!(true));
        assert_eq!(changed, flags());
    }

    #[test]
    fn second_patch_changes_nothing() {
        let mut document = workspace();
        apply_build_flags(&mut document, "app", &flags()).expect("first patch");
        let changed = apply_build_flags(&mut document, "app", &flags()).expect("second patch");
        assert!(changed.is_empty());
    }

    #[test]
    fn missing_project_names_the_key() {
        let mut document = workspace();
        let err = apply_build_flags(&mut document, "admin", &flags()).expect_err("no such project");
        assert_eq!(
            err,
            PatchError::MissingKey {
                parent: "projects".into(),
                key: "admin".into()
            }
        );
    }

    #[test]
    fn non_object_configurations_is_rejected() {
        let mut document = json!({
            "projects": { "app": { "architect": { "build": { "configurations": [] } } } }
        });
        let err = apply_build_flags(&mut document, "app", &flags()).expect_err("array target");
        assert_eq!(
            err,
            PatchError::NotAnObject {
                path: "projects.app.architect.build.configurations".into()
            }
        );
    }

    #[test]
    fn patch_file_rewrites_with_two_space_indent_and_key_order() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("angular.json");
        fs::write(
            &file,
            r#"{"version": 1, "projects": {"app": {"architect": {"build": {"configurations": {"b": 1, "a": 2}}}}}}"#,
        )?;

        let outcome = patch_file(&PatchOptions {
            file: file.clone(),
            project: "app".into(),
            flags: flags(),
        })?;
        assert_eq!(outcome.changed.len(), 2);

        let written = fs::read_to_string(&file)?;
        let expected = r#"{
  "version": 1,
  "projects": {
    "app": {
      "architect": {
        "build": {
          "configurations": {
            "b": 1,
            "a": 2,
            "sourceMap": true,
            "namedChunks": true
          }
        }
      }
    }
  }
}
"#;
        assert_eq!(written, expected);
        Ok(())
    }

    #[test]
    fn missing_file_is_an_error() {
        let options = PatchOptions {
            file: PathBuf::from("does/not/exist/angular.json"),
            project: "app".into(),
            flags: flags(),
        };
        assert!(patch_file(&options).is_err());
    }
}
