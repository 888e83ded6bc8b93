//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".styleaudit/config.toml";

/// Layered configuration loaded from defaults, user, workspace, explicit file, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub ignore: Ignore,
    #[serde(default)]
    pub patch: Patch,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Defaults {
    #[serde(default = "Defaults::default_style_extension")]
    pub style_extension: String,
    #[serde(default = "Defaults::default_output_stem")]
    pub output_stem: String,
    #[serde(default = "Defaults::default_report_format")]
    pub report_format: String,
}

impl Defaults {
    fn default_style_extension() -> String {
        "scss".into()
    }

    fn default_output_stem() -> String {
        "newStyle".into()
    }

    fn default_report_format() -> String {
        "text".into()
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            style_extension: Self::default_style_extension(),
            output_stem: Self::default_output_stem(),
            report_format: Self::default_report_format(),
        }
    }
}

/// Selectors that are never reported as unused, as glob patterns over selector names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Ignore {
    #[serde(default)]
    pub selectors: Vec<String>,
}

/// Target of `patch-config`. Unset fields fall back to the built-in defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Patch {
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    project: Option<String>,
    #[serde(default)]
    flags: Option<Vec<String>>,
}

impl Patch {
    fn default_file() -> &'static str {
        "angular.json"
    }

    fn default_project() -> &'static str {
        "app"
    }

    fn default_flags() -> Vec<String> {
        vec!["sourceMap".into(), "namedChunks".into()]
    }

    pub fn file(&self) -> PathBuf {
        PathBuf::from(self.file.as_deref().unwrap_or(Self::default_file()))
    }

    pub fn project(&self) -> String {
        self.project
            .clone()
            .unwrap_or_else(|| Self::default_project().to_owned())
    }

    pub fn flags(&self) -> Vec<String> {
        self.flags.clone().unwrap_or_else(Self::default_flags)
    }
}

/// Environment overrides for the audit defaults.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    style_extension: Option<String>,
    output_stem: Option<String>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            style_extension: env::var("STYLEAUDIT_STYLE_EXTENSION").ok(),
            output_stem: env::var("STYLEAUDIT_OUTPUT_STEM").ok(),
        }
    }

    #[cfg(test)]
    fn for_tests(style_extension: &str, output_stem: &str) -> Self {
        Self {
            style_extension: Some(style_extension.to_owned()),
            output_stem: Some(output_stem.to_owned()),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user config, workspace config, an optional
    /// explicit file, and env overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit
            && !path.exists()
        {
            anyhow::bail!("config file not found: {}", path.display());
        }

        let env = EnvOverrides::from_env();
        let layers = [
            global_config_path(),
            workspace_config_path()?,
            explicit.map(Path::to_path_buf),
        ];
        Self::load_with_layers(&layers, env)
    }

    fn load_with_layers(paths: &[Option<PathBuf>], env_overrides: EnvOverrides) -> Result<Self> {
        let mut layers: Vec<Config> = vec![Self::from_str(&DEFAULT_CONFIG)?];

        for path in paths.iter().flatten().filter(|path| path.exists()) {
            tracing::debug!(path = %path.display(), "loading config layer");
            layers.push(Self::from_file(path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            defaults: merge_defaults(self.defaults, other.defaults),
            ignore: merge_ignore(self.ignore, other.ignore),
            patch: merge_patch(self.patch, other.patch),
        }
    }
}

fn merge_defaults(base: Defaults, overlay: Defaults) -> Defaults {
    Defaults {
        style_extension: choose(
            base.style_extension,
            overlay.style_extension,
            Defaults::default_style_extension,
        ),
        output_stem: choose(base.output_stem, overlay.output_stem, Defaults::default_output_stem),
        report_format: choose(
            base.report_format,
            overlay.report_format,
            Defaults::default_report_format,
        ),
    }
}

fn merge_ignore(base: Ignore, overlay: Ignore) -> Ignore {
    let mut selectors: BTreeSet<String> = base.selectors.into_iter().collect();
    selectors.extend(overlay.selectors);

    Ignore {
        selectors: selectors.into_iter().collect(),
    }
}

fn merge_patch(mut base: Patch, overlay: Patch) -> Patch {
    if let Some(value) = overlay.file {
        base.file = Some(value);
    }
    if let Some(value) = overlay.project {
        base.project = Some(value);
    }
    if let Some(value) = overlay.flags {
        base.flags = Some(value);
    }
    base
}

fn choose(base: String, overlay: String, default_fn: fn() -> String) -> String {
    if overlay != default_fn() {
        overlay
    } else {
        base
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("styleaudit/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(style_extension) = env.style_extension {
        config.defaults.style_extension = style_extension;
    }
    if let Some(output_stem) = env.output_stem {
        config.defaults.output_stem = output_stem;
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_uses_defaults_when_no_files() {
        let config =
            Config::load_with_layers(&[None, None], EnvOverrides::default()).expect("load default config");
        assert_eq!(config.defaults.style_extension, "scss");
        assert_eq!(config.defaults.output_stem, "newStyle");
        assert!(config.ignore.selectors.contains(&"*-webkit-scrollbar*".into()));
        assert_eq!(config.patch.file(), PathBuf::from("angular.json"));
        assert_eq!(config.patch.project(), "app");
        assert_eq!(config.patch.flags(), vec!["sourceMap", "namedChunks"]);
    }

    #[test]
    fn merge_global_and_workspace() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let global = temp.path().join("config.toml");
        fs::write(
            &global,
            r#"
[defaults]
style_extension = "css"
[ignore]
selectors = ["legacy-*"]
"#,
        )?;

        let workspace_dir = temp.path().join("repo");
        fs::create_dir_all(workspace_dir.join(".styleaudit"))?;
        fs::write(
            workspace_dir.join(".styleaudit/config.toml"),
            r#"
[defaults]
output_stem = "trimmed"
[patch]
project = "storefront"
"#,
        )?;

        let layers = [Some(global), Some(workspace_dir.join(".styleaudit/config.toml"))];
        let config = Config::load_with_layers(&layers, EnvOverrides::default())?;

        assert_eq!(config.defaults.style_extension, "css");
        assert_eq!(config.defaults.output_stem, "trimmed");
        assert!(config.ignore.selectors.contains(&"legacy-*".into()));
        assert!(config.ignore.selectors.contains(&":root".into()));
        assert_eq!(config.patch.project(), "storefront");
        assert_eq!(config.patch.file(), PathBuf::from("angular.json"));
        Ok(())
    }

    #[test]
    fn env_overrides_take_precedence() -> Result<()> {
        let overrides = EnvOverrides::for_tests("less", "lean");
        let config = Config::load_with_layers(&[], overrides)?;
        assert_eq!(config.defaults.style_extension, "less");
        assert_eq!(config.defaults.output_stem, "lean");
        Ok(())
    }

    #[test]
    fn invalid_config_returns_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let file = temp.path().join("broken.toml");
        fs::write(&file, "this is not toml")?;
        let result = Config::from_file(&file);
        assert!(result.is_err());
        Ok(())
    }

    #[test]
    fn repo_root_is_nearest_git_ancestor() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let nested = temp.path().join("web/src/app");
        fs::create_dir_all(&nested)?;
        fs::create_dir_all(temp.path().join("web/.git"))?;

        assert_eq!(find_repo_root(&nested), Some(temp.path().join("web")));
        Ok(())
    }
}
