//! Configuration for buildbridge.
//!
//! Loads config from the first of:
//! 1. Per-project: `<root>/buildbridge.toml`
//! 2. Global: `~/.config/buildbridge/config.toml`
//!
//! With neither present, every section takes its defaults and conversion
//! behaves exactly like [`buildbridge_syntax::convert`].
//!
//! Example buildbridge.toml:
//! ```toml
//! [project]
//! name = "my_project"
//!
//! [conversion]
//! mode = "gn-to-cmake"
//!
//! [targets]
//! exclude = ["*_unittests"]
//!
//! [cmake]
//! minimum_version = "3.20"
//! cxx_standard = "17"
//!
//! [dependencies.external_mapping]
//! "//third_party/zlib" = "ZLIB::ZLIB"
//! ```

use buildbridge_syntax::{ConversionError, ConvertOptions, Direction, TargetFilter};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Per-project config file name.
pub const CONFIG_FILE: &str = "buildbridge.toml";

/// Errors from loading or interpreting configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid target pattern {pattern:?}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("invalid conversion mode")]
    Mode(#[from] ConversionError),
}

/// Project-level settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// CMake `project()` name.
    pub name: Option<String>,
    pub gn_root: PathBuf,
    pub output_dir: PathBuf,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: None,
            gn_root: PathBuf::from("."),
            output_dir: PathBuf::from("cmake_output"),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionConfig {
    /// Default direction, e.g. `"gn-to-cmake"`.
    pub mode: Option<String>,
}

/// Glob patterns on target names.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetsConfig {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CmakeConfig {
    pub minimum_version: String,
    /// Suggested `cmake -G` generator. Not written into any file.
    pub generator: String,
    pub c_standard: Option<String>,
    pub cxx_standard: Option<String>,
}

impl Default for CmakeConfig {
    fn default() -> Self {
        Self {
            minimum_version: "3.20".to_string(),
            generator: "Ninja".to_string(),
            c_standard: None,
            cxx_standard: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DependenciesConfig {
    /// GN label → CMake target name.
    pub external_mapping: BTreeMap<String, String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub project: ProjectConfig,
    pub conversion: ConversionConfig,
    pub targets: TargetsConfig,
    pub cmake: CmakeConfig,
    pub dependencies: DependenciesConfig,
}

impl Config {
    /// Load an explicitly named config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Find and load the config that applies to `root`, or defaults.
    pub fn discover(root: &Path) -> Result<Self, ConfigError> {
        Self::discover_with(root, Self::global_config_path().as_deref())
    }

    fn discover_with(root: &Path, global: Option<&Path>) -> Result<Self, ConfigError> {
        let project = root.join(CONFIG_FILE);
        let found = std::iter::once(project.as_path())
            .chain(global)
            .find(|path| path.is_file());
        match found {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("buildbridge").join("config.toml"))
    }

    /// Configured default direction, if any.
    pub fn direction(&self) -> Result<Option<Direction>, ConfigError> {
        match &self.conversion.mode {
            Some(mode) => Ok(Some(mode.parse()?)),
            None => Ok(None),
        }
    }

    pub fn target_filter(&self) -> Result<TargetFilter, ConfigError> {
        let compile = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    glob::Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                        pattern: pattern.clone(),
                        source,
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        };
        Ok(TargetFilter::from_patterns(
            compile(self.targets.include.as_slice())?,
            compile(self.targets.exclude.as_slice())?,
        ))
    }

    /// Options for the conversion entry points.
    pub fn convert_options(&self) -> Result<ConvertOptions, ConfigError> {
        let defaults = ConvertOptions::default();
        Ok(ConvertOptions {
            cmake_minimum_version: self.cmake.minimum_version.clone(),
            project_name: self
                .project
                .name
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or(defaults.project_name),
            c_standard: self.cmake.c_standard.clone(),
            cxx_standard: self.cmake.cxx_standard.clone(),
            filter: self.target_filter()?,
            external_mapping: self.dependencies.external_mapping.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults_match_plain_convert() {
        let dir = TempDir::new().unwrap();
        let config = Config::discover_with(dir.path(), None).unwrap();
        let options = config.convert_options().unwrap();
        let gn = r#"executable("hello") { sources = ["main.cc"] }"#;
        assert_eq!(
            buildbridge_syntax::convert_with(gn, Direction::GnToCmake, &options),
            buildbridge_syntax::convert(gn, Direction::GnToCmake)
        );
        assert_eq!(config.direction().unwrap(), None);
        assert_eq!(config.cmake.generator, "Ninja");
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            dir.path(),
            r#"
[project]
name = "demo"

[conversion]
mode = "cmake_to_gn"

[targets]
include = ["base*"]
exclude = ["*_unittests"]

[cmake]
minimum_version = "3.25"
cxx_standard = "20"

[dependencies.external_mapping]
"//third_party/zlib" = "ZLIB::ZLIB"
"#,
        );

        let config = Config::discover_with(dir.path(), None).unwrap();
        assert_eq!(config.direction().unwrap(), Some(Direction::CmakeToGn));

        let options = config.convert_options().unwrap();
        assert_eq!(options.project_name, "demo");
        assert_eq!(options.cmake_minimum_version, "3.25");
        assert_eq!(options.cxx_standard.as_deref(), Some("20"));
        assert_eq!(options.c_standard, None);
        assert!(options.filter.matches("base_util"));
        assert!(!options.filter.matches("base_unittests"));
        assert!(!options.filter.matches("net"));
        assert_eq!(options.external_mapping["//third_party/zlib"], "ZLIB::ZLIB");
    }

    #[test]
    fn test_project_config_wins_over_global() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        let global_path = global.path().join("config.toml");
        std::fs::write(&global_path, "[project]\nname = \"global\"\n").unwrap();

        let config = Config::discover_with(project.path(), Some(&global_path)).unwrap();
        assert_eq!(config.project.name.as_deref(), Some("global"));

        write_config(project.path(), "[project]\nname = \"local\"\n");
        let config = Config::discover_with(project.path(), Some(&global_path)).unwrap();
        assert_eq!(config.project.name.as_deref(), Some("local"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "[cmake]\nminimum_verison = \"3.20\"\n");
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_missing_explicit_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.toml");
        assert!(matches!(Config::load(&path), Err(ConfigError::NotFound(p)) if p == path));
    }

    #[test]
    fn test_invalid_values() {
        let dir = TempDir::new().unwrap();
        write_config(dir.path(), "[targets]\ninclude = [\"[unclosed\"]\n");
        let config = Config::discover_with(dir.path(), None).unwrap();
        assert!(matches!(
            config.convert_options(),
            Err(ConfigError::InvalidPattern { pattern, .. }) if pattern == "[unclosed"
        ));

        let config = Config {
            conversion: ConversionConfig {
                mode: Some("gn-to-bazel".into()),
            },
            ..Default::default()
        };
        assert!(matches!(config.direction(), Err(ConfigError::Mode(_))));
    }
}
