//! Launch configuration.
//!
//! Values are layered: built-in defaults, then an optional JSON file, then
//! command-line overrides. The resulting [`LaunchConfig`] is immutable and
//! passed explicitly to the command builder.

use std::path::{Path, PathBuf};

use anyhow::Context;
use log::{debug, info};
use serde::Deserialize;

use crate::command::normalize_dir;
use crate::launcher::LaunchError;
use crate::OsFamily;

/// Directory holding the bundled runtime, relative to the working directory.
pub const DEFAULT_RUNTIME_DIR: &str = "jre";

/// Directory holding the application archives, relative to the working directory.
pub const DEFAULT_LIB_DIR: &str = "lib";

/// Fully qualified name of the class the runtime should start.
pub const DEFAULT_ENTRY_POINT: &str = "com.example.Main";

/// Characters `/bin/sh` still expands inside double quotes.
const SHELL_EXPANSION_CHARS: [char; 2] = ['$', '`'];

/// File name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "launcher.json";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Runtime directory; the executable is expected in `<runtime_dir>/bin`.
    pub runtime_dir: String,
    /// Library directory; every archive in it goes on the classpath.
    pub lib_dir: String,
    /// Entry-point class name passed to the runtime.
    pub entry_point: String,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            runtime_dir: DEFAULT_RUNTIME_DIR.to_string(),
            lib_dir: DEFAULT_LIB_DIR.to_string(),
            entry_point: DEFAULT_ENTRY_POINT.to_string(),
        }
    }
}

impl LaunchConfig {
    /// Read a config file. Fields missing from the file keep their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!("[config] Loaded {:?} from {}", config, path.display());
        Ok(config)
    }

    /// Load the config from `path` if given, otherwise from
    /// [`DEFAULT_CONFIG_FILE`] in the working directory when it exists.
    ///
    /// An explicitly requested file that cannot be read is an error; a
    /// missing default file just means "use the defaults".
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    info!("[config] Using {}", default_path.display());
                    Self::from_file(&default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Apply command-line overrides on top of this config.
    pub fn with_overrides(
        mut self,
        runtime_dir: Option<String>,
        lib_dir: Option<String>,
        entry_point: Option<String>,
    ) -> Self {
        if let Some(runtime_dir) = runtime_dir {
            self.runtime_dir = runtime_dir;
        }
        if let Some(lib_dir) = lib_dir {
            self.lib_dir = lib_dir;
        }
        if let Some(entry_point) = entry_point {
            self.entry_point = entry_point;
        }
        self
    }

    /// Check that the values can be turned into a well-formed command line.
    pub fn validate(&self) -> Result<(), LaunchError> {
        for (name, value) in [
            ("runtime_dir", &self.runtime_dir),
            ("lib_dir", &self.lib_dir),
            ("entry_point", &self.entry_point),
        ] {
            if value.trim().is_empty() {
                return Err(LaunchError::InvalidConfig(format!("{name} must not be empty")));
            }
            if value.contains('"') {
                return Err(LaunchError::InvalidConfig(format!(
                    "{name} must not contain quotes: {value}"
                )));
            }
        }

        for (name, dir) in [("runtime_dir", &self.runtime_dir), ("lib_dir", &self.lib_dir)] {
            if normalize_dir(dir, '/').is_empty() {
                return Err(LaunchError::InvalidConfig(format!(
                    "{name} must name a directory, not just separators: {dir:?}"
                )));
            }
        }

        if self.entry_point.chars().any(char::is_whitespace) {
            return Err(LaunchError::InvalidConfig(format!(
                "entry_point must not contain whitespace: {:?}",
                self.entry_point
            )));
        }

        // The entry point is passed unquoted.
        if let Some(c) = self
            .entry_point
            .chars()
            .find(|c| !(c.is_alphanumeric() || matches!(c, '.' | '_' | '$' | '-')))
        {
            return Err(LaunchError::InvalidConfig(format!(
                "entry_point contains {c:?}, which is not valid in a class name: {}",
                self.entry_point
            )));
        }

        Ok(())
    }

    /// [`validate`](Self::validate), plus the restrictions of the shell that
    /// runs the command on `os`.
    ///
    /// On POSIX the command goes through `/bin/sh -c`, where `$` and
    /// backticks are expanded even inside double quotes.
    pub fn validate_for(&self, os: OsFamily) -> Result<(), LaunchError> {
        self.validate()?;

        if os == OsFamily::Posix {
            for (name, value) in [
                ("runtime_dir", &self.runtime_dir),
                ("lib_dir", &self.lib_dir),
                ("entry_point", &self.entry_point),
            ] {
                if value.contains(SHELL_EXPANSION_CHARS) {
                    return Err(LaunchError::InvalidConfig(format!(
                        "{name} must not contain '$' or '`' on {os}: {value}"
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LaunchConfig::default();
        assert_eq!(config.runtime_dir, "jre");
        assert_eq!(config.lib_dir, "lib");
        assert_eq!(config.entry_point, "com.example.Main");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("launcher.json");
        std::fs::write(&path, r#"{"entry_point": "org.acme.App"}"#).unwrap();

        let config = LaunchConfig::from_file(&path).unwrap();
        assert_eq!(config.entry_point, "org.acme.App");
        assert_eq!(config.runtime_dir, DEFAULT_RUNTIME_DIR);
        assert_eq!(config.lib_dir, DEFAULT_LIB_DIR);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = LaunchConfig::load(Some(&temp_dir.path().join("nope.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("launcher.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = LaunchConfig::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_overrides_replace_only_given_fields() {
        let config = LaunchConfig::default().with_overrides(
            Some("runtime".to_string()),
            None,
            Some("org.acme.App".to_string()),
        );
        assert_eq!(config.runtime_dir, "runtime");
        assert_eq!(config.lib_dir, "lib");
        assert_eq!(config.entry_point, "org.acme.App");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty = LaunchConfig {
            lib_dir: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(LaunchError::InvalidConfig(_))));

        let quoted = LaunchConfig {
            runtime_dir: "my \"jre\"".to_string(),
            ..Default::default()
        };
        assert!(quoted.validate().is_err());

        let spaced = LaunchConfig {
            entry_point: "com.example.Main --debug".to_string(),
            ..Default::default()
        };
        let err = spaced.validate().unwrap_err();
        assert!(err.to_string().contains("whitespace"));
    }

    #[test]
    fn test_validate_rejects_separator_only_dirs() {
        for dir in ["/", "\\", "//", "/\\/"] {
            let runtime = LaunchConfig {
                runtime_dir: dir.to_string(),
                ..Default::default()
            };
            assert!(runtime.validate().is_err(), "runtime_dir {dir:?} accepted");

            let lib = LaunchConfig {
                lib_dir: dir.to_string(),
                ..Default::default()
            };
            let err = lib.validate().unwrap_err();
            assert!(err.to_string().contains("lib_dir"), "{err}");
        }

        let nested = LaunchConfig {
            runtime_dir: "runtime/jre/".to_string(),
            ..Default::default()
        };
        assert!(nested.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_shell_syntax_in_entry_point() {
        for entry_point in ["Main;touch", "Main|cat", "Main&", "Main>out", "'Main'"] {
            let config = LaunchConfig {
                entry_point: entry_point.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "{entry_point:?} accepted");
        }

        let inner_class = LaunchConfig {
            entry_point: "org.acme.App$Main".to_string(),
            ..Default::default()
        };
        assert!(inner_class.validate().is_ok());
    }

    #[test]
    fn test_validate_for_posix_rejects_shell_expansion() {
        let substitution = LaunchConfig {
            lib_dir: "lib$(echo X)".to_string(),
            ..Default::default()
        };
        assert!(substitution.validate().is_ok());
        assert!(substitution.validate_for(OsFamily::Windows).is_ok());
        let err = substitution.validate_for(OsFamily::Posix).unwrap_err();
        assert!(err.to_string().contains("lib_dir"), "{err}");

        let backtick = LaunchConfig {
            runtime_dir: "jre`id`".to_string(),
            ..Default::default()
        };
        assert!(backtick.validate_for(OsFamily::Posix).is_err());

        let inner_class = LaunchConfig {
            entry_point: "org.acme.App$Main".to_string(),
            ..Default::default()
        };
        assert!(inner_class.validate_for(OsFamily::Posix).is_err());
        assert!(inner_class.validate_for(OsFamily::Windows).is_ok());
    }

    #[test]
    fn test_validate_allows_spaces_in_dirs() {
        let config = LaunchConfig {
            runtime_dir: "Java Runtime".to_string(),
            lib_dir: "app libs".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
