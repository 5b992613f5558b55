//! Bootstrap launcher for an application shipped with its own Java runtime.
//!
//! The launcher resolves a bundled runtime executable and a library
//! directory relative to the working directory, assembles a single command
//! line and starts the runtime as a child process. On Windows the child is
//! created without a console window.
//!
//! ```ignore
//! use jre_launcher::{command, launcher, LaunchConfig, OsFamily};
//!
//! let os = OsFamily::detect()?;
//! let spec = command::LaunchSpec::new(os, &LaunchConfig::default());
//! let outcome = launcher::launch(os, &spec.command_line());
//! assert!(outcome.success());
//! ```

use std::str::FromStr;

pub mod command;
pub mod config;
pub mod diagnostics;
pub mod launcher;
#[cfg(windows)]
mod windows;

// Re-export commonly used items
pub use command::{CommandLine, LaunchSpec};
pub use config::LaunchConfig;
pub use launcher::{LaunchError, LaunchOutcome, LaunchState, ProcessLauncher};

/// Operating system families the launcher knows how to start processes on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Posix,
    Windows,
}

impl OsFamily {
    /// Detect the family of the host this binary was compiled for.
    ///
    /// Targets that are neither Unix-like nor Windows (e.g. wasm) are
    /// reported as [`LaunchError::UnsupportedPlatform`].
    pub fn detect() -> Result<Self, LaunchError> {
        Self::from_target_family(std::env::consts::FAMILY)
    }

    /// Map a Rust target family string (`unix`, `windows`, ...) to an OS family.
    pub fn from_target_family(family: &str) -> Result<Self, LaunchError> {
        match family {
            "unix" => Ok(OsFamily::Posix),
            "windows" => Ok(OsFamily::Windows),
            other => Err(LaunchError::UnsupportedPlatform {
                family: if other.is_empty() {
                    "unknown".to_string()
                } else {
                    other.to_string()
                },
            }),
        }
    }

    /// Path separator used when building paths for this family.
    pub fn path_separator(self) -> char {
        match self {
            OsFamily::Posix => '/',
            OsFamily::Windows => '\\',
        }
    }

    /// File name of the Java runtime executable inside `<runtime>/bin`.
    pub fn runtime_executable_name(self) -> &'static str {
        match self {
            OsFamily::Posix => "java",
            OsFamily::Windows => "java.exe",
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsFamily::Posix => write!(f, "posix"),
            OsFamily::Windows => write!(f, "windows"),
        }
    }
}

impl FromStr for OsFamily {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "posix" | "unix" | "linux" | "macos" => Ok(OsFamily::Posix),
            "windows" | "win" => Ok(OsFamily::Windows),
            other => Err(LaunchError::UnsupportedPlatform {
                family: other.to_string(),
            }),
        }
    }
}
