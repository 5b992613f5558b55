//! Command line construction for the bundled runtime.
//!
//! Everything here is pure string assembly; nothing touches the filesystem.

use crate::config::LaunchConfig;
use crate::OsFamily;

/// Name of the directory inside the runtime that holds the executables.
const RUNTIME_BIN_DIR: &str = "bin";

/// Classpath wildcard meaning "every archive in this directory".
const CLASSPATH_WILDCARD: &str = "*";

/// The three inputs handed to the process launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    /// Relative path of the runtime executable, e.g. `./jre/bin/java`.
    pub runtime_executable: String,
    /// Classpath argument, e.g. `lib/*`.
    pub classpath: String,
    /// Entry-point class name.
    pub entry_point: String,
}

impl LaunchSpec {
    /// Resolve the executable path and classpath for `os`.
    pub fn new(os: OsFamily, config: &LaunchConfig) -> Self {
        let sep = os.path_separator();
        let runtime_dir = normalize_dir(&config.runtime_dir, sep);
        let lib_dir = normalize_dir(&config.lib_dir, sep);

        Self {
            runtime_executable: format!(
                ".{sep}{runtime_dir}{sep}{RUNTIME_BIN_DIR}{sep}{}",
                os.runtime_executable_name()
            ),
            classpath: format!("{lib_dir}{sep}{CLASSPATH_WILDCARD}"),
            entry_point: config.entry_point.clone(),
        }
    }

    /// Assemble `"<executable>" -cp "<classpath>" <entry point>`.
    ///
    /// The wildcard in the classpath must reach the runtime unexpanded, so
    /// it is always quoted.
    pub fn command_line(&self) -> CommandLine {
        CommandLine(format!(
            "\"{}\" -cp \"{}\" {}",
            self.runtime_executable, self.classpath, self.entry_point
        ))
    }
}

/// A fully assembled invocation, ready for a shell or `CreateProcessW`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine(String);

impl CommandLine {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the command line for `os` from individual components.
pub fn build(os: OsFamily, runtime_dir: &str, lib_dir: &str, entry_point: &str) -> CommandLine {
    let config = LaunchConfig {
        runtime_dir: runtime_dir.to_string(),
        lib_dir: lib_dir.to_string(),
        entry_point: entry_point.to_string(),
    };
    LaunchSpec::new(os, &config).command_line()
}

/// Rewrite both separator styles to `sep` and drop trailing separators.
pub(crate) fn normalize_dir(dir: &str, sep: char) -> String {
    dir.trim_end_matches(['/', '\\'])
        .chars()
        .map(|c| if c == '/' || c == '\\' { sep } else { c })
        .collect()
}
