//! Starting the runtime as a child process.
//!
//! Each OS family gets its own [`ProcessLauncher`]:
//!
//! - [`PosixLauncher`] hands the command line to `/bin/sh -c` and waits for
//!   the shell to finish. No console window is involved on these targets.
//! - [`WindowsLauncher`] calls `CreateProcessW` with `CREATE_NO_WINDOW` so
//!   the runtime starts without a console window.
//!
//! A launch never panics or propagates an error to the caller; the result is
//! a [`LaunchOutcome`] that the caller turns into a report.

use std::process::Command;

use log::{debug, info, warn};

use crate::command::CommandLine;
use crate::OsFamily;

/// Shell used to run the command line on POSIX systems.
const POSIX_SHELL: &str = "/bin/sh";

/// Error type for launch operations.
#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("Unsupported platform: {family}")]
    UnsupportedPlatform { family: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Command line contains an interior NUL character")]
    InvalidCommandLine,

    #[error("Failed to spawn shell: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Command exited with {}", describe_exit_code(.code))]
    ExitStatus { code: Option<i32> },

    #[error("CreateProcessW failed with error code {code}")]
    CreateProcess { code: u32 },
}

impl LaunchError {
    /// Numeric code worth showing to the user, if the failure carried one.
    pub fn code(&self) -> Option<i64> {
        match self {
            LaunchError::ExitStatus { code } => code.map(i64::from),
            LaunchError::CreateProcess { code } => Some(i64::from(*code)),
            LaunchError::Spawn(e) => e.raw_os_error().map(i64::from),
            _ => None,
        }
    }
}

fn describe_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

/// Per-launch state. `Started` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchState {
    NotStarted,
    Starting,
    Started,
    Failed,
}

impl std::fmt::Display for LaunchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LaunchState::NotStarted => write!(f, "not started"),
            LaunchState::Starting => write!(f, "starting"),
            LaunchState::Started => write!(f, "started"),
            LaunchState::Failed => write!(f, "failed"),
        }
    }
}

/// Result of a single launch attempt.
#[derive(Debug)]
pub struct LaunchOutcome {
    state: LaunchState,
    error: Option<LaunchError>,
}

impl LaunchOutcome {
    pub fn started() -> Self {
        Self {
            state: LaunchState::Started,
            error: None,
        }
    }

    pub fn failed(error: LaunchError) -> Self {
        Self {
            state: LaunchState::Failed,
            error: Some(error),
        }
    }

    pub fn state(&self) -> LaunchState {
        self.state
    }

    /// Whether the child process was started.
    pub fn success(&self) -> bool {
        self.state == LaunchState::Started
    }

    pub fn error(&self) -> Option<&LaunchError> {
        self.error.as_ref()
    }

    /// Platform error code or exit status attached to a failure.
    pub fn error_code(&self) -> Option<i64> {
        self.error.as_ref().and_then(LaunchError::code)
    }
}

impl From<Result<(), LaunchError>> for LaunchOutcome {
    fn from(result: Result<(), LaunchError>) -> Self {
        match result {
            Ok(()) => Self::started(),
            Err(e) => Self::failed(e),
        }
    }
}

/// Starts a detached, windowless child process from a command line.
pub trait ProcessLauncher {
    /// OS family this launcher targets.
    fn os_family(&self) -> OsFamily;

    /// Create the child process. Blocks until creation has either
    /// succeeded or failed.
    fn launch(&self, command: &CommandLine) -> LaunchOutcome;
}

/// Runs the command line through the system shell.
#[derive(Debug, Default, Clone, Copy)]
pub struct PosixLauncher;

impl PosixLauncher {
    fn run(&self, command: &CommandLine) -> Result<(), LaunchError> {
        let status = Command::new(POSIX_SHELL)
            .arg("-c")
            .arg(command.as_str())
            .status()?;

        if status.success() {
            Ok(())
        } else {
            Err(LaunchError::ExitStatus {
                code: status.code(),
            })
        }
    }
}

impl ProcessLauncher for PosixLauncher {
    fn os_family(&self) -> OsFamily {
        OsFamily::Posix
    }

    fn launch(&self, command: &CommandLine) -> LaunchOutcome {
        debug!("[launcher] {} -> {}", LaunchState::NotStarted, LaunchState::Starting);
        let outcome = LaunchOutcome::from(self.run(command));
        log_outcome(&outcome);
        outcome
    }
}

/// Creates the process with `CreateProcessW` and no console window.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsLauncher;

impl WindowsLauncher {
    #[cfg(windows)]
    fn run(&self, command: &CommandLine) -> Result<(), LaunchError> {
        crate::windows::create_process_no_window(command.as_str())
    }

    #[cfg(not(windows))]
    fn run(&self, _command: &CommandLine) -> Result<(), LaunchError> {
        Err(LaunchError::UnsupportedPlatform {
            family: format!("windows launcher on {}", std::env::consts::OS),
        })
    }
}

impl ProcessLauncher for WindowsLauncher {
    fn os_family(&self) -> OsFamily {
        OsFamily::Windows
    }

    fn launch(&self, command: &CommandLine) -> LaunchOutcome {
        debug!("[launcher] {} -> {}", LaunchState::NotStarted, LaunchState::Starting);
        let outcome = LaunchOutcome::from(self.run(command));
        log_outcome(&outcome);
        outcome
    }
}

/// Pick the launcher for an OS family.
pub fn launcher_for(os: OsFamily) -> Box<dyn ProcessLauncher> {
    match os {
        OsFamily::Posix => Box::new(PosixLauncher),
        OsFamily::Windows => Box::new(WindowsLauncher),
    }
}

/// Launch `command` with the launcher for `os`.
pub fn launch(os: OsFamily, command: &CommandLine) -> LaunchOutcome {
    info!("[launcher] Launching on {}: {}", os, command);
    launcher_for(os).launch(command)
}

fn log_outcome(outcome: &LaunchOutcome) {
    match outcome.error() {
        None => debug!("[launcher] {} -> {}", LaunchState::Starting, outcome.state()),
        Some(e) => warn!(
            "[launcher] {} -> {}: {}",
            LaunchState::Starting,
            outcome.state(),
            e
        ),
    }
}
