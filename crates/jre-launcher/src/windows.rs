//! Windowless process creation via `CreateProcessW`.
//!
//! All memory handed to the OS lives in a single [`LaunchScratch`] owned by
//! the launching stack frame, and the two handles returned on success are
//! owned by [`ProcessHandles`], which closes them on drop. Both are released
//! on every exit path.

use std::mem;
use std::ptr;

use log::{debug, warn};
use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, FALSE, HANDLE};
use windows_sys::Win32::System::Threading::{
    CreateProcessW, CREATE_NO_WINDOW, NORMAL_PRIORITY_CLASS, PROCESS_INFORMATION, STARTUPINFOW,
};

use crate::launcher::LaunchError;

/// Buffers passed to `CreateProcessW`. They must outlive the call.
struct LaunchScratch {
    /// NUL-terminated UTF-16 command line. `CreateProcessW` may write to it.
    command_line: Vec<u16>,
    startup_info: STARTUPINFOW,
    process_info: PROCESS_INFORMATION,
}

impl LaunchScratch {
    fn new(command: &str) -> Result<Self, LaunchError> {
        let command_line = to_wide(command)?;

        // SAFETY: both are plain C structs for which all-zero is valid.
        let mut startup_info: STARTUPINFOW = unsafe { mem::zeroed() };
        startup_info.cb = mem::size_of::<STARTUPINFOW>() as u32;
        let process_info: PROCESS_INFORMATION = unsafe { mem::zeroed() };

        Ok(Self {
            command_line,
            startup_info,
            process_info,
        })
    }
}

/// Process and primary-thread handles of a freshly created child.
struct ProcessHandles {
    process: HANDLE,
    thread: HANDLE,
}

impl ProcessHandles {
    /// Close every handle still held. Returns how many were closed.
    fn close(&mut self) -> usize {
        let mut closed = 0;
        for handle in [&mut self.process, &mut self.thread] {
            if *handle == 0 {
                continue;
            }
            // SAFETY: the handle came from a successful CreateProcessW call
            // and is zeroed right after, so it is closed at most once.
            if unsafe { CloseHandle(*handle) } == 0 {
                warn!("[windows] CloseHandle failed: {}", unsafe { GetLastError() });
            } else {
                closed += 1;
            }
            *handle = 0;
        }
        closed
    }
}

impl Drop for ProcessHandles {
    fn drop(&mut self) {
        self.close();
    }
}

/// Start `command` without a console window.
pub(crate) fn create_process_no_window(command: &str) -> Result<(), LaunchError> {
    spawn_and_release(command).map(|_| ())
}

/// Create the process and release its handles. Returns the number of
/// handles closed.
fn spawn_and_release(command: &str) -> Result<usize, LaunchError> {
    let mut scratch = LaunchScratch::new(command)?;

    // SAFETY: every pointer refers to memory owned by `scratch`, which
    // outlives the call. The command line buffer is mutable and
    // NUL-terminated as CreateProcessW requires.
    let created = unsafe {
        CreateProcessW(
            ptr::null(),
            scratch.command_line.as_mut_ptr(),
            ptr::null(),
            ptr::null(),
            FALSE,
            CREATE_NO_WINDOW | NORMAL_PRIORITY_CLASS,
            ptr::null(),
            ptr::null(),
            &scratch.startup_info,
            &mut scratch.process_info,
        )
    };

    if created == 0 {
        // No handles were created; only the scratch buffers need releasing.
        let code = unsafe { GetLastError() };
        return Err(LaunchError::CreateProcess { code });
    }

    let mut handles = ProcessHandles {
        process: scratch.process_info.hProcess,
        thread: scratch.process_info.hThread,
    };
    debug!(
        "[windows] Created process {} without a console window",
        scratch.process_info.dwProcessId
    );

    Ok(handles.close())
}

/// Encode as NUL-terminated UTF-16, rejecting interior NULs.
fn to_wide(s: &str) -> Result<Vec<u16>, LaunchError> {
    let mut wide: Vec<u16> = s.encode_utf16().collect();
    if wide.contains(&0) {
        return Err(LaunchError::InvalidCommandLine);
    }
    wide.push(0);
    Ok(wide)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command;
    use crate::OsFamily;

    #[test]
    fn test_to_wide_terminates() {
        let wide = to_wide("java").unwrap();
        assert_eq!(wide.last(), Some(&0));
        assert_eq!(wide.len(), 5);
    }

    #[test]
    fn test_to_wide_rejects_interior_nul() {
        assert!(matches!(
            to_wide("java\0-cp"),
            Err(LaunchError::InvalidCommandLine)
        ));
    }

    #[test]
    fn test_startup_info_size_is_set() {
        let scratch = LaunchScratch::new("cmd.exe").unwrap();
        assert_eq!(
            scratch.startup_info.cb as usize,
            mem::size_of::<STARTUPINFOW>()
        );
        assert_eq!(scratch.process_info.hProcess, 0);
        assert_eq!(scratch.process_info.hThread, 0);
    }

    #[test]
    fn test_successful_launch_closes_both_handles() {
        let closed = spawn_and_release("cmd.exe /c exit 0").unwrap();
        assert_eq!(closed, 2);
    }

    #[test]
    fn test_missing_runtime_reports_error_code() {
        let command = command::build(
            OsFamily::Windows,
            "missing-runtime-for-launcher-test",
            "lib",
            "com.example.Main",
        );
        let err = create_process_no_window(command.as_str()).unwrap_err();
        match err {
            LaunchError::CreateProcess { code } => assert_ne!(code, 0),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_close_is_idempotent() {
        let mut handles = ProcessHandles {
            process: 0,
            thread: 0,
        };
        assert_eq!(handles.close(), 0);
        assert_eq!(handles.close(), 0);
    }
}
