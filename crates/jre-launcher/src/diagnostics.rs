//! Human-readable hints shown when a launch fails.

use crate::config::LaunchConfig;
use crate::launcher::LaunchError;
use crate::OsFamily;

/// Likely causes of a failed launch, most common first.
pub fn failure_checklist(os: OsFamily, config: &LaunchConfig) -> Vec<String> {
    let sep = os.path_separator();
    vec![
        format!(
            "The runtime path is correct and contains the Java executable (expected in .{sep}{}{sep}bin{sep})",
            config.runtime_dir
        ),
        format!(
            "The library directory exists and contains the required JAR files (expected in .{sep}{}{sep})",
            config.lib_dir
        ),
        format!("The entry point '{}' is correct", config.entry_point),
        format!(
            "The runtime is built for this operating system ({os}) and architecture ({})",
            std::env::consts::ARCH
        ),
        "File permissions allow the runtime to be executed".to_string(),
        "The Java process printed no errors (its output may need to be redirected to be seen)"
            .to_string(),
        "The command shown above was parsed as expected".to_string(),
    ]
}

/// One-line summary of a launch failure.
pub fn describe_failure(error: &LaunchError) -> String {
    match error.code() {
        Some(code) => format!("Launch failed (code {code}): {error}"),
        None => format!("Launch failed: {error}"),
    }
}
