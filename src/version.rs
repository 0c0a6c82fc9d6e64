//! Best-effort source revision stamp

use std::path::Path;
use std::process::{Command, Stdio};

/// Short git revision of the working tree, or `""` when unavailable
///
/// Never fails: a missing `git` executable, a directory outside a
/// repository or any other error all yield an empty string.
pub fn read_git_head() -> String {
    git_head_in(Path::new("."))
}

/// Same as [`read_git_head`], for the repository containing `dir`
pub fn git_head_in(dir: &Path) -> String {
    let output = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output();

    match output {
        Ok(output) if output.status.success() => String::from_utf8(output.stdout)
            .map(|s| s.trim().to_string())
            .unwrap_or_default(),
        Ok(output) => {
            tracing::debug!(status = %output.status, "git rev-parse failed");
            String::new()
        }
        Err(e) => {
            tracing::debug!("git unavailable: {}", e);
            String::new()
        }
    }
}
