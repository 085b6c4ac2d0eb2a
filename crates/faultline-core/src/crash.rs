//! Process-terminating fault
//!
//! Attempts a write into a path that should not be writable and terminates
//! the process whatever happens. No result is ever returned to the caller.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// Exit status used when the write fails as intended
pub const EXIT_WRITE_FAILED: i32 = 1;

/// Exit status used when the write unexpectedly succeeds
pub const EXIT_WRITE_SUCCEEDED: i32 = 0;

/// Bad-write tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrashConfig {
    /// Path the fault tries to write to
    #[serde(default = "default_path")]
    pub path: PathBuf,
}

impl Default for CrashConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
        }
    }
}

fn default_path() -> PathBuf {
    PathBuf::from("/sys/faultline/badwrite")
}

/// What happened to the write attempt
#[derive(Debug)]
pub enum WriteAttempt {
    Written,
    PermissionDenied(io::Error),
    MissingPath(io::Error),
    Io(io::Error),
}

impl WriteAttempt {
    /// Process exit status for this attempt
    pub fn exit_code(&self) -> i32 {
        match self {
            WriteAttempt::Written => EXIT_WRITE_SUCCEEDED,
            _ => EXIT_WRITE_FAILED,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WriteAttempt::Written => "write succeeded",
            WriteAttempt::PermissionDenied(_) => "permission denied",
            WriteAttempt::MissingPath(_) => "path not found",
            WriteAttempt::Io(_) => "I/O error",
        }
    }
}

/// Try writing a marker file at `path`
pub fn attempt_write(path: &Path) -> WriteAttempt {
    match std::fs::write(path, b"faultline bad write\n") {
        Ok(()) => WriteAttempt::Written,
        Err(e) => match e.kind() {
            io::ErrorKind::PermissionDenied => WriteAttempt::PermissionDenied(e),
            io::ErrorKind::NotFound => WriteAttempt::MissingPath(e),
            _ => WriteAttempt::Io(e),
        },
    }
}

/// Attempt the write, log the outcome and exit the process.
pub fn terminate(config: &CrashConfig) -> ! {
    let path = config.path.as_path();
    tracing::warn!(path = %path.display(), "Attempting write to restricted path");

    let attempt = attempt_write(path);
    let code = attempt.exit_code();
    match &attempt {
        WriteAttempt::Written => tracing::error!(
            path = %path.display(),
            "Write to restricted path unexpectedly succeeded; exiting"
        ),
        WriteAttempt::PermissionDenied(e) | WriteAttempt::MissingPath(e) | WriteAttempt::Io(e) => {
            tracing::error!(
                path = %path.display(),
                reason = attempt.label(),
                error = %e,
                exit_code = code,
                "Write to restricted path failed; terminating process"
            )
        }
    }

    std::process::exit(code)
}
