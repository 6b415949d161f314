// whisper-relay - platform/process.rs
//
// One-shot lookup of the live client log via the OS process table.
//
// Scans running processes for the known client executable names and
// derives the log path from the executable's directory. Best-effort: no
// retry loop, no file-watch fallback — if the client is not running (or
// its log is missing) the caller exits and the operator restarts.

use crate::util::constants::{CLIENT_LOG_FILE, CLIENT_LOG_SUBDIR, CLIENT_PROCESS_NAMES};
use crate::util::error::LocateError;
use std::path::{Path, PathBuf};
use sysinfo::{ProcessesToUpdate, System};

/// Locate the client log of a running Path of Exile process.
///
/// Returns the first derived path that exists on disk. Distinguishes "no
/// client process at all" from "client running but log missing" so the
/// startup error names the actual problem.
pub fn locate_client_log() -> Result<PathBuf, LocateError> {
    let mut sys = System::new();
    sys.refresh_processes(ProcessesToUpdate::All, true);

    let mut missing_candidate: Option<PathBuf> = None;

    for (pid, process) in sys.processes() {
        let name = process.name().to_string_lossy();
        if !CLIENT_PROCESS_NAMES.iter().any(|known| name == *known) {
            continue;
        }

        let Some(exe_dir) = process.exe().and_then(Path::parent) else {
            tracing::debug!(
                pid = pid.as_u32(),
                "Client process has no resolvable executable path"
            );
            continue;
        };

        let candidate = derive_client_log_path(exe_dir);
        if candidate.is_file() {
            tracing::info!(
                pid = pid.as_u32(),
                file = %candidate.display(),
                "Located client log"
            );
            return Ok(candidate);
        }

        tracing::debug!(
            pid = pid.as_u32(),
            file = %candidate.display(),
            "Derived log path does not exist"
        );
        missing_candidate.get_or_insert(candidate);
    }

    match missing_candidate {
        Some(path) => Err(LocateError::LogMissing { path }),
        None => Err(LocateError::ClientNotRunning),
    }
}

/// Derive the client log path from the executable's directory:
/// `<exe_dir>/logs/Client.txt`.
pub fn derive_client_log_path(exe_dir: &Path) -> PathBuf {
    exe_dir.join(CLIENT_LOG_SUBDIR).join(CLIENT_LOG_FILE)
}
