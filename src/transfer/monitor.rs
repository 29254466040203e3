// 传输执行与结果判定
use crate::process::{CommandRunner, Stream};
use crate::report::Reporter;
use crate::ssh::RemoteIdentity;
use crate::transfer::command::{build_transfer_command, TransferTarget};
use crate::utils::error::{PullError, Result};
use log::{info, warn};
use std::path::Path;

pub const AUTH_FAILURE_PATTERNS: &[&str] = &[
    "Permission denied",
    "Host key verification failed",
    "Authentication failed",
    "Too many authentication failures",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Success,
    AuthFailure,
    GenericFailure {
        exit_code: Option<i32>,
        message: String,
    },
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        *self == TransferOutcome::Success
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            TransferOutcome::Success => Ok(()),
            TransferOutcome::AuthFailure => Err(PullError::TransferAuthFailure),
            TransferOutcome::GenericFailure { exit_code, message } => {
                Err(PullError::TransferGenericFailure {
                    exit_code,
                    stderr: message,
                })
            }
        }
    }
}

pub fn has_auth_failure(stderr: &str) -> bool {
    AUTH_FAILURE_PATTERNS.iter().any(|p| stderr.contains(p))
}

/// Auth failure wins over the exit code; a non-zero exit is a generic
/// failure; otherwise success.
pub fn classify_outcome(auth_failed: bool, exit_code: Option<i32>, stderr: &str) -> TransferOutcome {
    if auth_failed {
        return TransferOutcome::AuthFailure;
    }
    match exit_code {
        Some(0) => TransferOutcome::Success,
        code => TransferOutcome::GenericFailure {
            exit_code: code,
            message: stderr.trim().to_string(),
        },
    }
}

/// Batch classification from the complete stderr text.
pub fn classify(exit_code: Option<i32>, stderr: &str) -> TransferOutcome {
    classify_outcome(has_auth_failure(stderr), exit_code, stderr)
}

/// Scans stderr as it streams in. Once tripped it stays tripped. A short
/// tail of the previous chunk is kept so a pattern split across two chunks
/// is still found.
#[derive(Debug, Default)]
pub struct AuthFailureDetector {
    tripped: bool,
    tail: String,
}

impl AuthFailureDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, chunk: &str) {
        if self.tripped {
            return;
        }
        let mut window = std::mem::take(&mut self.tail);
        window.push_str(chunk);
        if has_auth_failure(&window) {
            self.tripped = true;
            return;
        }
        let keep = AUTH_FAILURE_PATTERNS.iter().map(|p| p.len()).max().unwrap_or(0);
        let mut start = window.len().saturating_sub(keep);
        while !window.is_char_boundary(start) {
            start += 1;
        }
        self.tail = window[start..].to_string();
    }

    pub fn tripped(&self) -> bool {
        self.tripped
    }
}

/// Runs rsync, forwarding every chunk to the reporter as it arrives, and
/// classifies the result once the process and both pipes are closed.
pub fn invoke<R, P>(
    runner: &R,
    reporter: &mut P,
    remote: &RemoteIdentity,
    targets: &TransferTarget,
    destination: &Path,
) -> Result<TransferOutcome>
where
    R: CommandRunner + ?Sized,
    P: Reporter + ?Sized,
{
    let cmd = build_transfer_command(remote, targets, destination);
    info!("starting transfer: {}", cmd);
    reporter.append_output(&format!("$ {}\n", cmd));

    let mut detector = AuthFailureDetector::new();
    let output = runner.run_and_observe(&cmd, &mut |chunk| {
        if chunk.stream == Stream::Stderr {
            detector.observe(chunk.text);
        }
        reporter.append_output(chunk.text);
    })?;

    let outcome = classify_outcome(detector.tripped(), output.exit_code, &output.stderr);
    match &outcome {
        TransferOutcome::Success => info!("transfer finished"),
        other => warn!("transfer failed: {:?}", other),
    }
    Ok(outcome)
}
