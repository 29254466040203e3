use crate::process::ProcessError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PullError>;

#[derive(Error, Debug)]
pub enum PullError {
    #[error("This platform is not supported")]
    UnsupportedPlatform,

    #[error("rsync is not installed or is older than the required version")]
    ToolAbsentOrOutdated,

    #[error("Failed to install rsync: {0}")]
    ToolInstallFailed(String),

    #[error("Passwordless SSH authentication is not configured")]
    AuthNotConfigured,

    #[error("Failed to generate SSH key pair: {0}")]
    KeyGenFailed(String),

    #[error("Failed to install public key on remote: {0}")]
    KeyInstallFailed(String),

    #[error("No destination folder provided")]
    NoDestinationProvided,

    #[error("No remote files or folders selected")]
    NoTargetsSelected,

    #[error("Cannot determine remote host from '{0}'")]
    RemoteIdentityUnparseable(String),

    #[error("rsync failed: SSH authentication was rejected")]
    TransferAuthFailure,

    #[error("rsync failed ({}): {stderr}", exit_label(.exit_code))]
    TransferGenericFailure {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("{0}")]
    PreflightBlocked(String),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

pub(crate) fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}
