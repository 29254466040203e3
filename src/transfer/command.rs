// rsync 命令构建
use crate::probe::SYNC_TOOL;
use crate::process::CommandSpec;
use crate::ssh::{remote_path_from_descriptor, RemoteIdentity};
use crate::utils::error::{PullError, Result};
use log::warn;
use std::path::Path;

/// Remote inner transport: never prompt, fail instead.
pub const INNER_TRANSPORT: &str = "ssh -o BatchMode=yes";

/// Remote paths to pull, in the order given. Duplicates are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferTarget {
    paths: Vec<String>,
}

impl TransferTarget {
    pub fn new<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut collected = Vec::new();
        for raw in paths {
            let path = remote_path_from_descriptor(raw.as_ref());
            if path.trim().is_empty() || path.contains('\0') {
                return Err(PullError::NoTargetsSelected);
            }
            if !path.starts_with('/') {
                warn!("remote path '{}' is relative; rsync resolves it from the remote home", path);
            }
            collected.push(path);
        }
        if collected.is_empty() {
            return Err(PullError::NoTargetsSelected);
        }
        Ok(Self { paths: collected })
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// `rsync -avz --progress --protect-args -e "ssh -o BatchMode=yes" -- host:p1 host:p2 ... dest`
///
/// Every path is its own argv element; `--protect-args` stops the remote
/// shell from splitting names with spaces. Nothing after `--` is read as an
/// option, so a destination such as `-n` stays a path.
pub fn build_transfer_command(
    remote: &RemoteIdentity,
    targets: &TransferTarget,
    destination: &Path,
) -> CommandSpec {
    let mut cmd = CommandSpec::new(SYNC_TOOL)
        .args(["-avz", "--progress", "--protect-args", "-e", INNER_TRANSPORT, "--"]);
    for path in targets.paths() {
        cmd = cmd.arg(format!("{}:{}", remote, path));
    }
    cmd.arg(destination.to_string_lossy())
}
