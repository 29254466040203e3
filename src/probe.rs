// 环境探测：rsync 版本、免密登录、本地密钥
use crate::process::{CommandRunner, CommandSpec};
use crate::ssh::{KeyLocation, RemoteIdentity};
use crate::version::{compare, Version};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;

pub const SYNC_TOOL: &str = "rsync";

static RSYNC_VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"rsync\s+version\s+v?(\d+(?:\.\d+)*)").expect("valid rsync version pattern")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolStatus {
    Satisfied(Version),
    Absent,
    Insufficient(Version),
}

impl ToolStatus {
    pub fn is_satisfied(&self) -> bool {
        matches!(self, ToolStatus::Satisfied(_))
    }
}

pub fn parse_sync_tool_version(report: &str) -> Option<Version> {
    let caps = RSYNC_VERSION_RE.captures(report)?;
    caps[1].parse().ok()
}

pub fn probe_sync_tool_version<R: CommandRunner + ?Sized>(runner: &R, minimum: &Version) -> ToolStatus {
    let cmd = CommandSpec::new(SYNC_TOOL).arg("--version");
    let output = match runner.run(&cmd) {
        Ok(output) if output.success() => output,
        Ok(output) => {
            debug!("rsync --version exited with {:?}", output.exit_code);
            return ToolStatus::Absent;
        }
        Err(e) => {
            debug!("rsync --version could not run: {}", e);
            return ToolStatus::Absent;
        }
    };

    let Some(installed) = parse_sync_tool_version(&output.stdout) else {
        debug!("no version found in rsync output");
        return ToolStatus::Absent;
    };

    if compare(&installed, minimum) == Ordering::Less {
        info!("rsync {} is older than required {}", installed, minimum);
        ToolStatus::Insufficient(installed)
    } else {
        debug!("rsync {} satisfies {}", installed, minimum);
        ToolStatus::Satisfied(installed)
    }
}

pub fn passwordless_auth_command(remote: &RemoteIdentity) -> CommandSpec {
    CommandSpec::new("ssh")
        .args(["-o", "BatchMode=yes", "-o", "ConnectTimeout=10"])
        .arg(remote.as_str())
        .arg("exit")
}

/// Any failure, whether refused key, unreachable host or missing ssh, reads
/// as "not configured".
pub fn probe_passwordless_auth<R: CommandRunner + ?Sized>(runner: &R, remote: &RemoteIdentity) -> bool {
    match runner.run(&passwordless_auth_command(remote)) {
        Ok(output) => {
            if !output.success() {
                debug!("batch-mode ssh to {} failed: {}", remote, output.stderr.trim());
            }
            output.success()
        }
        Err(e) => {
            debug!("ssh could not run: {}", e);
            false
        }
    }
}

pub fn probe_local_key_exists(keys: &KeyLocation) -> bool {
    keys.private_key().is_file()
}
