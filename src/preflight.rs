// 传输前检查：平台 → rsync → 免密登录
use crate::platform::Platform;
use crate::probe::{probe_local_key_exists, probe_passwordless_auth, probe_sync_tool_version, ToolStatus};
use crate::process::CommandRunner;
use crate::remedy::{
    build_setup_instructions, generate_key_pair, install_command, install_public_key_on_remote,
    install_sync_tool,
};
use crate::report::Reporter;
use crate::ssh::{KeyLocation, RemoteIdentity};
use crate::utils::error::{PullError, Result};
use crate::version::Version;
use log::{info, warn};
use std::fmt;

pub const UNSUPPORTED_PLATFORM: &str = "unsupported-platform";
pub const SHOW_INSTRUCTIONS: &str = "Show setup instructions";

/// How a failed check is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RemediationPolicy {
    /// Ask before installing anything; for auth, show manual steps and stop.
    #[default]
    Interactive,
    /// Install rsync and set up keys without asking.
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Platform,
    Tool,
    Auth,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::Platform => "platform",
            Check::Tool => "rsync",
            Check::Auth => "ssh auth",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Satisfied,
    Remediated,
    Blocked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRecord {
    pub check: Check,
    pub result: CheckResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreflightOutcome {
    Ready,
    Blocked(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreflightReport {
    pub records: Vec<CheckRecord>,
    pub outcome: PreflightOutcome,
}

impl PreflightReport {
    pub fn is_ready(&self) -> bool {
        self.outcome == PreflightOutcome::Ready
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        for record in &self.records {
            let status = match &record.result {
                CheckResult::Satisfied => "ok".to_string(),
                CheckResult::Remediated => "fixed".to_string(),
                CheckResult::Blocked(reason) => format!("blocked: {}", reason),
            };
            out.push_str(&format!("{:<10} {}\n", record.check.to_string(), status));
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct PreflightOptions {
    pub policy: RemediationPolicy,
    pub platform: Platform,
    pub minimum_version: Version,
    pub keys: KeyLocation,
}

pub struct Preflight<'a, R: ?Sized, P: ?Sized> {
    runner: &'a R,
    reporter: &'a mut P,
    options: PreflightOptions,
}

impl<'a, R, P> Preflight<'a, R, P>
where
    R: CommandRunner + ?Sized,
    P: Reporter + ?Sized,
{
    pub fn new(runner: &'a R, reporter: &'a mut P, options: PreflightOptions) -> Self {
        Self {
            runner,
            reporter,
            options,
        }
    }

    /// One pass through every check. Stops at the first blocked check.
    pub fn run(&mut self, remote: &RemoteIdentity) -> Result<PreflightReport> {
        let mut records = Vec::new();

        if !self.options.platform.is_supported() {
            warn!("refusing to run on {}", self.options.platform);
            return Ok(blocked(records, Check::Platform, UNSUPPORTED_PLATFORM.to_string()));
        }

        let tool = self.check_tool()?;
        if let CheckResult::Blocked(reason) = &tool {
            let reason = reason.clone();
            return Ok(blocked(records, Check::Tool, reason));
        }
        records.push(CheckRecord {
            check: Check::Tool,
            result: tool,
        });

        let auth = self.check_auth(remote)?;
        if let CheckResult::Blocked(reason) = &auth {
            let reason = reason.clone();
            return Ok(blocked(records, Check::Auth, reason));
        }
        records.push(CheckRecord {
            check: Check::Auth,
            result: auth,
        });

        info!("preflight passed for {}", remote);
        Ok(PreflightReport {
            records,
            outcome: PreflightOutcome::Ready,
        })
    }

    fn check_tool(&mut self) -> Result<CheckResult> {
        let minimum = &self.options.minimum_version;
        let problem = match probe_sync_tool_version(self.runner, minimum) {
            ToolStatus::Satisfied(version) => {
                info!("rsync {} found", version);
                return Ok(CheckResult::Satisfied);
            }
            ToolStatus::Absent => "rsync is not installed".to_string(),
            ToolStatus::Insufficient(version) => {
                format!("rsync {} is older than the required {}", version, minimum)
            }
        };
        let requirement = format!("rsync {} or newer is required to download files", minimum);

        let Some(cmd) = install_command(self.options.platform) else {
            return Ok(CheckResult::Blocked(format!(
                "{}. {}; install it with your package manager",
                problem, requirement
            )));
        };

        if self.options.policy == RemediationPolicy::Interactive {
            let question = format!("{}. Install it now with `{}`?", problem, cmd);
            if !self.reporter.show_warning(&question)? {
                return Ok(CheckResult::Blocked(requirement));
            }
        } else {
            info!("{}; installing automatically", problem);
        }

        match install_sync_tool(self.runner, self.options.platform) {
            Ok(()) => {
                self.reporter.show_info("rsync installed.");
                Ok(CheckResult::Remediated)
            }
            Err(e) => Ok(CheckResult::Blocked(e.to_string())),
        }
    }

    fn check_auth(&mut self, remote: &RemoteIdentity) -> Result<CheckResult> {
        if probe_passwordless_auth(self.runner, remote) {
            return Ok(CheckResult::Satisfied);
        }

        match self.options.policy {
            RemediationPolicy::Interactive => self.explain_auth_setup(remote),
            RemediationPolicy::Automatic => Ok(self.setup_auth(remote)),
        }
    }

    // 免密登录是硬性要求：展示步骤后仍然阻塞
    fn explain_auth_setup(&mut self, remote: &RemoteIdentity) -> Result<CheckResult> {
        let keys = &self.options.keys;
        let instructions = build_setup_instructions(remote, keys, probe_local_key_exists(keys));

        let message = format!(
            "Passwordless SSH login to {} is not set up. rsync needs key-based authentication.",
            remote
        );
        if self.reporter.show_error(&message, Some(SHOW_INSTRUCTIONS))?.is_some() {
            self.reporter.append_output(&instructions);
            self.reporter.copy_to_clipboard(&instructions)?;
        }

        Ok(CheckResult::Blocked(format!(
            "{}. Set up key-based login to {} and run the command again.",
            PullError::AuthNotConfigured,
            remote
        )))
    }

    fn setup_auth(&mut self, remote: &RemoteIdentity) -> CheckResult {
        let keys = &self.options.keys;
        info!("setting up key-based login to {}", remote);

        let result = generate_key_pair(self.runner, keys)
            .and_then(|()| install_public_key_on_remote(self.runner, remote, keys));
        match result {
            Ok(()) => {
                self.reporter
                    .show_info(&format!("Installed public key on {}.", remote));
                CheckResult::Remediated
            }
            Err(e) => CheckResult::Blocked(e.to_string()),
        }
    }
}

fn blocked(mut records: Vec<CheckRecord>, check: Check, reason: String) -> PreflightReport {
    warn!("preflight blocked at {}: {}", check, reason);
    records.push(CheckRecord {
        check,
        result: CheckResult::Blocked(reason.clone()),
    });
    PreflightReport {
        records,
        outcome: PreflightOutcome::Blocked(reason),
    }
}
