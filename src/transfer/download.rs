// 下载功能
use crate::config::Config;
use crate::preflight::{
    Check, Preflight, PreflightOutcome, PreflightReport, RemediationPolicy, UNSUPPORTED_PLATFORM,
};
use crate::process::CommandRunner;
use crate::report::Reporter;
use crate::transfer::command::TransferTarget;
use crate::transfer::monitor::{invoke, TransferOutcome};
use crate::utils::error::{exit_label, PullError, Result};
use crate::utils::file::{ensure_dir, expand_home};
use log::{info, warn};
use std::path::{Path, PathBuf};

pub const SETUP_GUIDE_URL: &str =
    "https://code.visualstudio.com/docs/remote/troubleshooting#_configuring-key-based-authentication";
pub const OPEN_SETUP_GUIDE: &str = "Open setup guide";

/// One download command: preflight, destination, transfer, report.
pub struct Downloader<'a, R: ?Sized, P: ?Sized> {
    config: &'a Config,
    runner: &'a R,
    reporter: &'a mut P,
}

impl<'a, R, P> Downloader<'a, R, P>
where
    R: CommandRunner + ?Sized,
    P: Reporter + ?Sized,
{
    pub fn new(config: &'a Config, runner: &'a R, reporter: &'a mut P) -> Self {
        Self {
            config,
            runner,
            reporter,
        }
    }

    /// Reports any failure through the reporter exactly once. A failed
    /// transfer is not an `Err` here; it comes back as the outcome.
    pub fn download(&mut self, targets: &[String]) -> Result<TransferOutcome> {
        let result = self.run_steps(targets);
        match &result {
            // 编排器已经展示过免密登录的问题
            Err(PullError::AuthNotConfigured) => {}
            Err(e) => {
                let message = describe_error(e);
                if let Err(report_err) = self.reporter.show_error(&message, None) {
                    warn!("could not report error: {}", report_err);
                }
            }
            Ok(_) => {}
        }
        result
    }

    fn run_steps(&mut self, targets: &[String]) -> Result<TransferOutcome> {
        let targets = TransferTarget::new(targets)?;

        let report = Preflight::new(self.runner, &mut *self.reporter, self.config.preflight_options())
            .run(&self.config.remote)?;
        if let Some(err) = self.blocked_error(report) {
            return Err(err);
        }

        let destination = self.resolve_destination()?;
        ensure_dir(&destination)?;

        self.reporter
            .begin_output(&format!("Downloading from {}", self.config.remote));
        self.reporter.clear_output();
        let outcome = invoke(
            self.runner,
            &mut *self.reporter,
            &self.config.remote,
            &targets,
            &destination,
        );
        self.reporter.end_output();

        let outcome = outcome?;
        self.report_outcome(&outcome, &targets, &destination)?;
        Ok(outcome)
    }

    fn blocked_error(&self, report: PreflightReport) -> Option<PullError> {
        let PreflightOutcome::Blocked(reason) = report.outcome else {
            return None;
        };
        let auth_explained = self.config.policy == RemediationPolicy::Interactive
            && report.records.last().map(|r| r.check) == Some(Check::Auth);
        if auth_explained {
            Some(PullError::AuthNotConfigured)
        } else {
            Some(PullError::PreflightBlocked(reason))
        }
    }

    fn resolve_destination(&mut self) -> Result<PathBuf> {
        if let Some(dest) = &self.config.destination {
            return Ok(dest.clone());
        }
        let default = home::home_dir()
            .map(|home| home.join("Downloads").to_string_lossy().into_owned())
            .unwrap_or_default();
        match self.reporter.prompt_text("Destination folder", &default)? {
            Some(answer) if !answer.trim().is_empty() => Ok(expand_home(answer.trim())),
            _ => Err(PullError::NoDestinationProvided),
        }
    }

    fn report_outcome(
        &mut self,
        outcome: &TransferOutcome,
        targets: &TransferTarget,
        destination: &Path,
    ) -> Result<()> {
        match outcome {
            TransferOutcome::Success => {
                info!("downloaded {} item(s) to {}", targets.len(), destination.display());
                self.reporter.show_info(&format!(
                    "✅ Downloaded {} item(s) to {}",
                    targets.len(),
                    destination.display()
                ));
            }
            TransferOutcome::AuthFailure => {
                let message = format!(
                    "{}. Set up key-based login to {} first.",
                    PullError::TransferAuthFailure,
                    self.config.remote
                );
                if self
                    .reporter
                    .show_error(&message, Some(OPEN_SETUP_GUIDE))?
                    .is_some()
                {
                    self.reporter.open_external_link(SETUP_GUIDE_URL)?;
                }
            }
            TransferOutcome::GenericFailure { exit_code, message } => {
                self.reporter.show_error(
                    &format!("rsync failed ({}):\n{}", exit_label(exit_code), message),
                    None,
                )?;
            }
        }
        Ok(())
    }
}

pub fn describe_error(err: &PullError) -> String {
    match err {
        PullError::PreflightBlocked(reason) if reason == UNSUPPORTED_PLATFORM => {
            format!("{} ({})", PullError::UnsupportedPlatform, UNSUPPORTED_PLATFORM)
        }
        other => other.to_string(),
    }
}
