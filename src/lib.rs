// 库文件，导出模块
pub mod cli;
pub mod config;
pub mod platform;
pub mod preflight;
pub mod probe;
pub mod process;
pub mod remedy;
pub mod report;
pub mod ssh;
pub mod transfer;
pub mod utils;
pub mod version;

#[cfg(test)]
mod test_support;

use config::{Config, Operation};
use preflight::{Preflight, PreflightOutcome};
use probe::probe_local_key_exists;
use process::CommandRunner;
use remedy::build_setup_instructions;
use report::Reporter;
use transfer::Downloader;
use utils::error::{PullError, Result};

pub fn run_pull<R, P>(config: &Config, runner: &R, reporter: &mut P) -> Result<()>
where
    R: CommandRunner + ?Sized,
    P: Reporter + ?Sized,
{
    match &config.operation {
        Operation::Download { targets } => {
            let outcome = Downloader::new(config, runner, reporter).download(targets)?;
            outcome.into_result()
        }
        Operation::Check => {
            let report = Preflight::new(runner, reporter, config.preflight_options()).run(&config.remote)?;
            reporter.show_info(&report.summary());
            match report.outcome {
                PreflightOutcome::Ready => Ok(()),
                PreflightOutcome::Blocked(reason) => Err(PullError::PreflightBlocked(reason)),
            }
        }
        Operation::Instructions => {
            let key_exists = probe_local_key_exists(&config.keys);
            reporter.show_info(&build_setup_instructions(&config.remote, &config.keys, key_exists));
            Ok(())
        }
    }
}
