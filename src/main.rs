use anyhow::Result;
use clap::Parser;
use log::debug;
use ssh_pull::{cli::Cli, config::Config, process::SystemRunner, report::ConsoleReporter, run_pull};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config = Config::from_cli(&cli)?;
    debug!("target: {} ({:?})", config.remote, config.operation);

    let runner = SystemRunner::new();
    let mut reporter = ConsoleReporter::new(config.assume_yes, config.interactive);

    // 失败已经通过 reporter 展示过，这里只设置退出码
    if let Err(e) = run_pull(&config, &runner, &mut reporter) {
        debug!("failed: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
