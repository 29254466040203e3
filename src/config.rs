// 配置管理
use crate::cli::{Cli, Commands, PolicyArg};
use crate::platform::Platform;
use crate::preflight::{PreflightOptions, RemediationPolicy};
use crate::ssh::{is_descriptor_uri, KeyLocation, RemoteIdentity};
use crate::utils::error::PullError;
use crate::utils::file::expand_home;
use crate::version::Version;
use anyhow::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub remote: RemoteIdentity,
    pub destination: Option<PathBuf>,
    pub policy: RemediationPolicy,
    pub minimum_version: Version,
    pub platform: Platform,
    pub keys: KeyLocation,
    pub assume_yes: bool,
    pub interactive: bool,
    pub verbose: bool,
    pub operation: Operation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    Download { targets: Vec<String> },
    Check,
    Instructions,
}

impl From<PolicyArg> for RemediationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Interactive => RemediationPolicy::Interactive,
            PolicyArg::Automatic => RemediationPolicy::Automatic,
        }
    }
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let (remote, destination, operation) = match &cli.command {
            Commands::Download { remote, dest, targets } => {
                let remote = Self::determine_remote(remote.as_deref(), targets)?;
                let destination = dest
                    .as_ref()
                    .map(|d| expand_home(&d.to_string_lossy()))
                    .filter(|d| !d.as_os_str().is_empty());
                (
                    remote,
                    destination,
                    Operation::Download {
                        targets: targets.clone(),
                    },
                )
            }
            Commands::Check { remote } => (
                RemoteIdentity::from_descriptor(remote)?,
                None,
                Operation::Check,
            ),
            Commands::Instructions { remote } => (
                RemoteIdentity::from_descriptor(remote)?,
                None,
                Operation::Instructions,
            ),
        };

        let minimum_version: Version = cli
            .min_rsync_version
            .parse()
            .with_context(|| format!("Invalid --min-rsync-version '{}'", cli.min_rsync_version))?;

        let keys = match &cli.key_file {
            Some(path) => KeyLocation::new(expand_home(&path.to_string_lossy())),
            None => KeyLocation::default_location().context("Cannot locate default SSH key")?,
        };

        Ok(Config {
            remote,
            destination,
            policy: cli.policy.into(),
            minimum_version,
            platform: Platform::current(),
            keys,
            assume_yes: cli.yes,
            interactive: !cli.no_input,
            verbose: cli.verbose,
            operation,
        })
    }

    // 没有 --remote 时，从第一个完整 URI 形式的目标中提取主机
    fn determine_remote(remote: Option<&str>, targets: &[String]) -> Result<RemoteIdentity> {
        if let Some(remote) = remote {
            return Ok(RemoteIdentity::from_descriptor(remote)?);
        }
        let descriptor = targets
            .iter()
            .find(|t| is_descriptor_uri(t))
            .ok_or_else(|| PullError::RemoteIdentityUnparseable(String::new()))
            .context("No --remote given and no target carries a remote host")?;
        Ok(RemoteIdentity::from_descriptor(descriptor)?)
    }

    pub fn preflight_options(&self) -> PreflightOptions {
        PreflightOptions {
            policy: self.policy,
            platform: self.platform,
            minimum_version: self.minimum_version.clone(),
            keys: self.keys.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn builds_download_config() {
        let cli = parse(&[
            "ssh-pull", "-k", "/keys/id_rsa", "download", "-r", "alice@host", "-d", "/tmp/out", "/a",
        ]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.remote.as_str(), "alice@host");
        assert_eq!(config.destination, Some(PathBuf::from("/tmp/out")));
        assert_eq!(config.policy, RemediationPolicy::Interactive);
        assert_eq!(config.keys.private_key(), std::path::Path::new("/keys/id_rsa"));
        assert_eq!(
            config.operation,
            Operation::Download {
                targets: vec!["/a".to_string()]
            }
        );
        assert!(config.interactive);
    }

    #[test]
    fn remote_can_come_from_target_uri() {
        let cli = parse(&[
            "ssh-pull",
            "-k",
            "/keys/id_rsa",
            "download",
            "-d",
            "/tmp/out",
            "vscode-remote://ssh-remote%2Bbob%40box/srv/data",
        ]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.remote.as_str(), "bob@box");
    }

    #[test]
    fn missing_remote_is_an_error() {
        let cli = parse(&["ssh-pull", "-k", "/keys/id_rsa", "download", "/srv/data"]);
        let err = Config::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("No --remote given"));
    }

    #[test]
    fn scheme_text_inside_a_path_does_not_name_a_remote() {
        let cli = parse(&["ssh-pull", "-k", "/k", "download", "/mirror/https://example.com/file"]);
        let err = Config::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("No --remote given"));
    }

    #[test]
    fn bad_min_version_is_rejected() {
        let cli = parse(&[
            "ssh-pull", "-k", "/k", "--min-rsync-version", "three", "check", "-r", "host",
        ]);
        assert!(Config::from_cli(&cli).is_err());
    }

    #[test]
    fn automatic_policy_maps_through() {
        let cli = parse(&["ssh-pull", "-k", "/k", "--policy", "automatic", "--no-input", "check", "-r", "host"]);
        let config = Config::from_cli(&cli).unwrap();
        assert_eq!(config.policy, RemediationPolicy::Automatic);
        assert!(!config.interactive);
        assert_eq!(config.operation, Operation::Check);
        assert_eq!(config.preflight_options().policy, RemediationPolicy::Automatic);
    }
}
