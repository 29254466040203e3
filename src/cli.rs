// 命令行参数解析
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ssh-pull")]
#[command(about = "Download files from a remote host over SSH with rsync")]
#[command(version)]
pub struct Cli {
    /// How to fix a missing rsync or missing key-based login
    #[arg(long, value_enum, default_value_t = PolicyArg::Interactive, global = true)]
    pub policy: PolicyArg,

    /// Oldest acceptable local rsync version
    #[arg(long, default_value = "3.0.0", global = true)]
    pub min_rsync_version: String,

    /// SSH private key to check, generate and install (default: ~/.ssh/id_rsa)
    #[arg(short, long, global = true)]
    pub key_file: Option<PathBuf>,

    /// Answer yes to every confirmation
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Never prompt; use defaults and decline confirmations
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download remote files or folders into a local folder
    Download {
        /// Remote host (`user@host`, `host`, or an `ssh-remote+...` descriptor).
        /// Optional when the targets are full remote URIs.
        #[arg(short, long)]
        remote: Option<String>,

        /// Local destination folder (asked for when missing)
        #[arg(short, long, env = "SSH_PULL_DESTINATION")]
        dest: Option<PathBuf>,

        /// Remote paths to download, primary first
        targets: Vec<String>,
    },
    /// Run the preflight checks only
    Check {
        /// Remote host
        #[arg(short, long)]
        remote: String,
    },
    /// Print the steps to set up passwordless SSH login
    Instructions {
        /// Remote host
        #[arg(short, long)]
        remote: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    /// Confirm before installing; show manual steps for SSH keys
    Interactive,
    /// Install rsync and set up SSH keys without asking
    Automatic,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_download_with_several_targets() {
        let cli = Cli::try_parse_from([
            "ssh-pull",
            "--policy",
            "automatic",
            "download",
            "-r",
            "alice@host",
            "--dest",
            "/tmp/out",
            "/a/b",
            "/a/c d",
        ])
        .unwrap();
        assert_eq!(cli.policy, PolicyArg::Automatic);
        match cli.command {
            Commands::Download { remote, dest, targets } => {
                assert_eq!(remote.as_deref(), Some("alice@host"));
                assert_eq!(dest, Some(PathBuf::from("/tmp/out")));
                assert_eq!(targets, vec!["/a/b", "/a/c d"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from(["ssh-pull", "check", "-r", "host", "--no-input", "-v"]).unwrap();
        assert!(cli.no_input);
        assert!(cli.verbose);
        assert_eq!(cli.min_rsync_version, "3.0.0");
    }
}
