// 命令描述
use std::ffi::OsString;
use std::fmt;

/// A single program invocation as an argument vector. Nothing here is ever
/// handed to a shell; `to_shell_string` only renders a copy-pasteable form
/// for logs and instructions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    /// Inherit the terminal's stdin so the child can prompt (sudo, ssh-copy-id).
    pub interactive: bool,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            interactive: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn os_args(&self) -> Vec<OsString> {
        self.args.iter().map(OsString::from).collect()
    }

    pub fn to_shell_string(&self) -> String {
        let mut out = shell_quote(&self.program);
        for arg in &self.args {
            out.push(' ');
            out.push_str(&render_arg(arg));
        }
        out
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_shell_string())
    }
}

// 路径和主机类参数一律整体加引号，普通单词原样输出
fn render_arg(arg: &str) -> String {
    if is_plain(arg) && !arg.contains(['/', '@', ':', '~']) {
        arg.to_string()
    } else {
        always_quote(arg)
    }
}

fn is_plain(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:@%+,".contains(c))
}

/// Quotes `s` for a POSIX shell only when it contains anything other than
/// plain word characters.
pub fn shell_quote(s: &str) -> String {
    if is_plain(s) {
        s.to_string()
    } else {
        always_quote(s)
    }
}

fn always_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_words_bare_and_paths_quoted() {
        let cmd = CommandSpec::new("ssh")
            .args(["-o", "BatchMode=yes"])
            .arg("alice@host")
            .arg("exit");
        assert_eq!(cmd.to_shell_string(), "ssh -o BatchMode=yes 'alice@host' exit");

        let cmd = CommandSpec::new("brew").args(["install", "rsync"]);
        assert_eq!(cmd.to_string(), "brew install rsync");

        let cmd = CommandSpec::new("ls").arg("/tmp");
        assert_eq!(cmd.to_string(), "ls '/tmp'");
    }

    #[test]
    fn escapes_embedded_single_quotes() {
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("plain/path"), "plain/path");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn metacharacters_stay_inside_quotes() {
        let cmd = CommandSpec::new("rsync").arg("/tmp/$(rm -rf ~)");
        assert_eq!(cmd.to_shell_string(), "rsync '/tmp/$(rm -rf ~)'");
    }

    #[test]
    fn builder_keeps_interactive_flag() {
        let cmd = CommandSpec::new("sudo").interactive(true);
        assert!(cmd.interactive);
        assert!(!CommandSpec::new("ls").interactive);
    }
}
