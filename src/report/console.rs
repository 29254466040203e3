// 终端实现
use crate::report::Reporter;
use crate::transfer::progress::TransferProgress;
use crate::utils::error::Result;
use dialoguer::{Confirm, Input};
use log::{debug, warn};
use std::io::Write;
use std::process::{Command, Stdio};

/// Reporter for a terminal session: dialoguer prompts, an indicatif spinner
/// for the output pane.
pub struct ConsoleReporter {
    /// Answer yes to confirmations without asking.
    assume_yes: bool,
    /// When false, never block on a prompt.
    interactive: bool,
    progress: Option<TransferProgress>,
}

impl ConsoleReporter {
    pub fn new(assume_yes: bool, interactive: bool) -> Self {
        Self {
            assume_yes,
            interactive,
            progress: None,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn show_info(&mut self, text: &str) {
        println!("{}", text);
    }

    fn show_warning(&mut self, text: &str) -> Result<bool> {
        eprintln!("⚠️  {}", text);
        if self.assume_yes {
            return Ok(true);
        }
        if !self.interactive {
            return Ok(false);
        }
        Ok(Confirm::new()
            .with_prompt("Continue?")
            .default(false)
            .interact()?)
    }

    fn show_error(&mut self, text: &str, action: Option<&str>) -> Result<Option<String>> {
        eprintln!("❌ {}", text);
        let Some(action) = action else {
            return Ok(None);
        };
        if !self.interactive {
            return Ok(None);
        }
        let picked = Confirm::new()
            .with_prompt(format!("{}?", action))
            .default(false)
            .interact()?;
        Ok(picked.then(|| action.to_string()))
    }

    fn begin_output(&mut self, title: &str) {
        if let Some(mut previous) = self.progress.take() {
            previous.finish();
        }
        self.progress = Some(TransferProgress::new(title));
    }

    fn append_output(&mut self, text: &str) {
        match self.progress.as_mut() {
            Some(progress) => progress.feed(text),
            None => print!("{}", text),
        }
    }

    fn clear_output(&mut self) {
        if let Some(progress) = self.progress.as_mut() {
            progress.clear();
        }
    }

    fn end_output(&mut self) {
        if let Some(mut progress) = self.progress.take() {
            progress.finish();
        }
    }

    fn prompt_text(&mut self, prompt: &str, default: &str) -> Result<Option<String>> {
        if !self.interactive {
            return Ok(Some(default.to_string()).filter(|s| !s.is_empty()));
        }
        let answer: String = Input::new()
            .with_prompt(prompt)
            .default(default.to_string())
            .allow_empty(true)
            .interact_text()?;
        let answer = answer.trim().to_string();
        Ok(Some(answer).filter(|s| !s.is_empty()))
    }

    fn open_external_link(&mut self, url: &str) -> Result<()> {
        println!("🔗 {}", url);

        #[cfg(target_os = "macos")]
        let opener = "open";
        #[cfg(not(target_os = "macos"))]
        let opener = "xdg-open";

        // 打不开浏览器时，上面已经打印了链接
        if let Err(e) = Command::new(opener)
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            warn!("could not launch {}: {}", opener, e);
        }
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        #[cfg(target_os = "macos")]
        let (program, args): (&str, &[&str]) = ("pbcopy", &[]);
        #[cfg(not(target_os = "macos"))]
        let (program, args): (&str, &[&str]) = ("xclip", &["-selection", "clipboard"]);

        let copied = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .and_then(|mut child| {
                if let Some(mut stdin) = child.stdin.take() {
                    stdin.write_all(text.as_bytes())?;
                }
                child.wait()
            });

        match copied {
            Ok(status) if status.success() => {
                println!("📋 Copied to clipboard.");
            }
            other => {
                debug!("{} unavailable: {:?}", program, other);
                println!("Copy the following:\n\n{}", text);
            }
        }
        Ok(())
    }
}
