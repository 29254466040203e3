// 进度显示
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::time::{Duration, Instant};

// rsync --progress 行，例如 "  1,234,567  45%  1.23MB/s    0:00:05"
static PROGRESS_LINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*[\d,.]+[KMGT]?\s+\d{1,3}%").expect("valid progress pattern"));

pub fn is_progress_line(line: &str) -> bool {
    PROGRESS_LINE_RE.is_match(line)
}

/// Terminal rendering of streamed rsync output: progress lines drive a
/// spinner message, everything else is printed above it.
pub struct TransferProgress {
    progress_bar: ProgressBar,
    pending: String,
    start_time: Instant,
    lines: u64,
}

impl TransferProgress {
    pub fn new(description: &str) -> Self {
        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {prefix} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        progress_bar.set_prefix(description.to_string());
        progress_bar.enable_steady_tick(Duration::from_millis(120));

        Self {
            progress_bar,
            pending: String::new(),
            start_time: Instant::now(),
            lines: 0,
        }
    }

    /// Accepts an arbitrary chunk; only complete lines are rendered.
    pub fn feed(&mut self, text: &str) {
        self.pending.push_str(text);
        while let Some(idx) = self.pending.find(['\n', '\r']) {
            let line: String = self.pending.drain(..=idx).collect();
            self.render_line(line.trim_end_matches(['\n', '\r']));
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.lines = 0;
        self.progress_bar.set_message(String::new());
    }

    pub fn finish(&mut self) {
        if !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.render_line(&rest);
        }
        let elapsed = self.start_time.elapsed();
        self.progress_bar.finish_with_message(format!(
            "done: {} line(s) of output in {}",
            self.lines,
            format_elapsed(elapsed)
        ));
    }

    fn render_line(&mut self, line: &str) {
        if is_progress_line(line) {
            self.progress_bar.set_message(line.trim().to_string());
            return;
        }
        if line.trim().is_empty() {
            return;
        }
        self.lines += 1;
        // 非终端时进度条被隐藏，println 不会输出
        if self.progress_bar.is_hidden() {
            println!("{}", line);
        } else {
            self.progress_bar.println(line);
        }
    }
}

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs < 60 {
        format!("{:.1}s", elapsed.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m{:02}s", secs / 60, secs % 60)
    } else {
        format!("{}h{:02}m", secs / 3600, (secs % 3600) / 60)
    }
}
