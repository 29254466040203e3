// 用户交互抽象
pub mod console;

pub use console::ConsoleReporter;

use crate::utils::error::Result;

/// What the workflow needs from its host: messages, a streaming output pane,
/// and a few questions. The host owns the output pane's lifecycle.
pub trait Reporter {
    fn show_info(&mut self, text: &str);

    /// Shows a warning and asks the user to confirm. `true` means go ahead.
    fn show_warning(&mut self, text: &str) -> Result<bool>;

    /// Shows an error, optionally offering one action. Returns the action
    /// label if the user picked it.
    fn show_error(&mut self, text: &str, action: Option<&str>) -> Result<Option<String>>;

    /// Opens the output pane.
    fn begin_output(&mut self, title: &str);

    fn append_output(&mut self, text: &str);

    fn clear_output(&mut self);

    /// Closes the output pane, flushing anything buffered.
    fn end_output(&mut self);

    /// `None` when the user cancels.
    fn prompt_text(&mut self, prompt: &str, default: &str) -> Result<Option<String>>;

    fn open_external_link(&mut self, url: &str) -> Result<()>;

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()>;
}
