// 测试替身：脚本化的命令执行与记录型 Reporter
use crate::process::{CommandRunner, CommandSpec, OutputChunk, ProcessError, ProcessOutput, Stream};
use crate::report::Reporter;
use crate::utils::error::Result;
use std::cell::RefCell;
use std::collections::VecDeque;

struct Rule {
    prefix: String,
    exit_code: Option<i32>,
    chunks: Vec<(Stream, String)>,
}

/// Answers commands from a script. A rule matches when the command line
/// (program and args joined by spaces, unquoted) starts with its prefix;
/// the first matching rule wins. Unmatched commands fail to spawn.
#[derive(Default)]
pub struct FakeRunner {
    rules: Vec<Rule>,
    missing: Vec<String>,
    calls: RefCell<Vec<CommandSpec>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, prefix: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        let mut chunks = Vec::new();
        if !stdout.is_empty() {
            chunks.push((Stream::Stdout, stdout));
        }
        if !stderr.is_empty() {
            chunks.push((Stream::Stderr, stderr));
        }
        self.respond_chunks(prefix, Some(exit_code), chunks)
    }

    pub fn respond_chunks(
        mut self,
        prefix: &str,
        exit_code: Option<i32>,
        chunks: Vec<(Stream, &str)>,
    ) -> Self {
        self.rules.push(Rule {
            prefix: prefix.to_string(),
            exit_code,
            chunks: chunks
                .into_iter()
                .map(|(stream, text)| (stream, text.to_string()))
                .collect(),
        });
        self
    }

    pub fn missing(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, program: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.program == program)
            .count()
    }
}

fn plain_line(cmd: &CommandSpec) -> String {
    std::iter::once(cmd.program.as_str())
        .chain(cmd.args.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

impl CommandRunner for FakeRunner {
    fn run_and_observe(
        &self,
        cmd: &CommandSpec,
        observer: &mut dyn FnMut(OutputChunk<'_>),
    ) -> std::result::Result<ProcessOutput, ProcessError> {
        self.calls.borrow_mut().push(cmd.clone());

        let not_found = || ProcessError::Spawn {
            program: cmd.program.clone(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        if self.missing.contains(&cmd.program) {
            return Err(not_found());
        }
        let line = plain_line(cmd);
        let rule = self
            .rules
            .iter()
            .find(|r| line.starts_with(&r.prefix))
            .ok_or_else(not_found)?;

        let mut output = ProcessOutput {
            exit_code: rule.exit_code,
            ..Default::default()
        };
        for (stream, text) in &rule.chunks {
            match stream {
                Stream::Stdout => output.stdout.push_str(text),
                Stream::Stderr => output.stderr.push_str(text),
            }
            observer(OutputChunk {
                stream: *stream,
                text,
            });
        }
        Ok(output)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Info(String),
    Warning(String),
    Error(String, Option<String>),
    Begin(String),
    Append(String),
    Clear,
    End,
    Prompt(String, String),
    OpenLink(String),
    Clipboard(String),
}

/// Records every call and answers from queued replies. Warnings default to
/// "no", error actions to "not picked", prompts to "cancelled".
#[derive(Default)]
pub struct FakeReporter {
    pub events: Vec<Event>,
    pub confirms: VecDeque<bool>,
    pub pick_action: bool,
    pub text_answer: Option<String>,
}

impl FakeReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn confirming(mut self, answer: bool) -> Self {
        self.confirms.push_back(answer);
        self
    }

    pub fn picking_actions(mut self) -> Self {
        self.pick_action = true;
        self
    }

    pub fn answering(mut self, text: &str) -> Self {
        self.text_answer = Some(text.to_string());
        self
    }

    pub fn output(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Append(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Error(text, _) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Reporter for FakeReporter {
    fn show_info(&mut self, text: &str) {
        self.events.push(Event::Info(text.to_string()));
    }

    fn show_warning(&mut self, text: &str) -> Result<bool> {
        self.events.push(Event::Warning(text.to_string()));
        Ok(self.confirms.pop_front().unwrap_or(false))
    }

    fn show_error(&mut self, text: &str, action: Option<&str>) -> Result<Option<String>> {
        self.events
            .push(Event::Error(text.to_string(), action.map(str::to_string)));
        Ok(action.filter(|_| self.pick_action).map(str::to_string))
    }

    fn begin_output(&mut self, title: &str) {
        self.events.push(Event::Begin(title.to_string()));
    }

    fn append_output(&mut self, text: &str) {
        self.events.push(Event::Append(text.to_string()));
    }

    fn clear_output(&mut self) {
        self.events.push(Event::Clear);
    }

    fn end_output(&mut self) {
        self.events.push(Event::End);
    }

    fn prompt_text(&mut self, prompt: &str, default: &str) -> Result<Option<String>> {
        self.events
            .push(Event::Prompt(prompt.to_string(), default.to_string()));
        Ok(self.text_answer.clone())
    }

    fn open_external_link(&mut self, url: &str) -> Result<()> {
        self.events.push(Event::OpenLink(url.to_string()));
        Ok(())
    }

    fn copy_to_clipboard(&mut self, text: &str) -> Result<()> {
        self.events.push(Event::Clipboard(text.to_string()));
        Ok(())
    }
}
