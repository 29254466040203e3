// 子进程执行与输出转发
use crate::process::command::CommandSpec;
use crossbeam_channel::{bounded, Sender};
use log::{debug, warn};
use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to wait for '{program}': {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Output reader thread panicked")]
    ReaderPanicked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone, Copy)]
pub struct OutputChunk<'a> {
    pub stream: Stream,
    pub text: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Process-execution capability. Every probe, remediation and transfer goes
/// through this, so tests can script the environment.
pub trait CommandRunner {
    /// Runs `cmd` to completion, calling `observer` for each output chunk in
    /// arrival order. Returns only after all output has been observed.
    fn run_and_observe(
        &self,
        cmd: &CommandSpec,
        observer: &mut dyn FnMut(OutputChunk<'_>),
    ) -> Result<ProcessOutput, ProcessError>;

    fn run(&self, cmd: &CommandSpec) -> Result<ProcessOutput, ProcessError> {
        self.run_and_observe(cmd, &mut |_| {})
    }
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run_and_observe(
        &self,
        cmd: &CommandSpec,
        observer: &mut dyn FnMut(OutputChunk<'_>),
    ) -> Result<ProcessOutput, ProcessError> {
        (**self).run_and_observe(cmd, observer)
    }
}

enum Message {
    Chunk(Stream, String),
    Closed,
}

/// Runs commands with `std::process`. stdout and stderr are each drained by a
/// reader thread into one channel so chunks reach the observer as they come.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner
    }
}

impl CommandRunner for SystemRunner {
    fn run_and_observe(
        &self,
        cmd: &CommandSpec,
        observer: &mut dyn FnMut(OutputChunk<'_>),
    ) -> Result<ProcessOutput, ProcessError> {
        debug!("running: {}", cmd);

        let stdin = if cmd.interactive {
            Stdio::inherit()
        } else {
            Stdio::null()
        };
        let mut child = Command::new(&cmd.program)
            .args(cmd.os_args())
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: cmd.program.clone(),
                source,
            })?;

        let (sender, receiver) = bounded(100);
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(Stream::Stdout, stdout, sender.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(Stream::Stderr, stderr, sender.clone()));
        }
        drop(sender);

        let mut output = ProcessOutput::default();
        let mut open = readers.len();
        while open > 0 {
            match receiver.recv() {
                Ok(Message::Chunk(stream, text)) => {
                    match stream {
                        Stream::Stdout => output.stdout.push_str(&text),
                        Stream::Stderr => output.stderr.push_str(&text),
                    }
                    observer(OutputChunk {
                        stream,
                        text: &text,
                    });
                }
                Ok(Message::Closed) => open -= 1,
                Err(_) => break,
            }
        }

        for reader in readers {
            reader.join().map_err(|_| ProcessError::ReaderPanicked)?;
        }

        let status = child.wait().map_err(|source| ProcessError::Wait {
            program: cmd.program.clone(),
            source,
        })?;
        output.exit_code = status.code();
        debug!("'{}' exited with {:?}", cmd.program, output.exit_code);
        Ok(output)
    }
}

fn spawn_reader<T>(stream: Stream, mut source: T, sender: Sender<Message>) -> thread::JoinHandle<()>
where
    T: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buffer = [0u8; 8192];
        let mut pending: Vec<u8> = Vec::new();
        loop {
            match source.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => {
                    pending.extend_from_slice(&buffer[..n]);
                    let text = take_utf8_prefix(&mut pending);
                    if !text.is_empty() && sender.send(Message::Chunk(stream, text)).is_err() {
                        return;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!("reading {:?} failed: {}", stream, e);
                    break;
                }
            }
        }
        if !pending.is_empty() {
            let rest = String::from_utf8_lossy(&pending).into_owned();
            let _ = sender.send(Message::Chunk(stream, rest));
        }
        let _ = sender.send(Message::Closed);
    })
}

// 取出完整的 UTF-8 前缀，被截断的多字节字符留到下一次
fn take_utf8_prefix(pending: &mut Vec<u8>) -> String {
    match std::str::from_utf8(pending) {
        Ok(s) => {
            let text = s.to_string();
            pending.clear();
            text
        }
        Err(e) if e.error_len().is_none() => {
            let valid = e.valid_up_to();
            let text = String::from_utf8_lossy(&pending[..valid]).into_owned();
            pending.drain(..valid);
            text
        }
        Err(_) => {
            let text = String::from_utf8_lossy(pending).into_owned();
            pending.clear();
            text
        }
    }
}
