// 进程执行模块入口
pub mod command;
pub mod runner;

pub use command::{shell_quote, CommandSpec};
pub use runner::{CommandRunner, OutputChunk, ProcessError, ProcessOutput, Stream, SystemRunner};
