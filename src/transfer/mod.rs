// 传输模块入口
pub mod command;
pub mod download;
pub mod monitor;
pub mod progress;

pub use command::{build_transfer_command, TransferTarget};
pub use download::Downloader;
pub use monitor::{classify, invoke, TransferOutcome};
