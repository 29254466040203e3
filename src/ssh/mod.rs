// SSH模块入口
pub mod identity;
pub mod keys;

pub use identity::{is_descriptor_uri, remote_path_from_descriptor, RemoteIdentity};
pub use keys::KeyLocation;
