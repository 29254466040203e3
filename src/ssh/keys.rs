// 本地密钥位置
use crate::utils::error::{PullError, Result};
use std::path::{Path, PathBuf};

/// Location of the local key pair used for passwordless auth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyLocation {
    private: PathBuf,
}

impl KeyLocation {
    pub fn new(private: impl Into<PathBuf>) -> Self {
        Self {
            private: private.into(),
        }
    }

    /// `~/.ssh/id_rsa`
    pub fn default_location() -> Result<Self> {
        let home = home::home_dir().ok_or_else(|| {
            PullError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Cannot determine home directory",
            ))
        })?;
        Ok(Self::new(home.join(".ssh").join("id_rsa")))
    }

    pub fn private_key(&self) -> &Path {
        &self.private
    }

    pub fn public_key(&self) -> PathBuf {
        let mut name = self.private.as_os_str().to_os_string();
        name.push(".pub");
        PathBuf::from(name)
    }

    pub fn private_key_str(&self) -> String {
        self.private.to_string_lossy().into_owned()
    }

    pub fn public_key_str(&self) -> String {
        self.public_key().to_string_lossy().into_owned()
    }
}
