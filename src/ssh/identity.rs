// 远程主机标识解析
use crate::utils::error::{PullError, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::fmt;

static SSH_REMOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"ssh-remote\+(.+)").expect("valid ssh-remote pattern"));

static SCHEME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9+.-]*://").expect("valid scheme pattern"));

static IDENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9._-]+@)?[A-Za-z0-9_][A-Za-z0-9._-]*$").expect("valid identity pattern")
});

/// `user@host` or bare `host`, as accepted by ssh and rsync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteIdentity(String);

// 编辑器对特殊主机名使用十六进制编码的 JSON
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HexHostSpec {
    host_name: String,
    user: Option<String>,
    port: Option<u16>,
}

impl RemoteIdentity {
    /// Validates a plain `user@host` / `host` string.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.starts_with('-') || !IDENTITY_RE.is_match(trimmed) {
            return Err(PullError::RemoteIdentityUnparseable(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Extracts the identity from a remote-session descriptor: a plain
    /// identity, an `ssh-remote+...` authority, or a full
    /// `scheme://authority/path` URI. Percent-encoding is decoded first.
    pub fn from_descriptor(descriptor: &str) -> Result<Self> {
        let unparseable = || PullError::RemoteIdentityUnparseable(descriptor.to_string());

        let (authority, _) = split_descriptor(descriptor.trim());
        if authority.is_empty() {
            return Err(unparseable());
        }
        let authority = decode(authority);
        debug!("decoded remote authority: {}", authority);

        let Some(caps) = SSH_REMOTE_RE.captures(&authority) else {
            return Self::new(&authority).map_err(|_| unparseable());
        };
        let payload = &caps[1];

        if let Some(spec) = decode_hex_host(payload) {
            if let Some(port) = spec.port {
                warn!(
                    "remote {} uses port {}; configure it in ~/.ssh/config so ssh and rsync pick it up",
                    spec.host_name, port
                );
            }
            let joined = match spec.user {
                Some(user) if !user.is_empty() => format!("{}@{}", user, spec.host_name),
                _ => spec.host_name,
            };
            return Self::new(&joined).map_err(|_| unparseable());
        }

        Self::new(payload).map_err(|_| unparseable())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn host(&self) -> &str {
        self.0.rsplit_once('@').map(|(_, host)| host).unwrap_or(&self.0)
    }

    pub fn user(&self) -> Option<&str> {
        self.0.rsplit_once('@').map(|(user, _)| user)
    }
}

impl fmt::Display for RemoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True when the input starts with a URI scheme such as `vscode-remote://`.
pub fn is_descriptor_uri(input: &str) -> bool {
    SCHEME_RE.is_match(input)
}

/// Returns the remote path part of a descriptor URI, or the input unchanged
/// when it is already a plain path.
pub fn remote_path_from_descriptor(input: &str) -> String {
    if !is_descriptor_uri(input) {
        return input.to_string();
    }
    let (_, path) = split_descriptor(input);
    let path = decode(path);
    if path.is_empty() {
        "/".to_string()
    } else {
        path
    }
}

// 拆分为 (authority, path)；没有 scheme 时整个输入就是 authority
fn split_descriptor(input: &str) -> (&str, &str) {
    let Some(scheme) = SCHEME_RE.find(input) else {
        return (input, "");
    };
    let rest = &input[scheme.end()..];
    match rest.find('/') {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    }
}

fn decode(s: &str) -> String {
    urlencoding::decode(s)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| s.to_string())
}

fn decode_hex_host(payload: &str) -> Option<HexHostSpec> {
    if payload.len() < 4 || payload.len() % 2 != 0 || !payload.starts_with("7b") {
        return None;
    }
    let bytes = payload
        .as_bytes()
        .chunks(2)
        .map(|pair| {
            let pair = std::str::from_utf8(pair).ok()?;
            u8::from_str_radix(pair, 16).ok()
        })
        .collect::<Option<Vec<u8>>>()?;
    serde_json::from_slice(&bytes).ok()
}
