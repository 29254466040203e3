// 版本比较
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid version string '{0}'")]
pub struct VersionParseError(pub String);

/// Dotted numeric version such as `3.2.7`. Missing trailing components
/// compare as zero, so `3.0` and `3.0.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    pub fn new(parts: Vec<u64>) -> Self {
        Self { parts }
    }

    pub fn parts(&self) -> &[u64] {
        &self.parts
    }
}

/// Compares `installed` against `minimum`, left to right, zero-padding the
/// shorter one.
pub fn compare(installed: &Version, minimum: &Version) -> Ordering {
    let len = installed.parts.len().max(minimum.parts.len());
    for i in 0..len {
        let a = installed.parts.get(i).copied().unwrap_or(0);
        let b = minimum.parts.get(i).copied().unwrap_or(0);
        match a.cmp(&b) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    Ordering::Equal
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError(s.to_string()));
        }
        let parts = trimmed
            .split('.')
            .map(|seg| {
                if seg.is_empty() || !seg.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                seg.parse::<u64>().ok()
            })
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| VersionParseError(s.to_string()))?;
        Ok(Self { parts })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .parts
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(".");
        f.write_str(&joined)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        compare(self, other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn v(s: &str) -> Version {
        s.parse().unwrap()
    }

    #[rstest]
    #[case("3.0", "3.0.0", Ordering::Equal)]
    #[case("3.1.0", "3.0.9", Ordering::Greater)]
    #[case("2.6.9", "3.0.0", Ordering::Less)]
    #[case("3.2.7", "3.2.7", Ordering::Equal)]
    #[case("3.10", "3.9.9", Ordering::Greater)]
    #[case("3", "3.0.1", Ordering::Less)]
    fn compares_dotted_versions(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(compare(&v(a), &v(b)), expected);
        // 反对称
        assert_eq!(compare(&v(b), &v(a)), expected.reverse());
    }

    #[rstest]
    #[case("0")]
    #[case("3.2.7")]
    #[case("1.0.0.0")]
    fn version_equals_itself(#[case] s: &str) {
        assert_eq!(compare(&v(s), &v(s)), Ordering::Equal);
    }

    #[rstest]
    #[case("")]
    #[case("3.x")]
    #[case("3..1")]
    #[case("-1.0")]
    #[case("+3.0")]
    #[case("3.+1")]
    fn rejects_malformed_strings(#[case] s: &str) {
        assert!(s.parse::<Version>().is_err());
    }

    #[test]
    fn display_round_trips_components() {
        assert_eq!(v("3.2.7").to_string(), "3.2.7");
        assert_eq!(v(" 3.1 ").parts(), &[3, 1]);
    }
}
