//! Namespaces - where a package's targets live.
//!
//! A namespace is a path-like identifier such as
//! `github.com\jurgen-kluft\cvkmem`. The build engine uses it to lay out
//! generated project files and build outputs, so it is kept as a list of
//! validated segments rather than a raw string.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::registry::ConfigError;

/// A validated namespace path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace {
    segments: Vec<String>,
}

impl Namespace {
    /// Parse a namespace. Segments may be separated by `\` or `/`.
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidNamespace {
            namespace: s.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(invalid("namespace is empty"));
        }

        let mut segments = Vec::new();
        for segment in trimmed.split(['\\', '/']) {
            if segment.is_empty() {
                return Err(invalid("empty path segment"));
            }
            if segment == "." || segment == ".." {
                return Err(invalid("relative path segments are not allowed"));
            }
            if segment.chars().any(char::is_whitespace) {
                return Err(invalid("path segments must not contain whitespace"));
            }
            segments.push(segment.to_string());
        }

        Ok(Namespace { segments })
    }

    /// The individual path segments.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The last segment, usually the package's own directory.
    pub fn leaf(&self) -> &str {
        // parse() never yields an empty segment list
        self.segments.last().map(String::as_str).unwrap_or_default()
    }

    /// Relative output path for the build engine, using the host separator.
    pub fn to_path(&self) -> PathBuf {
        self.segments.iter().collect()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("\\"))
    }
}

impl FromStr for Namespace {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::parse(s)
    }
}

impl Serialize for Namespace {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Namespace::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_parse_backslash_namespace() {
        let ns = Namespace::parse("github.com\\jurgen-kluft\\cvkmem").unwrap();
        assert_eq!(ns.segments(), ["github.com", "jurgen-kluft", "cvkmem"]);
        assert_eq!(ns.leaf(), "cvkmem");
        assert_eq!(ns.to_string(), "github.com\\jurgen-kluft\\cvkmem");
    }

    #[test]
    fn test_forward_slashes_normalize() {
        let a = Namespace::parse("github.com/jurgen-kluft/cbase").unwrap();
        let b = Namespace::parse("github.com\\jurgen-kluft\\cbase").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_to_path() {
        let ns = Namespace::parse("github.com/jurgen-kluft/cbase").unwrap();
        assert_eq!(
            ns.to_path(),
            Path::new("github.com").join("jurgen-kluft").join("cbase")
        );
    }

    #[test]
    fn test_rejects_bad_namespaces() {
        for bad in ["", "   ", "a\\\\b", "a/../b", "a/./b", "has space/x", "trailing/"] {
            let err = Namespace::parse(bad).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidNamespace { .. }),
                "expected InvalidNamespace for {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_deserialize_validates() {
        #[derive(Deserialize)]
        struct Wrapper {
            ns: Namespace,
        }

        let ok: Wrapper = toml::from_str(r#"ns = "a/b""#).unwrap();
        assert_eq!(ok.ns.leaf(), "b");

        let bad: Result<Wrapper, _> = toml::from_str(r#"ns = "a//b""#);
        assert!(bad.is_err());
    }
}
