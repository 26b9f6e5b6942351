//! store-relative path values.
//!
//! every path handed to or returned from a [`FileStore`](super::FileStore) is a
//! [`RelativePath`]: a normalized sequence of forward-slash separated segments,
//! interpreted relative to the store's base. Paths are never absolute and never
//! climb out of the base with `..`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use thiserror::Error;

/// A validated, normalized path relative to a store root.
///
/// Two paths are equal iff their segment sequences are equal (case-sensitive).
/// Ordering is segment-wise, so a folder always sorts before anything inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelativePath {
    segments: Vec<String>,
}

impl RelativePath {
    /// the empty path, i.e. the store root itself
    pub fn root() -> Self {
        Self::default()
    }

    /// parse a path, accepting `/` or `\` as separators.
    ///
    /// Empty and `.` segments are dropped. `..` segments, leading separators
    /// and drive prefixes are rejected.
    pub fn new(path: impl AsRef<str>) -> Result<Self, InvalidPathError> {
        let path = path.as_ref();

        if path.starts_with('/') || path.starts_with('\\') {
            return Err(InvalidPathError::Absolute(path.to_string()));
        }

        let mut segments = Vec::new();
        for segment in path.split(['/', '\\']) {
            match segment {
                "" | "." => continue,
                ".." => return Err(InvalidPathError::ParentSegment(path.to_string())),
                s if s.ends_with(':') => return Err(InvalidPathError::Absolute(path.to_string())),
                s => segments.push(s.to_string()),
            }
        }

        Ok(Self { segments })
    }

    /// build a path from a trusted constant such as a well-known file name.
    ///
    /// No validation happens here, callers pass compile-time names only.
    pub(crate) fn known(path: &'static str) -> Self {
        Self {
            segments: path
                .split('/')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// convert a filesystem path (already relative to a base) into a RelativePath
    pub fn from_path(path: &Path) -> Result<Self, InvalidPathError> {
        let text = path
            .to_str()
            .ok_or_else(|| InvalidPathError::NotUnicode(path.to_string_lossy().into_owned()))?;
        Self::new(text)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    /// the final segment, typically a file name
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// concatenate `other` onto this path
    pub fn join(&self, other: &RelativePath) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + other.segments.len());
        segments.extend(self.segments.iter().cloned());
        segments.extend(other.segments.iter().cloned());
        Self { segments }
    }

    /// this path without its final segment (strips a file name to reach its folder).
    /// The root stays the root.
    pub fn without_last(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// check whether `prefix` is a (segment-wise) prefix of this path
    pub fn starts_with(&self, prefix: &RelativePath) -> bool {
        self.segments.len() >= prefix.segments.len()
            && self.segments.iter().zip(&prefix.segments).all(|(a, b)| a == b)
    }

    /// the remainder after `prefix`, if `prefix` is a prefix of this path
    pub fn strip_prefix(&self, prefix: &RelativePath) -> Option<Self> {
        if !self.starts_with(prefix) {
            return None;
        }
        Some(Self {
            segments: self.segments[prefix.segments.len()..].to_vec(),
        })
    }

    /// resolve against a filesystem base directory
    pub fn to_path_buf(&self, base: &Path) -> PathBuf {
        let mut full = base.to_path_buf();
        for segment in &self.segments {
            full.push(segment);
        }
        full
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for RelativePath {
    type Err = InvalidPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<&str> for RelativePath {
    type Error = InvalidPathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// error type for paths that cannot be expressed relative to a store root
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidPathError {
    #[error("path must be relative: '{0}'")]
    Absolute(String),

    #[error("path may not contain '..': '{0}'")]
    ParentSegment(String),

    #[error("path is not valid unicode: '{0}'")]
    NotUnicode(String),
}

/// A file-name pattern with `*` and `?` wildcards, e.g. `*.bookmark.json`.
///
/// Patterns match the final segment only.
#[derive(Debug, Clone)]
pub struct FilePattern {
    source: String,
    /// `None` matches everything
    regex: Option<Regex>,
}

impl FilePattern {
    /// matches every file name
    pub const ANY: &'static str = "*";

    pub fn any() -> Self {
        Self {
            source: Self::ANY.to_string(),
            regex: None,
        }
    }

    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        if pattern == Self::ANY {
            return Ok(Self::any());
        }

        let mut expr = String::with_capacity(pattern.len() + 8);
        expr.push('^');
        for c in pattern.chars() {
            match c {
                '*' => expr.push_str(".*"),
                '?' => expr.push('.'),
                c => expr.push_str(&regex::escape(c.encode_utf8(&mut [0; 4]))),
            }
        }
        expr.push('$');

        Ok(Self {
            source: pattern.to_string(),
            regex: Some(Regex::new(&expr)?),
        })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        match &self.regex {
            Some(re) => re.is_match(file_name),
            None => true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}
