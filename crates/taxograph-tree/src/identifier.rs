//! Node identifiers.
//!
//! Raw taxonomy data uses either numbers (`"id": 3`) or strings
//! (`"uri": "occupation/bandbox-maker"`) to name nodes. Both are kept as-is:
//! `3` and `"3"` are different identifiers, and converting a `&str` always
//! gives the text form. Only [`FromStr`] reads digits as a number; it is meant
//! for user-typed text, see [`crate::identifier_from_text`].

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Opaque identifier equal to some node's `uri`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeIdentifier {
    Number(i64),
    Text(String),
}

impl NodeIdentifier {
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Number(_) => None,
            Self::Text(s) => Some(s.as_str()),
        }
    }

    /// Split a comma-separated path such as `1,3` or
    /// `Manufacturing,Wood workers` into trimmed segments.
    ///
    /// Empty segments are skipped, so `""` is the empty path.
    pub fn path_segments(text: &str) -> Vec<&str> {
        text.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }
}

impl fmt::Display for NodeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Digit-only text (with an optional leading `-`) becomes a number, anything
/// else stays text.
impl FromStr for NodeIdentifier {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('-').unwrap_or(s);
        if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(n) = s.parse::<i64>() {
                return Ok(Self::Number(n));
            }
        }
        Ok(Self::Text(s.to_string()))
    }
}

impl From<&str> for NodeIdentifier {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for NodeIdentifier {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for NodeIdentifier {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for NodeIdentifier {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u32> for NodeIdentifier {
    fn from(value: u32) -> Self {
        Self::Number(value.into())
    }
}
