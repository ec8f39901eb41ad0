//! Collision policy definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do when the target file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Re-fetch and replace the existing file (default).
    #[default]
    Overwrite,
    /// Leave the existing file alone without issuing a request.
    Skip,
    /// Fetch, compare checksums, and only replace the file when it differs.
    Verify,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Skip => write!(f, "skip"),
            CollisionPolicy::Verify => write!(f, "verify"),
        }
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "skip" => Ok(CollisionPolicy::Skip),
            "verify" => Ok(CollisionPolicy::Verify),
            _ => Err(format!("Unknown collision policy: {}", s)),
        }
    }
}
