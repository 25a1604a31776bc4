use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which kind of media the app searches for upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Images,
    Videos,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Images, Mode::Videos];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Images => "images",
            Mode::Videos => "videos",
        }
    }

    /// Key of the result array in a search response.
    pub fn response_key(self) -> &'static str {
        match self {
            Mode::Images => "photos",
            Mode::Videos => "videos",
        }
    }

    pub(crate) fn names() -> Vec<String> {
        Self::ALL.iter().map(|m| m.as_str().to_string()).collect()
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "images" => Ok(Mode::Images),
            "videos" => Ok(Mode::Videos),
            _ => Err(Error::InvalidMode { mode: s.to_string(), valid: Self::names() }),
        }
    }
}
