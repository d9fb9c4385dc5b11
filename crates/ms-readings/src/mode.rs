use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ReadingError;

/// Which form family a synthetic reading fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReadingMode {
    #[default]
    #[serde(rename = "metal-alone")]
    RawMetal,
    #[serde(rename = "scrap-alone")]
    Scrap,
    /// Raw first, then scrap.
    #[serde(rename = "scrap-metal")]
    Mixed,
}

impl ReadingMode {
    pub const ALL: [ReadingMode; 3] = [ReadingMode::RawMetal, ReadingMode::Scrap, ReadingMode::Mixed];

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingMode::RawMetal => "metal-alone",
            ReadingMode::Scrap => "scrap-alone",
            ReadingMode::Mixed => "scrap-metal",
        }
    }
}

impl fmt::Display for ReadingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingMode {
    type Err = ReadingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReadingMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ReadingError::UnknownMode(wanted.to_string()))
    }
}
