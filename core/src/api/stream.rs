use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Named video streams exposed by the robot's pipeline stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamName {
    Raw,
    Gray,
    Blur,
    Canny,
    Roi,
    #[default]
    Processed,
}

impl StreamName {
    pub const ALL: [StreamName; 6] = [
        StreamName::Raw,
        StreamName::Gray,
        StreamName::Blur,
        StreamName::Canny,
        StreamName::Roi,
        StreamName::Processed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StreamName::Raw => "raw",
            StreamName::Gray => "gray",
            StreamName::Blur => "blur",
            StreamName::Canny => "canny",
            StreamName::Roi => "roi",
            StreamName::Processed => "processed",
        }
    }
}

impl fmt::Display for StreamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StreamName {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        StreamName::ALL
            .into_iter()
            .find(|stream| stream.as_str() == value)
            .ok_or_else(|| format!("unknown stream '{value}'"))
    }
}
