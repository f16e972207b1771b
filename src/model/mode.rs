use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Comparison target for the remote-deployed tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Preview,
    Prod,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Preview => "preview",
            Mode::Prod => "prod",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Mode::Preview => Mode::Prod,
            Mode::Prod => Mode::Preview,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Preview => "preview environment",
            Mode::Prod => "production environment",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim() {
            "preview" => Ok(Mode::Preview),
            "prod" | "production" => Ok(Mode::Prod),
            other => anyhow::bail!("unknown mode '{}' (expected preview or prod)", other),
        }
    }
}

/// Per-path change tag reported by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Modified,
    Added,
    Deleted,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkerColor {
    Yellow,
    Green,
    Red,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatusMarker {
    pub icon: &'static str,
    pub color: MarkerColor,
    pub label: &'static str,
}

pub const STATUS_MARKERS: [(FileStatus, StatusMarker); 3] = [
    (
        FileStatus::Modified,
        StatusMarker {
            icon: "★",
            color: MarkerColor::Yellow,
            label: "modified",
        },
    ),
    (
        FileStatus::Added,
        StatusMarker {
            icon: "+",
            color: MarkerColor::Green,
            label: "added",
        },
    ),
    (
        FileStatus::Deleted,
        StatusMarker {
            icon: "-",
            color: MarkerColor::Red,
            label: "deleted",
        },
    ),
];

impl FileStatus {
    /// Parses a wire tag; anything other than the three known tags means unchanged.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "modified" => Some(FileStatus::Modified),
            "added" => Some(FileStatus::Added),
            "deleted" => Some(FileStatus::Deleted),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FileStatus::Modified => "modified",
            FileStatus::Added => "added",
            FileStatus::Deleted => "deleted",
        }
    }

    pub fn marker(self) -> StatusMarker {
        let idx = match self {
            FileStatus::Modified => 0,
            FileStatus::Added => 1,
            FileStatus::Deleted => 2,
        };
        STATUS_MARKERS[idx].1
    }
}
