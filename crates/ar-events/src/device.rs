//! Camera device descriptors.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A camera the host can capture from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CameraDevice {
    pub name: String,
    #[serde(default)]
    pub is_front_facing: bool,
}

impl CameraDevice {
    /// A rear-facing camera.
    pub fn back(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_front_facing: false,
        }
    }

    /// A front-facing (selfie) camera.
    pub fn front(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_front_facing: true,
        }
    }
}

impl fmt::Display for CameraDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_front_facing {
            write!(f, "{}:front", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Error parsing a `name[:front|:back]` device string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDeviceError(pub String);

impl fmt::Display for ParseDeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid camera device: {}", self.0)
    }
}

impl std::error::Error for ParseDeviceError {}

impl FromStr for CameraDevice {
    type Err = ParseDeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, facing) = match s.rsplit_once(':') {
            Some((name, "front")) => (name, true),
            Some((name, "back")) => (name, false),
            Some(_) | None => (s, false),
        };
        if name.trim().is_empty() {
            return Err(ParseDeviceError(s.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            is_front_facing: facing,
        })
    }
}
