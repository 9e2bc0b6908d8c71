// SPDX-License-Identifier: MPL-2.0

//! Error types for the capture core

use std::fmt;

/// Result type alias using CaptureError
pub type CaptureResult<T> = Result<T, CaptureError>;

/// Errors surfaced by the capture controller
///
/// Every configuration and lifecycle failure is reported through one of these
/// variants and is meant to be shown to the user. The core never retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureError {
    /// No matching capture device
    CameraUnavailable,
    /// Camera permission denied or restricted
    CameraUnauthorized,
    /// The hardware session rejected the device input
    CannotAddInput,
    /// The hardware session rejected a photo or frame output
    CannotAddOutput,
    /// Wrapping the device as an input port failed
    DeviceCreationFailed,
    /// The device configuration lock could not be acquired
    ZoomUpdateFailed,
    /// The hardware pipeline is already running
    CannotStartCamera,
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureError::CameraUnavailable => write!(f, "No camera is available"),
            CaptureError::CameraUnauthorized => write!(f, "Camera access is not authorized"),
            CaptureError::CannotAddInput => write!(f, "Cannot add camera input to the session"),
            CaptureError::CannotAddOutput => write!(f, "Cannot add output to the session"),
            CaptureError::DeviceCreationFailed => write!(f, "Failed to create camera input"),
            CaptureError::ZoomUpdateFailed => write!(f, "Failed to update zoom"),
            CaptureError::CannotStartCamera => write!(f, "Camera is already running"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Configuration file errors
#[derive(Debug)]
pub enum ConfigError {
    /// Reading or writing the file failed
    Io(std::io::Error),
    /// The file contents are not a valid configuration
    Parse(serde_json::Error),
    /// No configuration directory on this platform
    NoConfigDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid configuration: {}", e),
            ConfigError::NoConfigDir => write!(f, "No configuration directory available"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::NoConfigDir => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_user_facing() {
        assert_eq!(
            CaptureError::CannotStartCamera.to_string(),
            "Camera is already running"
        );
        assert_eq!(
            CaptureError::CameraUnauthorized.to_string(),
            "Camera access is not authorized"
        );
    }

    #[test]
    fn test_config_error_source() {
        use std::error::Error;
        let err = ConfigError::from(std::io::Error::other("disk gone"));
        assert!(err.source().is_some());
        assert!(ConfigError::NoConfigDir.source().is_none());
    }
}
