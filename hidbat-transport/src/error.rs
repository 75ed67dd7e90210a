//! Transport error types

use thiserror::Error;

/// Errors that can occur while opening or reading the HID device
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    #[error("Device disconnected")]
    Disconnected,

    // HID-specific errors
    #[error("HID error: {0}")]
    HidError(String),

    #[error("HID permission denied: {0}")]
    HidPermissionDenied(String),

    #[error("Invalid device path: {0}")]
    InvalidPath(String),
}

impl TransportError {
    /// True when the failure is most likely fixed by udev rules or sudo
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, TransportError::HidPermissionDenied(_))
    }
}

impl From<hidapi::HidError> for TransportError {
    fn from(e: hidapi::HidError) -> Self {
        let msg = e.to_string();
        if msg.contains("Permission denied") || msg.contains("EPERM") || msg.contains("EACCES") {
            TransportError::HidPermissionDenied(msg)
        } else if msg.contains("device disconnected") || msg.contains("No such device") {
            TransportError::Disconnected
        } else {
            TransportError::HidError(msg)
        }
    }
}
