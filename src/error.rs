//! Monitor error types

use std::path::PathBuf;

use hidbat_transport::TransportError;
use thiserror::Error;

/// Fatal errors of the poll loop
///
/// Log write failures are not here: they are reported and the loop goes on.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Device missing, permission denied or otherwise unopenable
    #[error("Error opening HID device {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: TransportError,
    },

    /// Unexpected failure of a non-blocking read ("no data" is not an error)
    #[error("Error reading HID device: {0}")]
    Read(#[source] TransportError),
}

impl MonitorError {
    pub fn is_permission_denied(&self) -> bool {
        match self {
            MonitorError::Open { source, .. } | MonitorError::Read(source) => {
                source.is_permission_denied()
            }
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            MonitorError::Open {
                source: TransportError::DeviceNotFound(_),
                ..
            }
        )
    }
}
