//! Transport layer for reading battery reports from a USB HID dongle
//!
//! The monitor only needs one thing from the device: "give me the next input
//! report if there is one, without blocking". That contract is the
//! [`ReportSource`] trait. [`HidReportSource`] implements it on top of
//! `hidapi` (hidraw on Linux); tests implement it with scripted reports.

pub mod error;

mod discovery;
mod hid_input;

pub use discovery::{list_devices, DeviceSummary};
pub use error::TransportError;
pub use hid_input::{DeviceInfo, HidReportSource};

/// Largest input report a full-speed HID device can deliver in one transfer
pub const MAX_REPORT_SIZE: usize = 64;

/// Source of raw HID input reports
///
/// Implementations must never block: when no report is pending,
/// `read_report` returns `Ok(None)` immediately.
pub trait ReportSource {
    /// Read at most `max_len` bytes of the next pending input report
    fn read_report(&mut self, max_len: usize) -> Result<Option<Vec<u8>>, TransportError>;
}

impl<T: ReportSource + ?Sized> ReportSource for Box<T> {
    fn read_report(&mut self, max_len: usize) -> Result<Option<Vec<u8>>, TransportError> {
        (**self).read_report(max_len)
    }
}
