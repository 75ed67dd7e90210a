//! hidapi-backed input report source

use std::ffi::CString;
use std::path::{Path, PathBuf};

use hidapi::{HidApi, HidDevice};
use tracing::{debug, info};

use crate::error::TransportError;
use crate::ReportSource;

/// Descriptor strings shown in the startup banner
#[derive(Debug, Clone, Default)]
pub struct DeviceInfo {
    pub path: PathBuf,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
}

impl DeviceInfo {
    /// `<manufacturer> - <product>`, with placeholders for missing strings
    pub fn banner(&self) -> String {
        format!(
            "{} - {}",
            self.manufacturer.as_deref().unwrap_or("Unknown manufacturer"),
            self.product.as_deref().unwrap_or("Unknown product")
        )
    }
}

/// Exclusively owned HID device in non-blocking mode
///
/// The underlying handle is closed when this value is dropped, so every exit
/// path (normal return, `?` propagation, panic unwinding) releases it once.
pub struct HidReportSource {
    // Declared before `_api` so the handle is closed before the context goes away
    device: HidDevice,
    info: DeviceInfo,
    _api: HidApi,
}

impl HidReportSource {
    /// Open a hidraw node (e.g. `/dev/hidraw2`) directly
    pub fn open_path(path: &Path) -> Result<Self, TransportError> {
        if !path.exists() {
            return Err(TransportError::DeviceNotFound(path.display().to_string()));
        }

        let c_path = CString::new(path.as_os_str().as_encoded_bytes())
            .map_err(|e| TransportError::InvalidPath(e.to_string()))?;

        let api = HidApi::new()?;
        let device = api.open_path(c_path.as_c_str())?;
        Self::from_device(api, device, path.to_path_buf())
    }

    /// Open the first interface matching the VID/PID pair
    pub fn open_ids(vid: u16, pid: u16) -> Result<Self, TransportError> {
        let api = HidApi::new()?;
        let device = api.open(vid, pid).map_err(|e| {
            debug!("open {:04x}:{:04x} failed: {}", vid, pid, e);
            match TransportError::from(e) {
                TransportError::HidError(_) => {
                    TransportError::DeviceNotFound(format!("{vid:04x}:{pid:04x}"))
                }
                other => other,
            }
        })?;

        let path = device
            .get_device_info()
            .map(|d| PathBuf::from(d.path().to_string_lossy().into_owned()))
            .unwrap_or_else(|_| PathBuf::from(format!("{vid:04x}:{pid:04x}")));

        Self::from_device(api, device, path)
    }

    fn from_device(api: HidApi, device: HidDevice, path: PathBuf) -> Result<Self, TransportError> {
        device.set_blocking_mode(false)?;

        // Descriptor strings are cosmetic; a device that refuses them still works
        let info = DeviceInfo {
            path,
            manufacturer: device.get_manufacturer_string().ok().flatten(),
            product: device.get_product_string().ok().flatten(),
        };
        info!("Opened HID device {} ({})", info.path.display(), info.banner());

        Ok(Self {
            device,
            info,
            _api: api,
        })
    }

    pub fn info(&self) -> &DeviceInfo {
        &self.info
    }

    /// Release the device handle now rather than at end of scope
    pub fn close(self) {
        debug!("Closing HID device {}", self.info.path.display());
    }
}

impl ReportSource for HidReportSource {
    fn read_report(&mut self, max_len: usize) -> Result<Option<Vec<u8>>, TransportError> {
        let mut buf = vec![0u8; max_len];
        match self.device.read(&mut buf)? {
            0 => Ok(None),
            len => {
                buf.truncate(len);
                Ok(Some(buf))
            }
        }
    }
}

impl Drop for HidReportSource {
    fn drop(&mut self) {
        debug!("HID device {} released", self.info.path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_not_found() {
        let err = HidReportSource::open_path(Path::new("/dev/hidbat-does-not-exist"))
            .err()
            .expect("open should fail");
        assert!(matches!(err, TransportError::DeviceNotFound(_)));
    }

    #[test]
    fn test_banner_placeholders() {
        let info = DeviceInfo {
            path: PathBuf::from("/dev/hidraw2"),
            manufacturer: Some("Compx".into()),
            product: None,
        };
        assert_eq!(info.banner(), "Compx - Unknown product");
    }

    #[test]
    #[ignore] // requires hardware
    fn hw_open_default_dongle() {
        let mut source = HidReportSource::open_ids(0x1D57, 0xFA60).expect("dongle plugged in");
        println!("{}", source.info().banner());
        let _ = source.read_report(crate::MAX_REPORT_SIZE).expect("read");
    }
}
