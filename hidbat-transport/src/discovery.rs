//! Enumeration of HID interfaces belonging to the monitored dongle

use std::path::PathBuf;

use hidapi::HidApi;

use crate::error::TransportError;

/// One HID interface of the dongle, as reported by hidapi
#[derive(Debug, Clone)]
pub struct DeviceSummary {
    pub path: PathBuf,
    pub vid: u16,
    pub pid: u16,
    pub interface: i32,
    pub usage_page: u16,
    pub usage: u16,
    pub product: Option<String>,
}

/// List every interface with the given VID/PID
///
/// A dongle usually exposes several interfaces (keyboard, mouse, vendor);
/// only one of them carries the battery report.
pub fn list_devices(vid: u16, pid: u16) -> Result<Vec<DeviceSummary>, TransportError> {
    let api = HidApi::new()?;
    let mut devices: Vec<DeviceSummary> = api
        .device_list()
        .filter(|d| d.vendor_id() == vid && d.product_id() == pid)
        .map(|d| DeviceSummary {
            path: PathBuf::from(d.path().to_string_lossy().into_owned()),
            vid: d.vendor_id(),
            pid: d.product_id(),
            interface: d.interface_number(),
            usage_page: d.usage_page(),
            usage: d.usage(),
            product: d.product_string().map(str::to_owned),
        })
        .collect();
    devices.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(devices)
}
