//! hidbat - battery status monitor for USB HID wireless dongles
//!
//! Decodes the dongle's battery input report, keeps a de-duplicated,
//! rate-limited view of the latest reading and optionally appends every
//! reading to a history file.

pub mod battery_log;
pub mod config;
pub mod error;
pub mod monitor;
pub mod report;
pub mod shutdown;
pub mod sink;
pub mod tracker;

pub use battery_log::{BatteryLog, LogError};
pub use config::{ConfigError, LoggingConfig, MonitorConfig};
pub use error::MonitorError;
pub use monitor::{Cycle, Monitor};
pub use report::{decode, BatteryReading, ChargingState, ReportLayout};
pub use shutdown::ShutdownFlag;
pub use sink::{ConsoleSink, RecordingSink, StatusSink};
pub use tracker::{Emission, StatusTracker};

pub use hidbat_transport::{HidReportSource, ReportSource, TransportError};
