//! The poll loop: read, decode, track, emit, sleep
//!
//! Everything runs on the calling thread. The only blocking call is the fixed
//! sleep between cycles; reads are non-blocking, so a Ctrl-C is noticed at
//! most one poll interval later.

use std::thread;
use std::time::{Duration, Instant};

use hidbat_transport::{HidReportSource, ReportSource};
use tracing::{debug, info, warn};

use crate::battery_log::BatteryLog;
use crate::config::MonitorConfig;
use crate::error::MonitorError;
use crate::report::{BatteryReading, ReportLayout};
use crate::shutdown::ShutdownFlag;
use crate::sink::StatusSink;
use crate::tracker::{Emission, StatusTracker};

/// Open the configured device, by hidraw path or by VID/PID
pub fn open_device(config: &MonitorConfig) -> Result<HidReportSource, MonitorError> {
    if config.open_by_id {
        HidReportSource::open_ids(config.vendor_id, config.product_id).map_err(|source| {
            MonitorError::Open {
                path: format!("{:04x}:{:04x}", config.vendor_id, config.product_id).into(),
                source,
            }
        })
    } else {
        HidReportSource::open_path(&config.device_path).map_err(|source| MonitorError::Open {
            path: config.device_path.clone(),
            source,
        })
    }
}

/// Outcome of a single poll cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cycle {
    /// Valid battery reading decoded this cycle
    pub reading: Option<BatteryReading>,
    /// What the tracker emitted to the console sink
    pub emission: Option<Emission>,
    /// Whether the reading was appended to the history file
    pub logged: bool,
}

pub struct Monitor<S, K> {
    source: S,
    sink: K,
    layout: ReportLayout,
    tracker: StatusTracker,
    log: Option<BatteryLog>,
    read_size: usize,
    poll_interval: Duration,
}

impl<S: ReportSource, K: StatusSink> Monitor<S, K> {
    pub fn new(source: S, sink: K, config: &MonitorConfig, started_at: Instant) -> Self {
        let log = config
            .logging
            .enabled
            .then(|| BatteryLog::new(&config.logging.path));

        Self {
            source,
            sink,
            layout: config.report,
            tracker: StatusTracker::new(config.update_interval(), started_at),
            log,
            read_size: config.read_size,
            poll_interval: config.poll_interval(),
        }
    }

    pub fn tracker(&self) -> &StatusTracker {
        &self.tracker
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Give back the device and the sink; dropping the source closes the device
    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }

    /// Run one fetch-decode-observe cycle at time `now`
    pub fn poll_once(&mut self, now: Instant) -> Result<Cycle, MonitorError> {
        let raw = self
            .source
            .read_report(self.read_size)
            .map_err(MonitorError::Read)?;

        let reading = match raw.as_deref() {
            Some(bytes) => {
                debug!("report {:02x?}", bytes);
                self.layout.decode(bytes)
            }
            None => None,
        };

        // Every valid reading goes to the history, deduplicated or not
        let mut logged = false;
        if let (Some(reading), Some(log)) = (reading, &self.log) {
            match log.append_now(reading.level) {
                Ok(()) => logged = true,
                Err(e) => {
                    warn!("{}", e);
                    eprintln!("\n{e}");
                }
            }
        }

        let emission = self.tracker.observe(reading, now);
        if let Some(emission) = &emission {
            match emission {
                Emission::Status {
                    reading,
                    changed: true,
                } => debug!("status changed: {}", reading),
                Emission::Status { changed: false, .. } => debug!("periodic status refresh"),
                Emission::Waiting => debug!("still waiting for a battery report"),
            }
            if let Err(e) = self.sink.emit(emission) {
                warn!("Console write failed: {}", e);
            }
        }

        Ok(Cycle {
            reading,
            emission,
            logged,
        })
    }

    /// Poll until `shutdown` is requested; returns the number of cycles run
    pub fn run(&mut self, shutdown: &ShutdownFlag) -> Result<u64, MonitorError> {
        info!(
            "Polling every {:?}, status refresh every {:?}",
            self.poll_interval,
            self.tracker.interval()
        );

        let mut cycles = 0u64;
        while shutdown.is_running() {
            self.poll_once(Instant::now())?;
            cycles += 1;
            thread::sleep(self.poll_interval);
        }

        info!("Poll loop stopped after {} cycles", cycles);
        Ok(cycles)
    }
}
