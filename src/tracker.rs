//! De-duplicating, rate-limited view of the latest battery reading
//!
//! New data and printable data are different things: a changed reading is
//! emitted at once, an unchanged one (or the absence of any reading) only
//! once per update interval.

use std::time::{Duration, Instant};

use tracing::trace;

use crate::report::BatteryReading;

/// Default minimum time between repeated emissions of an unchanged status
pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(5);

/// What the tracker decided to show this cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    /// No valid battery report has been seen yet
    Waiting,
    /// Current status; `changed` is false for periodic re-emissions
    Status {
        reading: BatteryReading,
        changed: bool,
    },
}

impl Emission {
    pub fn reading(&self) -> Option<BatteryReading> {
        match self {
            Emission::Waiting => None,
            Emission::Status { reading, .. } => Some(*reading),
        }
    }
}

/// Last-known reading plus the time of the last emission
#[derive(Debug, Clone)]
pub struct StatusTracker {
    interval: Duration,
    last_reading: Option<BatteryReading>,
    /// Only moves when something is emitted, never on mere receipt of data
    last_emission: Instant,
}

impl StatusTracker {
    /// Start tracking at `started_at`; the first "waiting" emission is due one
    /// interval later
    pub fn new(interval: Duration, started_at: Instant) -> Self {
        Self {
            interval,
            last_reading: None,
            last_emission: started_at,
        }
    }

    /// Feed one poll cycle's outcome and decide whether to emit
    pub fn observe(&mut self, reading: Option<BatteryReading>, now: Instant) -> Option<Emission> {
        let due = now.saturating_duration_since(self.last_emission) >= self.interval;

        let emission = match (reading, self.last_reading) {
            (Some(new), last) if last != Some(new) => {
                self.last_reading = Some(new);
                Some(Emission::Status {
                    reading: new,
                    changed: true,
                })
            }
            (_, Some(last)) if due => Some(Emission::Status {
                reading: last,
                changed: false,
            }),
            (None, None) if due => Some(Emission::Waiting),
            _ => None,
        };

        if let Some(emission) = emission {
            trace!("emit {:?}", emission);
            self.last_emission = now;
        }
        emission
    }

    pub fn last_reading(&self) -> Option<BatteryReading> {
        self.last_reading
    }

    pub fn last_emission(&self) -> Instant {
        self.last_emission
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}
