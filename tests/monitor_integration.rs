//! Poll loop tests against a scripted report source.
//!
//! No hardware needed: reports are replayed from a queue and emissions are
//! captured with `RecordingSink`.

use std::collections::VecDeque;
use std::path::Path;
use std::time::{Duration, Instant};

use hidbat::monitor::open_device;
use hidbat::{
    BatteryReading, ChargingState, Emission, Monitor, MonitorConfig, MonitorError,
    RecordingSink, ReportSource, ShutdownFlag, TransportError,
};

/// One scripted read result
enum Step {
    Report(Vec<u8>),
    Empty,
    Fail,
}

struct ScriptedSource {
    steps: VecDeque<Step>,
    /// Cleared once the script runs out, to end `Monitor::run`
    shutdown: Option<ShutdownFlag>,
    reads: usize,
}

impl ScriptedSource {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: steps.into(),
            shutdown: None,
            reads: 0,
        }
    }

    fn stopping(steps: Vec<Step>, shutdown: ShutdownFlag) -> Self {
        Self {
            shutdown: Some(shutdown),
            ..Self::new(steps)
        }
    }
}

impl ReportSource for ScriptedSource {
    fn read_report(&mut self, max_len: usize) -> Result<Option<Vec<u8>>, TransportError> {
        assert_eq!(max_len, 64);
        self.reads += 1;
        let step = self.steps.pop_front();
        if self.steps.is_empty() {
            if let Some(flag) = &self.shutdown {
                flag.request_shutdown();
            }
        }
        match step {
            Some(Step::Report(bytes)) => Ok(Some(bytes)),
            Some(Step::Empty) | None => Ok(None),
            Some(Step::Fail) => Err(TransportError::Disconnected),
        }
    }
}

const DISCHARGING_87: [u8; 5] = [0x03, 0x00, 0x00, 0x01, 0x57];
const CHARGING_87: [u8; 5] = [0x03, 0x00, 0x00, 0x03, 0x57];

fn config_with_log(path: Option<&Path>) -> MonitorConfig {
    let mut config = MonitorConfig::default();
    config.poll_interval_ms = 1;
    if let Some(path) = path {
        config.logging.enabled = true;
        config.logging.path = path.to_path_buf();
    }
    config
}

fn log_levels(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_default()
        .lines()
        .map(|line| {
            let fields: Vec<&str> = line.split('|').collect();
            assert_eq!(fields.len(), 3, "bad log line {line:?}");
            assert!(fields[0].parse::<i64>().is_ok());
            // DD/MM/YYYY HH:MM:SS
            assert_eq!(fields[2].len(), 19);
            fields[1].to_string()
        })
        .collect()
}

#[test]
fn first_reading_emits_and_logs() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("bats.txt");
    let t0 = Instant::now();
    let source = ScriptedSource::new(vec![Step::Report(DISCHARGING_87.to_vec())]);
    let mut monitor = Monitor::new(
        source,
        RecordingSink::default(),
        &config_with_log(Some(&log_path)),
        t0,
    );

    let cycle = monitor.poll_once(t0 + Duration::from_millis(100)).unwrap();
    let expected = BatteryReading::new(87, ChargingState::Discharging);
    assert_eq!(cycle.reading, Some(expected));
    assert_eq!(
        cycle.emission,
        Some(Emission::Status {
            reading: expected,
            changed: true
        })
    );
    assert!(cycle.logged);
    assert_eq!(log_levels(&log_path), vec!["87"]);
}

#[test]
fn charging_change_reemits_immediately() {
    let t0 = Instant::now();
    let source = ScriptedSource::new(vec![
        Step::Report(DISCHARGING_87.to_vec()),
        Step::Report(CHARGING_87.to_vec()),
    ]);
    let mut monitor = Monitor::new(source, RecordingSink::default(), &config_with_log(None), t0);

    monitor.poll_once(t0 + Duration::from_millis(100)).unwrap();
    let cycle = monitor.poll_once(t0 + Duration::from_millis(200)).unwrap();

    let reading = cycle.emission.and_then(|e| e.reading()).unwrap();
    assert_eq!(reading.charging, ChargingState::Charging);
    assert_eq!(reading.to_string(), "Status: Charging | Battery: 87%");
    assert_eq!(monitor.sink().emissions.len(), 2);
    assert!(!cycle.logged);
}

#[test]
fn wrong_report_id_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("bats.txt");
    let t0 = Instant::now();
    let source = ScriptedSource::new(vec![
        Step::Report(DISCHARGING_87.to_vec()),
        Step::Report(vec![0x02, 0x00, 0x00, 0x03, 0x10]),
    ]);
    let mut monitor = Monitor::new(
        source,
        RecordingSink::default(),
        &config_with_log(Some(&log_path)),
        t0,
    );

    monitor.poll_once(t0 + Duration::from_millis(100)).unwrap();
    let emission_time = monitor.tracker().last_emission();

    let cycle = monitor.poll_once(t0 + Duration::from_millis(200)).unwrap();
    assert_eq!(cycle.reading, None);
    assert_eq!(cycle.emission, None);
    assert!(!cycle.logged);
    assert_eq!(
        monitor.tracker().last_reading(),
        Some(BatteryReading::new(87, ChargingState::Discharging))
    );
    assert_eq!(monitor.tracker().last_emission(), emission_time);
    assert_eq!(log_levels(&log_path), vec!["87"]);
}

#[test]
fn no_data_for_twelve_seconds_waits_twice() {
    let t0 = Instant::now();
    let source = ScriptedSource::new((0..120).map(|_| Step::Empty).collect());
    let mut monitor = Monitor::new(source, RecordingSink::default(), &config_with_log(None), t0);

    for tick in 1..=120u64 {
        monitor.poll_once(t0 + Duration::from_millis(tick * 100)).unwrap();
    }
    assert_eq!(
        monitor.sink().emissions,
        vec![Emission::Waiting, Emission::Waiting]
    );
}

#[test]
fn every_valid_reading_is_logged_even_when_not_displayed() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("bats.txt");
    let t0 = Instant::now();
    let source = ScriptedSource::new(vec![
        Step::Report(DISCHARGING_87.to_vec()),
        Step::Report(DISCHARGING_87.to_vec()),
        Step::Empty,
        Step::Report(DISCHARGING_87.to_vec()),
    ]);
    let mut monitor = Monitor::new(
        source,
        RecordingSink::default(),
        &config_with_log(Some(&log_path)),
        t0,
    );

    for tick in 1..=4u64 {
        monitor.poll_once(t0 + Duration::from_millis(tick * 100)).unwrap();
    }
    assert_eq!(monitor.sink().emissions.len(), 1);
    assert_eq!(log_levels(&log_path), vec!["87", "87", "87"]);
}

#[test]
fn log_failure_does_not_stop_polling() {
    let dir = tempfile::tempdir().unwrap();
    let t0 = Instant::now();
    let source = ScriptedSource::new(vec![
        Step::Report(DISCHARGING_87.to_vec()),
        Step::Report(CHARGING_87.to_vec()),
    ]);
    // A directory as log target makes every append fail
    let mut monitor = Monitor::new(
        source,
        RecordingSink::default(),
        &config_with_log(Some(dir.path())),
        t0,
    );

    let first = monitor.poll_once(t0 + Duration::from_millis(100)).unwrap();
    let second = monitor.poll_once(t0 + Duration::from_millis(200)).unwrap();
    assert!(!first.logged && !second.logged);
    assert_eq!(monitor.sink().emissions.len(), 2);
}

#[test]
fn read_error_is_fatal() {
    let t0 = Instant::now();
    let source = ScriptedSource::new(vec![Step::Empty, Step::Fail]);
    let mut monitor = Monitor::new(source, RecordingSink::default(), &config_with_log(None), t0);

    monitor.poll_once(t0).unwrap();
    let err = monitor.poll_once(t0).unwrap_err();
    assert!(matches!(err, MonitorError::Read(TransportError::Disconnected)));
}

#[test]
fn run_stops_when_shutdown_requested() {
    let shutdown = ShutdownFlag::new();
    let source = ScriptedSource::stopping(
        vec![
            Step::Empty,
            Step::Report(DISCHARGING_87.to_vec()),
            Step::Empty,
        ],
        shutdown.clone(),
    );
    let mut monitor = Monitor::new(
        source,
        RecordingSink::default(),
        &config_with_log(None),
        Instant::now(),
    );

    let cycles = monitor.run(&shutdown).unwrap();
    assert_eq!(cycles, 3);

    let (source, sink) = monitor.into_parts();
    assert_eq!(source.reads, 3);
    assert_eq!(
        sink.emissions,
        vec![Emission::Status {
            reading: BatteryReading::new(87, ChargingState::Discharging),
            changed: true
        }]
    );
}

#[test]
fn run_skips_polling_after_early_shutdown() {
    let shutdown = ShutdownFlag::new();
    shutdown.request_shutdown();
    let source = ScriptedSource::new(vec![Step::Report(DISCHARGING_87.to_vec())]);
    let mut monitor = Monitor::new(
        source,
        RecordingSink::default(),
        &config_with_log(None),
        Instant::now(),
    );

    assert_eq!(monitor.run(&shutdown).unwrap(), 0);
    assert_eq!(monitor.into_parts().0.reads, 0);
}

#[test]
fn run_propagates_read_error() {
    let shutdown = ShutdownFlag::new();
    let source = ScriptedSource::new(vec![Step::Empty, Step::Fail, Step::Empty]);
    let mut monitor = Monitor::new(
        source,
        RecordingSink::default(),
        &config_with_log(None),
        Instant::now(),
    );

    assert!(matches!(monitor.run(&shutdown), Err(MonitorError::Read(_))));
    assert!(shutdown.is_running());
}

#[test]
fn open_missing_device_path_reports_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = MonitorConfig::default();
    config.device_path = dir.path().join("hidraw-missing");

    let err = open_device(&config).err().expect("open should fail");
    match &err {
        MonitorError::Open {
            path,
            source: TransportError::DeviceNotFound(_),
        } => assert_eq!(path, &config.device_path),
        other => panic!("expected DeviceNotFound, got {other:?}"),
    }
    assert!(err.is_not_found());
    assert!(err
        .to_string()
        .contains(&config.device_path.display().to_string()));
}
