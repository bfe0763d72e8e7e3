// io_status.rs - per-phase time, memory and I/O measurement
use std::fmt;
use std::time::{Duration, Instant};

use log::info;

/// Process-level I/O counters as reported by the operating system.
///
/// # Fields
/// * `read_bytes` - Bytes fetched from the storage layer.
/// * `write_bytes` - Bytes sent to the storage layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoCounters {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

impl IoCounters {
    /// Counter growth since `earlier`, saturating at zero.
    pub fn diff(&self, earlier: &IoCounters) -> IoCounters {
        IoCounters {
            read_bytes: self.read_bytes.saturating_sub(earlier.read_bytes),
            write_bytes: self.write_bytes.saturating_sub(earlier.write_bytes),
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.read_bytes + self.write_bytes
    }

    /// Reads the counters of the current process from `/proc/self/io`.
    #[cfg(target_os = "linux")]
    pub fn current() -> std::io::Result<IoCounters> {
        let content = std::fs::read_to_string("/proc/self/io")?;
        let mut counters = IoCounters::default();
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(key), Some(value)) = (parts.next(), parts.next()) {
                if let Ok(value) = value.parse::<u64>() {
                    match key {
                        "read_bytes:" => counters.read_bytes = value,
                        "write_bytes:" => counters.write_bytes = value,
                        _ => {}
                    }
                }
            }
        }
        Ok(counters)
    }

    /// No per-process I/O accounting off Linux.
    #[cfg(not(target_os = "linux"))]
    pub fn current() -> std::io::Result<IoCounters> {
        Ok(IoCounters::default())
    }
}

/// Resident set size of the current process in KiB, from `VmRSS` in `/proc/self/status`.
#[cfg(target_os = "linux")]
pub fn resident_kib() -> u64 {
    std::fs::read_to_string("/proc/self/status")
        .ok()
        .and_then(|status| {
            status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kib| kib.parse().ok())
        })
        .unwrap_or(0)
}

#[cfg(not(target_os = "linux"))]
pub fn resident_kib() -> u64 {
    0
}

/// Groups the digits of `value` by thousands: `1234567` becomes `"1,234,567"`.
pub fn format_with_commas(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Measurement of one pipeline phase.
///
/// # Fields
/// * `name` - Phase label used in log lines.
/// * `duration` - Wall time.
/// * `io` - Process I/O performed during the phase.
/// * `rss_kib` - Resident set size when the phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseStats {
    pub name: String,
    pub duration: Duration,
    pub io: IoCounters,
    pub rss_kib: u64,
}

impl fmt::Display for PhaseStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:.3} ms, rss {} KiB, io read {} B write {} B",
            self.name,
            self.duration.as_secs_f64() * 1000.0,
            format_with_commas(self.rss_kib),
            format_with_commas(self.io.read_bytes),
            format_with_commas(self.io.write_bytes)
        )
    }
}

/// Collects [`PhaseStats`] for consecutive phases of one run.
#[derive(Debug, Default)]
pub struct PhaseCollector {
    phases: Vec<PhaseStats>,
}

impl PhaseCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f`, records its wall time, I/O and resident memory under `name`, and logs the
    /// measurement at info level.
    ///
    /// # Returns
    /// The return value of `f`.
    pub fn measure<F, R>(&mut self, name: &str, f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let start_io = IoCounters::current().unwrap_or_default();
        let start_time = Instant::now();

        let result = f();

        let duration = start_time.elapsed();
        let io = IoCounters::current().unwrap_or_default().diff(&start_io);
        let stats = PhaseStats {
            name: name.to_owned(),
            duration,
            io,
            rss_kib: resident_kib(),
        };
        info!("{}", stats);
        self.phases.push(stats);
        result
    }

    pub fn phases(&self) -> &[PhaseStats] {
        &self.phases
    }

    pub fn into_phases(self) -> Vec<PhaseStats> {
        self.phases
    }

    /// Sum of the wall times of all recorded phases.
    pub fn total_duration(&self) -> Duration {
        self.phases.iter().map(|p| p.duration).sum()
    }
}

/// Measures a code block as one named phase of a [`PhaseCollector`].
///
/// # Arguments
/// - `$collector`: A `PhaseCollector` the measurement is appended to.
/// - `$name`: An expression that evaluates to a string slice for the phase name.
/// - `$code`: A code block to be measured and executed.
///
/// # Returns
/// The return value of the executed code block.
#[macro_export]
macro_rules! measure_phase {
    ($collector:expr, $name:expr, $code:block) => {{
        $collector.measure($name, || $code)
    }};
}

#[cfg(test)]
mod test_io_status {
    use super::*;

    #[test]
    fn test_io_counters_diff_saturates() {
        let earlier = IoCounters { read_bytes: 100, write_bytes: 50 };
        let later = IoCounters { read_bytes: 150, write_bytes: 20 };
        let diff = later.diff(&earlier);
        assert_eq!(diff.read_bytes, 50);
        assert_eq!(diff.write_bytes, 0);
        assert_eq!(diff.total_bytes(), 50);
    }

    #[test]
    fn test_format_with_commas() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(999), "999");
        assert_eq!(format_with_commas(1000), "1,000");
        assert_eq!(format_with_commas(1234567), "1,234,567");
    }

    #[test]
    fn test_collector_records_phases() {
        let mut collector = PhaseCollector::new();
        let value = measure_phase!(collector, "sum", { (1..=10u64).sum::<u64>() });
        let other = collector.measure("noop", || 7);
        assert_eq!(value, 55);
        assert_eq!(other, 7);
        let names: Vec<&str> = collector.phases().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["sum", "noop"]);
        assert!(collector.total_duration() >= collector.phases()[0].duration);
    }
}
