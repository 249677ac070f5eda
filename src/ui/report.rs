//! Build summary
//!
//! Printed once after a run, Maven style: status banner, elapsed time and the
//! wall-clock time the build finished.

use crate::ui::Logger;
use chrono::{DateTime, Local};
use std::time::{Duration, Instant};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    Success,
    /// Completed under `--force` with at least one failed task
    SuccessWithErrors,
    Failed,
}

impl BuildStatus {
    pub fn new(aborted: bool, has_failures: bool) -> Self {
        match (aborted, has_failures) {
            (true, _) => BuildStatus::Failed,
            (false, true) => BuildStatus::SuccessWithErrors,
            (false, false) => BuildStatus::Success,
        }
    }

    pub fn banner(&self) -> &'static str {
        match self {
            BuildStatus::Success => "BUILD SUCCESS",
            BuildStatus::SuccessWithErrors => "BUILD SUCCESS (WITH ERRORS)",
            BuildStatus::Failed => "BUILD FAILED",
        }
    }
}

/// Measures a run and prints its summary
#[derive(Debug)]
pub struct BuildReport {
    started: Instant,
}

impl BuildReport {
    pub fn start() -> Self {
        BuildReport {
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn lines(&self, status: BuildStatus, finished_at: DateTime<Local>) -> Vec<String> {
        vec![
            status.banner().to_string(),
            format!("Total time: {}", format_duration(self.elapsed())),
            format!(
                "Finished at: {}",
                finished_at.format("%a %b %d %H:%M:%S %Z %Y")
            ),
        ]
    }

    pub fn print(&self, logger: &Logger, status: BuildStatus) {
        let lines = self.lines(status, Local::now());
        logger.separator();
        for (i, line) in lines.iter().enumerate() {
            if i == 0 {
                logger.banner(line);
            } else {
                logger.writeln(line);
            }
        }
        logger.separator();
    }
}

/// `1.234s` under a minute, `2m 03s` above
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}.{:03}s", secs, duration.subsec_millis())
    } else {
        format!("{}m {:02}s", secs / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_status() {
        assert_eq!(BuildStatus::new(false, false), BuildStatus::Success);
        assert_eq!(BuildStatus::new(false, true), BuildStatus::SuccessWithErrors);
        assert_eq!(BuildStatus::new(true, false), BuildStatus::Failed);
        assert_eq!(BuildStatus::new(true, true), BuildStatus::Failed);
        assert_eq!(
            BuildStatus::SuccessWithErrors.banner(),
            "BUILD SUCCESS (WITH ERRORS)"
        );
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(1234)), "1.234s");
        assert_eq!(format_duration(Duration::from_millis(5)), "0.005s");
        assert_eq!(format_duration(Duration::from_secs(123)), "2m 03s");
    }

    #[test]
    fn test_report_lines() {
        let report = BuildReport::start();
        let lines = report.lines(BuildStatus::Success, Local::now());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "BUILD SUCCESS");
        assert!(lines[1].starts_with("Total time: "));
        assert!(lines[2].starts_with("Finished at: "));
    }
}
