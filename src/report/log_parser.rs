//! Read a run's parameters back out of its text log.
//!
//! The `Params:` line is authoritative. Logs without one fall back to the
//! last `boldigger3 identify` command line. When a log holds several runs the
//! latest one wins.

use regex::Regex;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runstamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<u32>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<u32>,
    /// Seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl RunParams {
    /// True when no classifier setting was recovered.
    pub fn is_empty(&self) -> bool {
        self.db.is_none()
            && self.mode.is_none()
            && self.thresholds.is_none()
            && self.chunk_size.is_none()
            && self.workers.is_none()
            && self.max_retries.is_none()
            && self.retry_interval.is_none()
    }
}

pub fn parse_run_log(text: &str) -> RunParams {
    let mut params = RunParams {
        runstamp: last_capture(text, r"Run:\s*(\d{8}_\d{6})"),
        version: last_capture(text, r"(?m)boldigger3 version:\s*(.+)$").map(|v| v.trim().to_string()),
        ..Default::default()
    };

    if let Some(line) = last_capture(text, r"(?m)^.*Params:\s*(.+)$") {
        apply_params_line(&mut params, &line);
    }

    if params.is_empty() {
        if let Some(command) = last_capture(text, r"(boldigger3\s+identify\b[^\n]*)") {
            apply_command_line(&mut params, &command);
        }
    }

    params
}

fn last_capture(text: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures_iter(text)
        .last()
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn first_capture(text: &str, pattern: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn number_list(text: &str, separator: &str) -> Option<Vec<u32>> {
    let Ok(re) = Regex::new(separator) else {
        return None;
    };
    let values: Vec<u32> = re
        .split(text.trim())
        .filter(|v| !v.is_empty())
        .filter_map(|v| v.parse().ok())
        .collect();
    (!values.is_empty()).then_some(values)
}

fn apply_params_line(params: &mut RunParams, line: &str) {
    let value = |key: &str| first_capture(line, &format!(r"\b{}=([^\s,]+)", key));

    params.thresholds = first_capture(line, r"THRESHOLDS=\[([^\]]+)\]")
        .and_then(|list| number_list(&list, r"\s*,\s*"));
    params.db = value("DB").and_then(|v| v.parse().ok());
    params.mode = value("MODE").and_then(|v| v.parse().ok());
    params.chunk_size = value("CHUNK_SIZE").and_then(|v| v.parse().ok());
    params.workers = value("WORKERS").and_then(|v| v.parse().ok());
    params.max_retries = value("MAX_RETRIES").and_then(|v| v.parse().ok());
    params.retry_interval = value("RETRY_INTERVAL").and_then(|v| v.trim_end_matches('s').parse().ok());
}

fn apply_command_line(params: &mut RunParams, command: &str) {
    params.db = first_capture(command, r"--db\s+(\d+)").and_then(|v| v.parse().ok());
    params.mode = first_capture(command, r"--mode\s+(\d+)").and_then(|v| v.parse().ok());
    params.thresholds =
        first_capture(command, r"--thresholds\s+([0-9\s]+)").and_then(|list| number_list(&list, r"\s+"));
    params.workers = first_capture(command, r"--workers\s+(\d+)").and_then(|v| v.parse().ok());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_params_line_is_parsed() {
        let log = "\
[2025-01-01 10:00:00] Run: 20250101_100000
[2025-01-01 10:00:00] Params: DB=1 MODE=3 THRESHOLDS=[97,95,90,85] CHUNK_SIZE=1000 WORKERS=5 MAX_RETRIES=3 RETRY_INTERVAL=60s
[2025-01-01 10:00:01] boldigger3 version: 2.1.3
[2025-01-01 10:00:02] Chunk 001: attempt 1/4
";
        let params = parse_run_log(log);
        assert_eq!(
            params,
            RunParams {
                runstamp: Some("20250101_100000".to_string()),
                db: Some(1),
                mode: Some(3),
                thresholds: Some(vec![97, 95, 90, 85]),
                chunk_size: Some(1000),
                workers: Some(5),
                max_retries: Some(3),
                retry_interval: Some(60),
                version: Some("2.1.3".to_string()),
            }
        );
    }

    #[test]
    fn test_latest_run_wins() {
        let log = "\
Run: 20250101_100000
Params: DB=1 MODE=3 THRESHOLDS=[97,95,90,85] CHUNK_SIZE=1000 WORKERS=5 MAX_RETRIES=3 RETRY_INTERVAL=60s
Run: 20250102_090000
Params: DB=2 MODE=1 THRESHOLDS=[99, 97] CHUNK_SIZE=250 WORKERS=2 MAX_RETRIES=0 RETRY_INTERVAL=5s
";
        let params = parse_run_log(log);
        assert_eq!(params.runstamp.as_deref(), Some("20250102_090000"));
        assert_eq!(params.db, Some(2));
        assert_eq!(params.thresholds, Some(vec![99, 97]));
        assert_eq!(params.chunk_size, Some(250));
        assert_eq!(params.retry_interval, Some(5));
    }

    #[test]
    fn test_command_line_fallback() {
        let log = "Command: boldigger3 identify <chunk> --db 4 --mode 2 --thresholds 98 96 --workers 3\n";
        let params = parse_run_log(log);
        assert_eq!(params.db, Some(4));
        assert_eq!(params.mode, Some(2));
        assert_eq!(params.thresholds, Some(vec![98, 96]));
        assert_eq!(params.workers, Some(3));
        assert_eq!(params.chunk_size, None);
    }

    #[test]
    fn test_unrelated_text_yields_nothing() {
        let params = parse_run_log("nothing to see here\n");
        assert!(params.is_empty());
        assert!(params.version.is_none());
    }
}
