use std::fs::{self, OpenOptions};

use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};

use crate::config::Config;
use crate::error::TriggerError;
use crate::schema::Event;

const LOG_FILE: &str = "agentic-ops.log";

/// Route `log` output to `<log_dir>/agentic-ops.log`.
/// Best-effort: failures are silently ignored (logging must never block the hook).
pub fn init(config: &Config) {
    let Some(dir) = config.log_dir() else {
        return;
    };
    let _ = fs::create_dir_all(&dir);
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
    else {
        return;
    };
    let level = config
        .settings
        .log_level
        .parse()
        .unwrap_or(LevelFilter::Info);
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Off)
        .build();
    let _ = WriteLogger::init(level, log_config, file);
}

/// Record one workflow's match outcome as a tab-separated line.
pub fn log_match(workflow: &str, event: &Event, outcome: &Result<bool, TriggerError>) {
    let (label, detail) = match outcome {
        Ok(true) => ("MATCH", String::new()),
        Ok(false) => ("NO_MATCH", String::new()),
        // Compact single-line reason for the log
        Err(e) => ("ERROR", e.to_string().replace('\n', "; ")),
    };
    log::info!(
        "{workflow}\t{label}\t{summary}\t{detail}",
        summary = summarize(event)
    );
}

/// Short description of an event: tool name plus command or path.
fn summarize(event: &Event) -> String {
    let Some(tool) = &event.tool else {
        return "-".into();
    };
    let subject = tool
        .str_arg("command")
        .or_else(|| tool.str_arg("file_path"))
        .or_else(|| tool.str_arg("path"))
        .unwrap_or_default();
    let truncated: String = subject.chars().take(200).collect();
    format!("{} {}", tool.name, truncated.replace('\n', " "))
}

/// UTC timestamp in RFC 3339 form, second precision.
pub fn timestamp_now() -> String {
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    format_timestamp(dur.as_secs())
}

fn format_timestamp(secs: u64) -> String {
    let days = secs / 86400;
    let rem = secs % 86400;
    let h = rem / 3600;
    let m = (rem % 3600) / 60;
    let s = rem % 60;
    let (year, month, day) = epoch_days_to_date(days);
    format!("{year:04}-{month:02}-{day:02}T{h:02}:{m:02}:{s:02}Z")
}

/// Convert days since Unix epoch to (year, month, day).
fn epoch_days_to_date(days: u64) -> (u64, u64, u64) {
    // Civil calendar from days algorithm (Howard Hinnant)
    let z = days + 719468;
    let era = z / 146097;
    let doe = z - era * 146097;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y, m, d)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ToolEvent;

    #[test]
    fn epoch_start() {
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn leap_day() {
        // 2024-02-29T12:34:56Z
        assert_eq!(format_timestamp(1_709_210_096), "2024-02-29T12:34:56Z");
    }

    #[test]
    fn year_boundary() {
        assert_eq!(epoch_days_to_date(10_957), (2000, 1, 1));
        assert_eq!(epoch_days_to_date(10_956), (1999, 12, 31));
    }

    #[test]
    fn summary_prefers_command() {
        let mut args = serde_json::Map::new();
        args.insert("command".into(), "git push\norigin".into());
        let event = Event {
            tool: Some(ToolEvent {
                name: "bash".into(),
                args,
                hook_type: None,
            }),
            ..Default::default()
        };
        assert_eq!(summarize(&event), "bash git push origin");
        assert_eq!(summarize(&Event::default()), "-");
    }
}
