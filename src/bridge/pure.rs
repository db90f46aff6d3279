// Pure parsing functions for bridge output (no I/O)

use std::sync::LazyLock;

use chrono::{NaiveDateTime, Timelike};
use regex::Regex;

use super::types::AttachedDevice;

/// `stat -c %y` prints "2024-01-02 10:11:12.123456789 +0100"; toybox may
/// shorten the fraction or drop the zone.
static STAT_TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2})(?:\.(\d{1,9}))?")
        .expect("timestamp pattern is valid")
});

/// Parse `adb devices` output into attached endpoints.
///
/// The header line and daemon start-up chatter ("* daemon started ...") are skipped.
pub fn parse_attached_devices(output: &str) -> Vec<AttachedDevice> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !line.starts_with("List of devices") && !line.starts_with('*'))
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let serial = fields.next()?;
            let state = fields.next()?;
            Some(AttachedDevice {
                serial: serial.to_string(),
                state: state.to_string(),
            })
        })
        .collect()
}

/// Parse `ls -1 -p` output, keeping only directories (suffixed with '/')
pub fn parse_directory_listing(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_suffix('/'))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse the first line of `stat -c %y` output
pub fn parse_stat_timestamp(output: &str) -> Option<NaiveDateTime> {
    let line = output.lines().next()?;
    let caps = STAT_TIMESTAMP.captures(line)?;
    let base = NaiveDateTime::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d %H:%M:%S").ok()?;

    match caps.get(2) {
        Some(frac) => {
            let digits = frac.as_str();
            let nanos: u32 = format!("{:0<9}", digits).parse().ok()?;
            base.with_nanosecond(nanos)
        }
        None => Some(base),
    }
}

/// Quote a path for `adb shell`, which hands its arguments to the device's sh
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Join a device path and an entry name with exactly one '/'
pub fn remote_join(root: &str, entry: &str) -> String {
    format!("{}/{}", root.trim_end_matches('/'), entry)
}
