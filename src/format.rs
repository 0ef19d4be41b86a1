//! Text rendering helpers shared by [`Value`](crate::Value) and the CLI.

/// True if every byte is printable ASCII or ASCII whitespace.
///
/// The empty slice counts as printable.
pub fn is_printable(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|b| b.is_ascii_graphic() || b.is_ascii_whitespace())
}

/// Format bytes as space-separated uppercase hex (`00 25 89`).
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse the output of [`hex_dump`] back into bytes.
///
/// Accepts any whitespace between octets; returns `None` on a bad octet.
pub fn parse_hex_dump(s: &str) -> Option<Vec<u8>> {
    s.split_ascii_whitespace()
        .map(|octet| {
            if octet.len() == 2 {
                u8::from_str_radix(octet, 16).ok()
            } else {
                None
            }
        })
        .collect()
}

const TICKS_PER_SECOND: u32 = 100;
const TICKS_PER_MINUTE: u32 = 60 * TICKS_PER_SECOND;
const TICKS_PER_HOUR: u32 = 60 * TICKS_PER_MINUTE;
const TICKS_PER_DAY: u32 = 24 * TICKS_PER_HOUR;

/// Format TimeTicks as `<d> days, <h>:<mm>:<ss>.<cc>`.
///
/// Zero is rendered as `0:0:00:00.00`, the form older tooling emits.
pub fn timeticks(ticks: u32) -> String {
    if ticks == 0 {
        return "0:0:00:00.00".to_string();
    }

    let days = ticks / TICKS_PER_DAY;
    let rest = ticks % TICKS_PER_DAY;
    let hours = rest / TICKS_PER_HOUR;
    let rest = rest % TICKS_PER_HOUR;
    let minutes = rest / TICKS_PER_MINUTE;
    let rest = rest % TICKS_PER_MINUTE;
    let seconds = rest / TICKS_PER_SECOND;
    let hundredths = rest % TICKS_PER_SECOND;

    format!(
        "{} days, {}:{:02}:{:02}.{:02}",
        days, hours, minutes, seconds, hundredths
    )
}
