use chrono::{DateTime, Local, TimeDelta};
use std::time::Duration;

/// Formats an earnings figure with thousands separators and 2 decimal places.
///
/// `1234.5` becomes `"1,234.50"`, `-9876543.219` becomes `"-9,876,543.22"`.
pub fn format_earnings(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value.is_sign_negative() && fixed.chars().any(|c| c.is_ascii_digit() && c != '0');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

/// Returns the current local time formatted as YYYY-MM-DD HH:MM:SS.
pub fn now_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Wall-clock time `delay` from now, formatted as HH:MM:SS.
pub fn clock_after(delay: Duration) -> String {
    let at: DateTime<Local> = TimeDelta::from_std(delay)
        .ok()
        .and_then(|d| Local::now().checked_add_signed(d))
        .unwrap_or_else(Local::now);
    at.format("%H:%M:%S").to_string()
}
