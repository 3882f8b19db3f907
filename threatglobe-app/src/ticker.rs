//! Log-based threat ticker: the most recent visible events as one-line
//! summaries.

use threatglobe_core::types::ThreatEvent;

pub const DEFAULT_TICKER_LIMIT: usize = 12;

/// Formats the newest `limit` visible events, preserving their order.
pub fn ticker_lines(visible: &[ThreatEvent], limit: usize) -> Vec<String> {
    visible.iter().take(limit).map(format_line).collect()
}

fn format_line(event: &ThreatEvent) -> String {
    let time = chrono::DateTime::from_timestamp_millis(event.timestamp_ms)
        .map(|dt| dt.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| "--:--:--".to_string());
    match &event.location_name {
        Some(place) => format!(
            "[{}] {} {} · {} · {}",
            event.severity.label(),
            event.source.label(),
            event.ioc,
            place,
            time
        ),
        None => format!(
            "[{}] {} {} · {}",
            event.severity.label(),
            event.source.label(),
            event.ioc,
            time
        ),
    }
}
