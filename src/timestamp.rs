use serde::Serialize;

const SECONDS_PER_HOUR: u32 = 3600;

/// Display regime for anchor timestamps, chosen by the lecture's duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeFormat {
    /// `mm:ss`, for videos shorter than an hour.
    Short,
    /// `hh:mm:ss`
    Long,
}

impl TimeFormat {
    /// An unknown duration falls back to the long form.
    pub fn for_duration(duration_seconds: Option<u32>) -> Self {
        match duration_seconds {
            Some(d) if d < SECONDS_PER_HOUR => TimeFormat::Short,
            _ => TimeFormat::Long,
        }
    }
}

pub fn to_seconds(hours: u32, minutes: u32, seconds: u32) -> u32 {
    hours
        .saturating_mul(SECONDS_PER_HOUR)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds)
}

pub fn format_timestamp(total_seconds: u32, format: TimeFormat) -> String {
    let hours = total_seconds / SECONDS_PER_HOUR;
    let minutes = (total_seconds % SECONDS_PER_HOUR) / 60;
    let seconds = total_seconds % 60;

    match format {
        TimeFormat::Long => format!("{:02}:{:02}:{:02}", hours, minutes, seconds),
        // minutes absorb any hours in case an anchor sits past the reported duration
        TimeFormat::Short => format!("{:02}:{:02}", hours * 60 + minutes, seconds),
    }
}

/// Parses `hh:mm:ss` or `mm:ss` back into seconds.
pub fn parse_timestamp(display: &str) -> Option<u32> {
    let parts = display
        .trim()
        .split(':')
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    match parts.as_slice() {
        [h, m, s] if *m < 60 && *s < 60 => Some(to_seconds(*h, *m, *s)),
        [m, s] if *s < 60 => Some(to_seconds(0, *m, *s)),
        _ => None,
    }
}
