/// Normalize a published duration string into whole seconds.
///
/// Accepts `SS`, `MM:SS` and `H:MM:SS`. Anything else (empty input, more than
/// three segments, non-numeric segments) yields `0`. Fractional seconds are
/// rounded to the nearest whole second.
pub fn normalize_duration(raw: &str) -> u64 {
    let segments: Vec<&str> = raw.trim().split(':').map(str::trim).collect();

    let mut values = Vec::with_capacity(segments.len());
    for segment in &segments {
        match segment.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => values.push(value),
            _ => return 0,
        }
    }

    let total = match values.as_slice() {
        [seconds] => *seconds,
        [minutes, seconds] => minutes * 60.0 + seconds,
        [hours, minutes, seconds] => hours * 3600.0 + minutes * 60.0 + seconds,
        _ => return 0,
    };

    total.round() as u64
}

/// Format seconds as `H:MM:SS` or `MM:SS` for log output
pub fn format_seconds(total: u64) -> String {
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
