//! Small normalization helpers shared by the loaders.

/// Trim and upper-case an identifier or code column.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Parse a decimal-degree coordinate. Blank, unparseable and non-finite
/// values are treated as missing.
pub fn parse_coordinate(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Substitute `{cycle}` in a URL template.
pub fn with_cycle(template: &str, cycle: &str) -> String {
    template.replace("{cycle}", cycle)
}

pub fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
