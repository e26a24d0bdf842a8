//! Human-readable size and size-reduction formatting.

const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

/// Format a byte count using the largest unit that keeps the value under
/// 1024 (capped at GB).
///
/// Bytes are printed as an integer; every larger unit gets two decimals.
///
/// ```
/// use vs_core::human_readable_size;
///
/// assert_eq!(human_readable_size(512), "512 B");
/// assert_eq!(human_readable_size(1536), "1.50 KB");
/// ```
pub fn human_readable_size(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} {}", UNITS[0])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

/// Percentage by which `compressed` is smaller than `original`.
///
/// Returns `None` when the ratio is not finite (an empty original). A
/// compressed file larger than the original yields a negative percentage.
pub fn reduction_percent(original: u64, compressed: u64) -> Option<f64> {
    let pct = (1.0 - compressed as f64 / original as f64) * 100.0;
    pct.is_finite().then_some(pct)
}

/// Render a reduction percentage with one decimal, or `?` if unknown.
pub fn format_reduction(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.1}"),
        None => "?".to_string(),
    }
}
