//! ffmpeg progress parsing.
//!
//! ffmpeg run with `-progress pipe:2` interleaves `key=value` progress blocks
//! with its normal log on stderr. The input duration comes from the
//! `Duration: HH:MM:SS.ss` banner line; every `out_time_us` sample after it
//! yields a fraction of that duration.
//!
//! Fractions are reported raw. They can exceed 1.0 (audio tails, inaccurate
//! container durations) or go backwards; clamping is the caller's job.

/// Incremental parser fed one stderr line at a time.
#[derive(Debug, Default, Clone)]
pub struct ProgressParser {
    duration_us: Option<i64>,
}

impl ProgressParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input duration in microseconds, once the banner has been seen.
    pub fn duration_us(&self) -> Option<i64> {
        self.duration_us
    }

    /// Consume a line, returning a progress fraction if the line carried one.
    pub fn feed(&mut self, line: &str) -> Option<f64> {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("Duration:") {
            // Only the first input's duration matters.
            if self.duration_us.is_none() {
                self.duration_us = rest
                    .split(',')
                    .next()
                    .and_then(|t| parse_timestamp_us(t.trim()));
            }
            return None;
        }

        // ffmpeg's out_time_ms is also in microseconds.
        if let Some(val) = line
            .strip_prefix("out_time_us=")
            .or_else(|| line.strip_prefix("out_time_ms="))
        {
            let elapsed = val.trim().parse::<i64>().ok()?;
            let total = self.duration_us.filter(|d| *d > 0)?;
            return Some(elapsed as f64 / total as f64);
        }

        if line == "progress=end" {
            return Some(1.0);
        }

        None
    }
}

/// Parse `HH:MM:SS(.fraction)` into microseconds. `N/A` yields `None`.
fn parse_timestamp_us(s: &str) -> Option<i64> {
    let mut parts = s.split(':');
    let h: i64 = parts.next()?.parse().ok()?;
    let m: i64 = parts.next()?.parse().ok()?;
    let sec: f64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || !sec.is_finite() {
        return None;
    }
    Some((h * 3600 + m * 60) * 1_000_000 + (sec * 1_000_000.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BANNER: &str =
        "  Duration: 00:00:10.00, start: 0.000000, bitrate: 1205 kb/s";

    #[test]
    fn parses_timestamps() {
        assert_eq!(parse_timestamp_us("00:00:10.00"), Some(10_000_000));
        assert_eq!(parse_timestamp_us("01:02:03.50"), Some(3_723_500_000));
        assert_eq!(parse_timestamp_us("N/A"), None);
        assert_eq!(parse_timestamp_us("10.0"), None);
    }

    #[test]
    fn no_progress_before_duration() {
        let mut p = ProgressParser::new();
        assert_eq!(p.feed("out_time_us=5000000"), None);
    }

    #[test]
    fn fraction_of_duration() {
        let mut p = ProgressParser::new();
        assert_eq!(p.feed(BANNER), None);
        assert_eq!(p.duration_us(), Some(10_000_000));
        assert_eq!(p.feed("frame=120"), None);
        assert_eq!(p.feed("out_time_us=2500000"), Some(0.25));
        assert_eq!(p.feed("out_time_ms=5000000"), Some(0.5));
        assert_eq!(p.feed("progress=continue"), None);
        assert_eq!(p.feed("progress=end"), Some(1.0));
    }

    #[test]
    fn samples_are_not_clamped() {
        let mut p = ProgressParser::new();
        p.feed(BANNER);
        assert_eq!(p.feed("out_time_us=12000000"), Some(1.2));
        assert_eq!(p.feed("out_time_us=-100000"), Some(-0.01));
    }

    #[test]
    fn unknown_duration_yields_only_end() {
        let mut p = ProgressParser::new();
        p.feed("  Duration: N/A, bitrate: N/A");
        assert_eq!(p.duration_us(), None);
        assert_eq!(p.feed("out_time_us=100"), None);
        assert_eq!(p.feed("progress=end"), Some(1.0));
    }

    #[test]
    fn first_duration_wins() {
        let mut p = ProgressParser::new();
        p.feed(BANNER);
        p.feed("  Duration: 00:00:20.00, start: 0.000000, bitrate: 128 kb/s");
        assert_eq!(p.duration_us(), Some(10_000_000));
    }

    #[test]
    fn garbage_is_ignored() {
        let mut p = ProgressParser::new();
        p.feed(BANNER);
        assert_eq!(p.feed("out_time_us=N/A"), None);
        assert_eq!(p.feed("[libx264 @ 0x55] using cpu capabilities"), None);
    }
}
