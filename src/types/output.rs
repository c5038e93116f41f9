//! Output structures for terminal display

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Snapshot;

/// Presentational band derived from timelessness. Display only; the
/// kernel itself knows nothing about bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowBand {
    /// timelessness < 0.25, perceived time runs normally
    Baseline,
    /// 0.25 ≤ timelessness < 0.5
    Engaged,
    /// 0.5 ≤ timelessness < 0.75
    Absorbed,
    /// timelessness ≥ 0.75, maximal time distortion
    Timeless,
}

impl FlowBand {
    /// Band for a timelessness value (NaN falls into Baseline).
    pub fn from_timelessness(t: f64) -> Self {
        if t >= 0.75 {
            FlowBand::Timeless
        } else if t >= 0.5 {
            FlowBand::Absorbed
        } else if t >= 0.25 {
            FlowBand::Engaged
        } else {
            FlowBand::Baseline
        }
    }

    /// Get ANSI color code for terminal display
    pub fn color_code(&self) -> &'static str {
        match self {
            FlowBand::Baseline => "\x1b[90m", // Gray
            FlowBand::Engaged => "\x1b[33m",  // Yellow
            FlowBand::Absorbed => "\x1b[32m", // Green
            FlowBand::Timeless => "\x1b[35m", // Magenta
        }
    }

    /// Reset ANSI color
    pub fn color_reset() -> &'static str {
        "\x1b[0m"
    }

    /// Get emoji for band
    pub fn emoji(&self) -> &'static str {
        match self {
            FlowBand::Baseline => "⏱",
            FlowBand::Engaged => "🔆",
            FlowBand::Absorbed => "🌀",
            FlowBand::Timeless => "∞",
        }
    }
}

impl std::fmt::Display for FlowBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FlowBand::Baseline => "BASELINE",
            FlowBand::Engaged => "ENGAGED",
            FlowBand::Absorbed => "ABSORBED",
            FlowBand::Timeless => "TIMELESS",
        };
        write!(f, "{}", name)
    }
}

/// Per-update display record emitted by the CLI and the session API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Updates applied so far on this kernel
    pub step: u64,
    pub absorption: f64,
    pub timelessness: f64,
    pub subjective_dt_scale: f64,
    pub band: FlowBand,
}

impl TickReport {
    /// Build a report from an update's snapshot.
    pub fn new(step: u64, snapshot: &Snapshot) -> Self {
        Self {
            timestamp: Utc::now(),
            step,
            absorption: snapshot.absorption,
            timelessness: snapshot.timelessness,
            subjective_dt_scale: snapshot.subjective_dt_scale,
            band: FlowBand::from_timelessness(snapshot.timelessness),
        }
    }

    /// Format for terminal display (with colors)
    pub fn to_terminal_string(&self) -> String {
        let color = self.band.color_code();
        let reset = FlowBand::color_reset();
        let emoji = self.band.emoji();

        format!(
            "{}{} #{} abs={:.3} | tml={:.3} | dt×{:.3} | {}{}",
            color,
            emoji,
            self.step,
            self.absorption,
            self.timelessness,
            self.subjective_dt_scale,
            self.band,
            reset
        )
    }

    /// Format for parseable output (no colors)
    pub fn to_parseable_string(&self) -> String {
        format!(
            "step={} | absorption={:.3} | timelessness={:.3} | dtScale={:.3} | band={}",
            self.step, self.absorption, self.timelessness, self.subjective_dt_scale, self.band
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SignalFrame;

    fn snapshot(timelessness: f64) -> Snapshot {
        Snapshot {
            absorption: timelessness,
            timelessness,
            subjective_dt_scale: 1.0 - 0.8 * timelessness,
            last: SignalFrame::initial(),
        }
    }

    #[test]
    fn test_band_thresholds() {
        assert_eq!(FlowBand::from_timelessness(0.0), FlowBand::Baseline);
        assert_eq!(FlowBand::from_timelessness(0.24), FlowBand::Baseline);
        assert_eq!(FlowBand::from_timelessness(0.25), FlowBand::Engaged);
        assert_eq!(FlowBand::from_timelessness(0.5), FlowBand::Absorbed);
        assert_eq!(FlowBand::from_timelessness(0.75), FlowBand::Timeless);
        assert_eq!(FlowBand::from_timelessness(1.0), FlowBand::Timeless);
    }

    #[test]
    fn test_nan_lands_in_baseline() {
        assert_eq!(FlowBand::from_timelessness(f64::NAN), FlowBand::Baseline);
    }

    #[test]
    fn test_parseable_format_contains_fields() {
        let report = TickReport::new(3, &snapshot(0.6));
        let line = report.to_parseable_string();
        assert!(line.contains("step=3"));
        assert!(line.contains("absorption="));
        assert!(line.contains("timelessness="));
        assert!(line.contains("band=ABSORBED"));
    }

    #[test]
    fn test_report_serializes_with_band() {
        let report = TickReport::new(1, &snapshot(0.8));
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"band\":\"TIMELESS\""));
        assert!(json.contains("\"subjectiveDtScale\""));
    }
}
