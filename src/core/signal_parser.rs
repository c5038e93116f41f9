//! Signal-line parser: turns interactive `key=value` lines into inputs
//!
//! Grammar: whitespace-separated `key=value` pairs, keys case-insensitive
//! with short aliases, values plain floats. Unknown keys and malformed
//! values are collected, never fatal: the kernel contract has no errors
//! and the parser keeps that promise.

use lazy_static::lazy_static;
use regex::Regex;

use crate::types::SignalInput;

lazy_static! {
    // =========================================================================
    // key=value pair, e.g. "gain=0.9" or "predictionError = .1"
    // =========================================================================
    static ref RE_PAIR: Regex = Regex::new(
        r"(?i)\b([a-z_]+)\s*=\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)"
    ).unwrap();
}

/// Result of parsing one line: the resolved input plus everything that
/// did not map to a signal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedLine {
    pub input: SignalInput,
    /// Keys that matched no signal name
    pub ignored: Vec<String>,
}

impl ParsedLine {
    /// True when at least one signal was recognized
    pub fn any_recognized(&self) -> bool {
        self.input != SignalInput::default()
    }
}

/// Parser for interactive signal lines
#[derive(Debug, Default)]
pub struct SignalParser;

impl SignalParser {
    /// Create new parser
    pub fn new() -> Self {
        Self
    }

    /// Parse a line of `key=value` pairs into a signal input.
    pub fn parse(&self, line: &str) -> ParsedLine {
        let mut parsed = ParsedLine::default();

        for cap in RE_PAIR.captures_iter(line) {
            let key = cap[1].to_ascii_lowercase();
            let value: f64 = match cap[2].parse() {
                Ok(v) => v,
                Err(_) => {
                    parsed.ignored.push(key);
                    continue;
                }
            };

            match key.as_str() {
                "loopgain" | "loop_gain" | "gain" | "g" => parsed.input.loop_gain = Some(value),
                "coupling" | "c" => parsed.input.coupling = Some(value),
                "predictionerror" | "prediction_error" | "error" | "eps" | "e" => {
                    parsed.input.prediction_error = Some(value)
                }
                "novelty" | "n" => parsed.input.novelty = Some(value),
                "activation" | "a" => parsed.input.activation = Some(value),
                _ => parsed.ignored.push(key),
            }
        }

        parsed
    }
}

// =============================================================================
// TESTS
// =============================================================================
