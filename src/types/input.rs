//! Signal input and the retained last-frame record

use serde::{Deserialize, Serialize};

use crate::core::math::clamp01;
use crate::{
    DEFAULT_ACTIVATION, DEFAULT_COUPLING, DEFAULT_LOOP_GAIN, DEFAULT_NOVELTY,
    DEFAULT_PREDICTION_ERROR,
};

/// One update's worth of instantaneous signals (5 signals).
///
/// Every field is optional; omitted fields take the defaults from the
/// crate-level table. Values are clamped into [0,1] on resolve. NaN passes
/// through the clamp untouched, matching ordinary float comparison
/// semantics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct SignalInput {
    /// Control-loop gain (default 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_gain: Option<f64>,
    /// Coupling strength (default 0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupling: Option<f64>,
    /// Prediction error; smoothness is its complement (default 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_error: Option<f64>,
    /// Novelty, scored against its Gaussian sweet spot (default 0.5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub novelty: Option<f64>,
    /// Activation, scored against its Gaussian sweet spot (default 0.5)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<f64>,
}

impl SignalInput {
    /// Default + clamp every field, and derive smoothness.
    pub fn resolve(&self) -> SignalFrame {
        let loop_gain = clamp01(self.loop_gain.unwrap_or(DEFAULT_LOOP_GAIN));
        let coupling = clamp01(self.coupling.unwrap_or(DEFAULT_COUPLING));
        let prediction_error = clamp01(self.prediction_error.unwrap_or(DEFAULT_PREDICTION_ERROR));
        let novelty = clamp01(self.novelty.unwrap_or(DEFAULT_NOVELTY));
        let activation = clamp01(self.activation.unwrap_or(DEFAULT_ACTIVATION));
        SignalFrame {
            loop_gain,
            coupling,
            prediction_error,
            novelty,
            activation,
            smoothness: 1.0 - prediction_error,
        }
    }
}

/// The normalized signals of the most recent update, plus derived
/// smoothness. Retained for introspection and export only; the next
/// update never reads it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalFrame {
    pub loop_gain: f64,
    pub coupling: f64,
    pub prediction_error: f64,
    pub novelty: f64,
    pub activation: f64,
    pub smoothness: f64,
}

impl SignalFrame {
    /// The fixed frame installed by reset.
    pub fn initial() -> Self {
        Self {
            loop_gain: DEFAULT_LOOP_GAIN,
            coupling: DEFAULT_COUPLING,
            prediction_error: DEFAULT_PREDICTION_ERROR,
            novelty: DEFAULT_NOVELTY,
            activation: DEFAULT_ACTIVATION,
            smoothness: 0.0,
        }
    }

    /// Field-wise merge for partial import. Absent fields are retained.
    pub fn apply(&mut self, patch: &FramePatch) {
        if let Some(v) = patch.loop_gain {
            self.loop_gain = v;
        }
        if let Some(v) = patch.coupling {
            self.coupling = v;
        }
        if let Some(v) = patch.prediction_error {
            self.prediction_error = v;
        }
        if let Some(v) = patch.novelty {
            self.novelty = v;
        }
        if let Some(v) = patch.activation {
            self.activation = v;
        }
        if let Some(v) = patch.smoothness {
            self.smoothness = v;
        }
    }
}

impl Default for SignalFrame {
    fn default() -> Self {
        Self::initial()
    }
}

/// Partial override of the last-frame record, used by state import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct FramePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loop_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupling: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prediction_error: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub novelty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoothness: Option<f64>,
}

impl From<SignalFrame> for FramePatch {
    fn from(f: SignalFrame) -> Self {
        Self {
            loop_gain: Some(f.loop_gain),
            coupling: Some(f.coupling),
            prediction_error: Some(f.prediction_error),
            novelty: Some(f.novelty),
            activation: Some(f.activation),
            smoothness: Some(f.smoothness),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
