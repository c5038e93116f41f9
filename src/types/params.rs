//! Kernel parameter record with field-wise merge semantics

use serde::{Deserialize, Serialize};

use crate::{
    FLOOR_ABSORPTION_DEFAULT, FLOOR_TIMELESSNESS_DEFAULT, MIN_SCALE_DEFAULT, TAU_DEFAULT,
    WINDOW_CENTER_DEFAULT, WINDOW_WIDTH_DEFAULT, W_ACTIVATION_DEFAULT, W_COUPLING_DEFAULT,
    W_GAIN_DEFAULT, W_NOVELTY_DEFAULT, W_SMOOTHNESS_DEFAULT,
};

/// Tunable parameters, fixed for the lifetime of a kernel instance
/// (only `import_state` may merge new values in).
///
/// All weights and rates are expected in [0,1] but never validated;
/// out-of-domain parameters produce out-of-domain (yet finite-arithmetic)
/// outputs rather than errors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KernelParams {
    /// Weight of loop gain (default 0.35)
    pub w_gain: f64,
    /// Weight of coupling (default 0.35)
    pub w_coupling: f64,
    /// Weight of smoothness (default 0.15)
    pub w_smoothness: f64,
    /// Weight of the novelty window (default 0.10)
    pub w_novelty: f64,
    /// Weight of the activation window (default 0.05)
    pub w_activation: f64,
    /// Novelty sweet-spot center (default 0.5)
    pub novelty_center: f64,
    /// Novelty window width (default 0.25)
    pub novelty_width: f64,
    /// Activation sweet-spot center (default 0.5)
    pub activation_center: f64,
    /// Activation window width (default 0.25)
    pub activation_width: f64,
    /// EMA smoothing rate in [0,1] (default 0.25)
    pub tau: f64,
    /// Time scale reached at full timelessness (default 0.2)
    pub min_scale: f64,
    /// Absorption value after reset (default 0)
    pub floor_absorption: f64,
    /// Timelessness value after reset (default 0)
    pub floor_timelessness: f64,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            w_gain: W_GAIN_DEFAULT,
            w_coupling: W_COUPLING_DEFAULT,
            w_smoothness: W_SMOOTHNESS_DEFAULT,
            w_novelty: W_NOVELTY_DEFAULT,
            w_activation: W_ACTIVATION_DEFAULT,
            novelty_center: WINDOW_CENTER_DEFAULT,
            novelty_width: WINDOW_WIDTH_DEFAULT,
            activation_center: WINDOW_CENTER_DEFAULT,
            activation_width: WINDOW_WIDTH_DEFAULT,
            tau: TAU_DEFAULT,
            min_scale: MIN_SCALE_DEFAULT,
            floor_absorption: FLOOR_ABSORPTION_DEFAULT,
            floor_timelessness: FLOOR_TIMELESSNESS_DEFAULT,
        }
    }
}

impl KernelParams {
    /// Apply a partial override, field by field. Absent fields keep their
    /// current values.
    pub fn apply(&mut self, patch: &ParamsPatch) {
        if let Some(v) = patch.w_gain {
            self.w_gain = v;
        }
        if let Some(v) = patch.w_coupling {
            self.w_coupling = v;
        }
        if let Some(v) = patch.w_smoothness {
            self.w_smoothness = v;
        }
        if let Some(v) = patch.w_novelty {
            self.w_novelty = v;
        }
        if let Some(v) = patch.w_activation {
            self.w_activation = v;
        }
        if let Some(v) = patch.novelty_center {
            self.novelty_center = v;
        }
        if let Some(v) = patch.novelty_width {
            self.novelty_width = v;
        }
        if let Some(v) = patch.activation_center {
            self.activation_center = v;
        }
        if let Some(v) = patch.activation_width {
            self.activation_width = v;
        }
        if let Some(v) = patch.tau {
            self.tau = v;
        }
        if let Some(v) = patch.min_scale {
            self.min_scale = v;
        }
        if let Some(v) = patch.floor_absorption {
            self.floor_absorption = v;
        }
        if let Some(v) = patch.floor_timelessness {
            self.floor_timelessness = v;
        }
    }

    /// Merged copy, leaving self untouched.
    pub fn merged(&self, patch: &ParamsPatch) -> Self {
        let mut out = *self;
        out.apply(patch);
        out
    }
}

/// Partial parameter override. Every field optional; unknown JSON keys are
/// rejected at the serde boundary rather than silently accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ParamsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w_gain: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w_coupling: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w_smoothness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w_novelty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub w_activation: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub novelty_center: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub novelty_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_center: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tau: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_absorption: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor_timelessness: Option<f64>,
}

impl From<KernelParams> for ParamsPatch {
    fn from(p: KernelParams) -> Self {
        Self {
            w_gain: Some(p.w_gain),
            w_coupling: Some(p.w_coupling),
            w_smoothness: Some(p.w_smoothness),
            w_novelty: Some(p.w_novelty),
            w_activation: Some(p.w_activation),
            novelty_center: Some(p.novelty_center),
            novelty_width: Some(p.novelty_width),
            activation_center: Some(p.activation_center),
            activation_width: Some(p.activation_width),
            tau: Some(p.tau),
            min_scale: Some(p.min_scale),
            floor_absorption: Some(p.floor_absorption),
            floor_timelessness: Some(p.floor_timelessness),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_table() {
        let p = KernelParams::default();
        assert_eq!(p.w_gain, 0.35);
        assert_eq!(p.w_coupling, 0.35);
        assert_eq!(p.w_smoothness, 0.15);
        assert_eq!(p.w_novelty, 0.10);
        assert_eq!(p.w_activation, 0.05);
        assert_eq!(p.novelty_center, 0.5);
        assert_eq!(p.novelty_width, 0.25);
        assert_eq!(p.tau, 0.25);
        assert_eq!(p.min_scale, 0.2);
        assert_eq!(p.floor_absorption, 0.0);
        assert_eq!(p.floor_timelessness, 0.0);
    }

    #[test]
    fn test_apply_overrides_only_present_fields() {
        let mut p = KernelParams::default();
        p.apply(&ParamsPatch {
            tau: Some(1.0),
            min_scale: Some(0.5),
            ..ParamsPatch::default()
        });
        assert_eq!(p.tau, 1.0);
        assert_eq!(p.min_scale, 0.5);
        // Untouched fields keep defaults
        assert_eq!(p.w_gain, 0.35);
        assert_eq!(p.novelty_width, 0.25);
    }

    #[test]
    fn test_empty_patch_is_identity() {
        let p = KernelParams::default();
        assert_eq!(p.merged(&ParamsPatch::default()), p);
    }

    #[test]
    fn test_camel_case_wire_keys() {
        let json = serde_json::to_string(&KernelParams::default()).unwrap();
        assert!(json.contains("\"wGain\""));
        assert!(json.contains("\"noveltyCenter\""));
        assert!(json.contains("\"minScale\""));
        assert!(json.contains("\"floorAbsorption\""));
    }

    #[test]
    fn test_patch_roundtrip_from_params() {
        let p = KernelParams::default();
        let patch: ParamsPatch = p.into();
        let mut q = KernelParams {
            tau: 0.9,
            ..KernelParams::default()
        };
        q.apply(&patch);
        assert_eq!(q, p);
    }
}
