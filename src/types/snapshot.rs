//! Snapshot and exportable state records
//!
//! A `Snapshot` is what `update`/`get` return; `FullState` adds the
//! parameter set and is the unit of export/import. Import goes through
//! `StatePatch`, whose absent fields mean "leave untouched".

use serde::{Deserialize, Serialize};

use crate::types::{FramePatch, KernelParams, ParamsPatch, SignalFrame};

/// Read-only view of kernel state after an update. Owned copy, so mutating
/// it never touches the kernel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Fast-smoothed engagement score in [0,1]
    pub absorption: f64,
    /// Doubly-lagged engagement score in [0,1]
    pub timelessness: f64,
    /// Time multiplier, 1.0 (no distortion) down to minScale
    pub subjective_dt_scale: f64,
    /// Clamped signals of the most recent update
    pub last: SignalFrame,
}

/// Complete exportable state: snapshot plus parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullState {
    pub params: KernelParams,
    pub absorption: f64,
    pub timelessness: f64,
    pub subjective_dt_scale: f64,
    pub last: SignalFrame,
}

impl FullState {
    /// The snapshot portion, without parameters.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            absorption: self.absorption,
            timelessness: self.timelessness,
            subjective_dt_scale: self.subjective_dt_scale,
            last: self.last,
        }
    }
}

/// Partial state for import. Every field optional; a full export converts
/// losslessly into a patch, so `import_state(export_state())` round-trips.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct StatePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<ParamsPatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub absorption: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timelessness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subjective_dt_scale: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<FramePatch>,
}

impl From<FullState> for StatePatch {
    fn from(state: FullState) -> Self {
        Self {
            params: Some(state.params.into()),
            absorption: Some(state.absorption),
            timelessness: Some(state.timelessness),
            subjective_dt_scale: Some(state.subjective_dt_scale),
            last: Some(state.last.into()),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> FullState {
        FullState {
            params: KernelParams::default(),
            absorption: 0.42,
            timelessness: 0.31,
            subjective_dt_scale: 0.752,
            last: SignalFrame::initial(),
        }
    }

    #[test]
    fn test_snapshot_wire_keys_are_camel_case() {
        let json = serde_json::to_string(&sample_state().snapshot()).unwrap();
        assert!(json.contains("\"subjectiveDtScale\""));
        assert!(json.contains("\"predictionError\""));
        assert!(json.contains("\"loopGain\""));
    }

    #[test]
    fn test_full_state_json_roundtrip() {
        let state = sample_state();
        let json = serde_json::to_string(&state).unwrap();
        let restored: FullState = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_full_state_deserializes_as_patch() {
        // An exported blob must be importable as-is
        let json = serde_json::to_string(&sample_state()).unwrap();
        let patch: StatePatch = serde_json::from_str(&json).unwrap();
        assert_eq!(patch.absorption, Some(0.42));
        assert_eq!(patch.subjective_dt_scale, Some(0.752));
        assert!(patch.params.is_some());
        assert!(patch.last.is_some());
    }

    #[test]
    fn test_patch_from_export_is_complete() {
        let patch: StatePatch = sample_state().into();
        assert!(patch.params.is_some());
        assert!(patch.absorption.is_some());
        assert!(patch.timelessness.is_some());
        assert!(patch.subjective_dt_scale.is_some());
        assert!(patch.last.is_some());
    }

    #[test]
    fn test_sparse_patch_leaves_fields_none() {
        let patch: StatePatch = serde_json::from_str(r#"{"absorption": 0.4}"#).unwrap();
        assert_eq!(patch.absorption, Some(0.4));
        assert!(patch.timelessness.is_none());
        assert!(patch.params.is_none());
        assert!(patch.last.is_none());
    }
}
