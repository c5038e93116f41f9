//! Timewarp kernel: the double-smoothed absorption/timelessness loop
//!
//! Per update:
//! - clamp the five signals, derive smoothness = 1 - predictionError
//! - raw absorption = weighted blend of three linear terms and two
//!   Gaussian-window terms, clamped to [0,1]
//! - absorption ← EMA(absorption, raw), timelessness ← EMA(timelessness,
//!   absorption): timelessness lags absorption, which lags the raw score,
//!   so no single step can make timelessness jump from a raw spike
//! - subjectiveDtScale = lerp(1.0, minScale, timelessness)

use crate::core::math::{clamp01, ema, gaussian_window, lerp};
use crate::types::{FullState, KernelParams, SignalFrame, SignalInput, Snapshot, StatePatch};
use crate::BASE_SCALE;

/// Deterministic state-update kernel. One writer per instance; no
/// internal synchronization.
#[derive(Debug, Clone)]
pub struct TimewarpKernel {
    /// Tunable parameters, merged only through import
    params: KernelParams,
    /// Fast-smoothed engagement score in [0,1]
    absorption: f64,
    /// Doubly-lagged engagement score in [0,1]
    timelessness: f64,
    /// Derived time multiplier, not range-constrained
    subjective_dt_scale: f64,
    /// Signals of the most recent update, introspection only
    last: SignalFrame,
    /// Number of updates since construction or reset
    update_count: u64,
}

impl Default for TimewarpKernel {
    fn default() -> Self {
        Self::new(KernelParams::default())
    }
}

impl TimewarpKernel {
    /// Create a kernel with the given parameters, starting at floor state.
    pub fn new(params: KernelParams) -> Self {
        let mut kernel = Self {
            params,
            absorption: 0.0,
            timelessness: 0.0,
            subjective_dt_scale: BASE_SCALE,
            last: SignalFrame::initial(),
            update_count: 0,
        };
        kernel.reset();
        kernel
    }

    /// Return state to the configured floors. Idempotent.
    pub fn reset(&mut self) {
        self.absorption = self.params.floor_absorption;
        self.timelessness = self.params.floor_timelessness;
        self.subjective_dt_scale = BASE_SCALE;
        self.last = SignalFrame::initial();
        self.update_count = 0;
    }

    /// Apply one step of signals and return the resulting snapshot.
    pub fn update(&mut self, input: SignalInput) -> Snapshot {
        let p = self.params;
        let frame = input.resolve();

        let novelty_window = gaussian_window(frame.novelty, p.novelty_center, p.novelty_width);
        let activation_window =
            gaussian_window(frame.activation, p.activation_center, p.activation_width);

        let raw_absorption = clamp01(
            p.w_gain * frame.loop_gain
                + p.w_coupling * frame.coupling
                + p.w_smoothness * frame.smoothness
                + p.w_novelty * novelty_window
                + p.w_activation * activation_window,
        );

        self.absorption = ema(self.absorption, raw_absorption, p.tau);
        self.timelessness = clamp01(ema(self.timelessness, self.absorption, p.tau));
        self.subjective_dt_scale = lerp(BASE_SCALE, p.min_scale, self.timelessness);
        self.last = frame;
        self.update_count += 1;

        self.get()
    }

    /// Owned snapshot of current state.
    pub fn get(&self) -> Snapshot {
        Snapshot {
            absorption: self.absorption,
            timelessness: self.timelessness,
            subjective_dt_scale: self.subjective_dt_scale,
            last: self.last,
        }
    }

    /// Full state including parameters, suitable for host serialization.
    pub fn export_state(&self) -> FullState {
        FullState {
            params: self.params,
            absorption: self.absorption,
            timelessness: self.timelessness,
            subjective_dt_scale: self.subjective_dt_scale,
            last: self.last,
        }
    }

    /// Partial, non-destructive merge. Present fields overwrite; absent
    /// fields are retained. Absorption and timelessness are clamped on the
    /// way in; the scale is assigned as-is since it is derived rather than
    /// probability-like.
    pub fn import_state(&mut self, patch: &StatePatch) {
        if let Some(params) = &patch.params {
            self.params.apply(params);
        }
        if let Some(absorption) = patch.absorption {
            self.absorption = clamp01(absorption);
        }
        if let Some(timelessness) = patch.timelessness {
            self.timelessness = clamp01(timelessness);
        }
        if let Some(scale) = patch.subjective_dt_scale {
            self.subjective_dt_scale = scale;
        }
        if let Some(last) = &patch.last {
            self.last.apply(last);
        }
    }

    /// Get current parameters
    pub fn params(&self) -> &KernelParams {
        &self.params
    }

    /// Get current absorption
    pub fn absorption(&self) -> f64 {
        self.absorption
    }

    /// Get current timelessness
    pub fn timelessness(&self) -> f64 {
        self.timelessness
    }

    /// Get current subjective time scale
    pub fn subjective_dt_scale(&self) -> f64 {
        self.subjective_dt_scale
    }

    /// Get the retained last frame
    pub fn last(&self) -> &SignalFrame {
        &self.last
    }

    /// Get update count since construction or reset
    pub fn update_count(&self) -> u64 {
        self.update_count
    }
}

// =============================================================================
// TESTS
// =============================================================================
