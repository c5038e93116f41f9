//! Timewarp: deterministic subjective-time kernel
//!
//! Converts five normalized control-loop signals into two smoothed outputs
//! (absorption, timelessness) and a derived time-scaling factor.

pub mod core;
pub mod types;

// =============================================================================
// SCORE WEIGHTS - defaults, conceptually sum to ≤1 (not enforced)
// =============================================================================

/// Weight of the loop-gain signal in raw absorption
pub const W_GAIN_DEFAULT: f64 = 0.35;

/// Weight of the coupling signal
pub const W_COUPLING_DEFAULT: f64 = 0.35;

/// Weight of smoothness (inverse prediction error)
pub const W_SMOOTHNESS_DEFAULT: f64 = 0.15;

/// Weight of the novelty Gaussian window
pub const W_NOVELTY_DEFAULT: f64 = 0.10;

/// Weight of the activation Gaussian window
pub const W_ACTIVATION_DEFAULT: f64 = 0.05;

// =============================================================================
// WINDOW / SMOOTHING DEFAULTS
// =============================================================================

/// Gaussian window center for novelty and activation
pub const WINDOW_CENTER_DEFAULT: f64 = 0.5;

/// Gaussian window width for novelty and activation
pub const WINDOW_WIDTH_DEFAULT: f64 = 0.25;

/// Floor on window widths, prevents division by zero
pub const GAUSSIAN_MIN_WIDTH: f64 = 1e-6;

/// Smoothing rate for both EMA stages
pub const TAU_DEFAULT: f64 = 0.25;

/// Subjective time scale at full timelessness
pub const MIN_SCALE_DEFAULT: f64 = 0.2;

/// Subjective time scale at zero timelessness (no distortion)
pub const BASE_SCALE: f64 = 1.0;

/// Reset value for absorption
pub const FLOOR_ABSORPTION_DEFAULT: f64 = 0.0;

/// Reset value for timelessness
pub const FLOOR_TIMELESSNESS_DEFAULT: f64 = 0.0;

// =============================================================================
// SIGNAL INPUT DEFAULTS - applied before clamping when a field is omitted
// =============================================================================

pub const DEFAULT_LOOP_GAIN: f64 = 0.0;
pub const DEFAULT_COUPLING: f64 = 0.0;
pub const DEFAULT_PREDICTION_ERROR: f64 = 1.0;
pub const DEFAULT_NOVELTY: f64 = 0.5;
pub const DEFAULT_ACTIVATION: f64 = 0.5;

// =============================================================================
// VERSION
// =============================================================================

pub const VERSION: &str = "1.0.0";
