//! Core types for Timewarp

mod input;
mod output;
mod params;
mod snapshot;

pub use input::{FramePatch, SignalFrame, SignalInput};
pub use output::{FlowBand, TickReport};
pub use params::{KernelParams, ParamsPatch};
pub use snapshot::{FullState, Snapshot, StatePatch};
