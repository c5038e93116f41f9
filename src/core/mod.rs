//! Core modules for Timewarp

pub mod api;
pub mod kernel;
pub mod math;
pub mod signal_parser;

pub use api::{create_router, run_server};
pub use kernel::TimewarpKernel;
pub use signal_parser::{ParsedLine, SignalParser};
