//! Exit codes for the shcv binary
//!
//! Usage errors are reported by clap with its own code (2).

/// Success - the chart was processed
pub const SUCCESS: i32 = 0;

/// General error - any failure while processing the chart
pub const ERROR: i32 = 1;
