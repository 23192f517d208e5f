//! Tracing subscriber setup.

mod init_basic;

pub use init_basic::{init_telemetry, LogFormat};
