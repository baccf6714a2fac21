//! Logging utilities.
//!
//! Every engine module reports through the `log` facade; this module only
//! owns backend initialization. Severity replaces hand-written text tags.

mod init;

pub use init::{LoggingConfig, init_logging};
