//! Tracing/logging setup shared by binaries and tests.

/// Tracing configuration (filters, formatters).
pub mod tracing;

pub use tracing::{LogFormat, UnknownLogFormat};

/// Initialize process-wide tracing.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init(format: LogFormat) {
    tracing::init(format);
}
