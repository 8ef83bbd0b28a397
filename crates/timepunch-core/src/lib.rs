//! Core types: clock actions, wire payloads, formatting, tracing

pub mod clock;
pub mod format;
pub mod tracing;

pub use clock::{ClockAction, ClockArgs, ClockPayload, ClockRequest};
pub use format::html_escape;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
