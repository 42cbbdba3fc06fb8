//! Request middleware: operation logging and HTTP tracing.

pub mod operation_log;
pub mod tracing_layer;
