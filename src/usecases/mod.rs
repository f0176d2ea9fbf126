//! Use case layer: joining, broadcasting, reading and leaving a room.

pub mod bootstrap;
pub mod broadcast;
pub mod context;
pub mod lifecycle;
pub mod reader;
pub mod session;

/// Returns the usecases module name for smoke checks.
pub fn module_name() -> &'static str {
    "usecases"
}
