//! Presentation layer: terminal output.

pub mod console;

/// Returns the ui module name for smoke checks.
pub fn module_name() -> &'static str {
    "ui"
}
