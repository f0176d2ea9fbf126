//! Infrastructure layer: config, logging, signals and the on-disk room layout.

pub mod config;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod membership;
pub mod signals;

/// Returns the infra module name for smoke checks.
pub fn module_name() -> &'static str {
    "infra"
}
