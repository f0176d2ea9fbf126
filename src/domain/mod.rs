//! Domain layer: rooms, participants, messages and delivery outcomes.

pub mod delivery;
pub mod message;
pub mod room;

/// Returns the domain module name for smoke checks.
pub fn module_name() -> &'static str {
    "domain"
}
