//! sw-core: shared types, errors, configuration, clock, and the control
//! message broadcaster.
//!
//! This crate is the foundational dependency for the other sw-* crates,
//! providing the unified error type, application configuration, an
//! injectable clock for time-based expiry, typed participant identifiers,
//! and the room-scoped [`ControlHub`](control::ControlHub).

pub mod clock;
pub mod config;
pub mod control;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use ids::*;
