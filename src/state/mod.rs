//! Status State Machine
//!
//! Decides which status changes are legal, independent of storage.

mod transition;

pub use transition::{TransitionError, TransitionValidator};
