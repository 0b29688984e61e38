//! A self-contained think/act/observe loop.
//!
//! Unlike the task executor in [`crate::agents`], the controller here does not
//! ask a model what to do next: step selection is rule-based, driven by its
//! own thought and observation histories, an internal plan queue, and an
//! error counter with recovery strategy selection.

pub mod controller;
pub mod models;
pub mod recovery;

pub use controller::ReActController;
pub use models::{ActionType, Observation, Thought};
pub use recovery::{ErrorKind, RecoveryStrategy};
