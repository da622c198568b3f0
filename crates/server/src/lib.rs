//! Callback listener for answered errands.

pub mod api;
pub mod state;
