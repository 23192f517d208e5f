//! Kindlezap API Library
//!
//! HTTP handlers, the request pipeline, and application setup.

mod handlers;
mod services;
mod utils;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
