//! Kindlezap Storage Library
//!
//! Temporary on-disk storage for uploaded documents and everything derived from them.
//!
//! Every file written for a request is registered with a [`TempFileScope`]. The scope
//! removes its files when released, and again from `Drop` if the request future is
//! abandoned or panics, so a request never leaves files behind.

pub mod error;
pub mod temp;

pub use error::{StorageError, StorageResult};
pub use temp::{TempFileScope, TempStorage};
