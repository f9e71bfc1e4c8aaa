//! Dataset loading.
//!
//! Reads the delimited passenger manifest into [`Passenger`](crate::models::Passenger)
//! records.

pub mod loader;

pub use loader::{DatasetError, DatasetLoader};
