//! Analysis modules.
//!
//! Pure aggregations that turn passenger records into chart data.

pub mod aggregator;

pub use aggregator::*;
