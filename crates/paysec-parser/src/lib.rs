//! Request field patterns and the transaction filter grammar
//!
//! Everything here is pure: no storage, no clock. The core crate turns the
//! parsed [`FilterCriteria`] into a store query.

pub mod error;
pub mod filter;
pub mod patterns;

pub use error::ParseError;
pub use filter::{parse_instant, FilterCriteria, TimestampFilter, FILTER_KEYS};
