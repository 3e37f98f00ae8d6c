//! Shared CLI presentation utilities.
//!
//! Keep this module format-only: no domain transforms.

pub mod records;
pub mod tables;

pub use tables::{format_timestamp, print_separator, truncate_string};
