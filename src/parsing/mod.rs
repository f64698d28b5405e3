//! Shared parsing utilities.
//!
//! - [`dates`] - Date normalization for every supported date convention
//!
//! Both the record parser and the transcript parser depend on this module,
//! so it must stay free of any source-specific logic.

pub mod dates;

pub use dates::{NormalizedDate, YEAR_PIVOT, format_date, normalize, parse_date, split_leading_date};
