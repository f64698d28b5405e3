//! Writers that render merged messages back into both export formats.
//!
//! - [`to_records_json`] - the structured record file
//! - [`to_transcript`] - the plain-text transcript
//!
//! Both return strings; the sync pipeline decides where and how they are
//! written.

mod record_writer;
mod transcript_writer;

pub use record_writer::{RecordDefaults, to_records, to_records_json};
pub use transcript_writer::{dominant_style, to_transcript};
