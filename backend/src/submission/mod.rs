//! Routing of posted form submissions.
//!
//! A submission moves through `received -> validated -> routed` and ends
//! either stored, forwarded or failed:
//! - `default` (or no destination): the raw body is written to
//!   `responses/<form id>/` without being parsed.
//! - `web`: the JSON body is re-encoded per the destination's content type
//!   and POSTed to its URL.
//! - `db`: `{schema, destination, data}` is POSTed to the aggregation
//!   service, which owns the database side.

pub mod encode;
mod error;
mod router;

pub use error::SubmitError;
pub use router::{check_content_type, Outcome, SubmissionRouter};
