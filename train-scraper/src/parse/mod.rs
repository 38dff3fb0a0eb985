//! Status text parsing.
//!
//! Turns the free-text status shown for each train into a typed
//! [`ParsedPosition`](crate::domain::ParsedPosition). Parsing is total: any
//! input, including empty or garbage text, yields a result.

mod location;
mod station;

pub use location::{ParsedStatus, parse, parse_status};
pub(crate) use station::collapse_whitespace;
pub use station::normalize_station;
