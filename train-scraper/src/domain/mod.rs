//! Domain types for train position snapshots.
//!
//! These types are what the scrape pipeline produces and what publishers
//! consume. Positions enforce their invariants at construction time, so a
//! `ParsedPosition` can never claim to be between stations without naming
//! the second one.

mod direction;
mod position;
mod record;
mod route;
mod snapshot;

pub use direction::Direction;
pub use position::{Action, ParsedPosition, UNKNOWN_STATION};
pub use record::TrainRecord;
pub use route::RouteDescriptor;
pub use snapshot::Snapshot;
