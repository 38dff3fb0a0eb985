//! Browser session lifecycle.

use std::future::Future;

use super::catalog::{RouteCatalog, StatusTable};
use super::error::ScrapeError;

/// A live connection to the status page, owned by one cycle attempt.
pub trait ScrapeSession: RouteCatalog + StatusTable {
    /// Tear the session down. Called once per opened session, whatever the
    /// outcome of the attempt.
    fn close(self) -> impl Future<Output = Result<(), ScrapeError>> + Send;
}

/// Opens fresh sessions, one per cycle attempt.
pub trait SessionFactory {
    type Session: ScrapeSession;

    fn open(&self) -> impl Future<Output = Result<Self::Session, ScrapeError>> + Send;
}
