//! Handing finished snapshots to downstream sinks.
//!
//! A publisher receives a complete, read-only [`Snapshot`] and replaces
//! whatever it published before. Nothing is merged or streamed: each cycle's
//! output overwrites the last one in full.

mod dto;
mod error;
mod file;

use std::future::Future;

use tracing::info;

use crate::domain::Snapshot;

pub use dto::{CompactRecord, RecordDocument, SnapshotDocument, compact_feed};
pub use error::PublishError;
pub use file::FilePublisher;

/// A sink for snapshots and compact feeds.
///
/// Both operations must be all-or-nothing: on error, the sink still holds
/// its previous content.
pub trait Publisher {
    fn publish_snapshot(
        &self,
        snapshot: &Snapshot,
    ) -> impl Future<Output = Result<(), PublishError>> + Send;

    fn publish_compact_feed(
        &self,
        feed: &[CompactRecord],
    ) -> impl Future<Output = Result<(), PublishError>> + Send;
}

/// Publish the full snapshot, then its compact feed.
///
/// The feed is only written once the snapshot has been, so the feed never
/// runs ahead of the document it was derived from.
pub async fn publish<P: Publisher>(publisher: &P, snapshot: &Snapshot) -> Result<(), PublishError> {
    publisher.publish_snapshot(snapshot).await?;

    let feed = compact_feed(snapshot);
    publisher.publish_compact_feed(&feed).await?;

    info!(
        routes = snapshot.routes().len(),
        records = feed.len(),
        "Published snapshot"
    );
    Ok(())
}
