//! Folding route results into a snapshot.

use std::collections::BTreeMap;

use chrono::{DateTime, Local};

use crate::domain::{Snapshot, TrainRecord};

use super::controller::RouteScrape;

/// Accumulates route results for one cycle.
///
/// Every route seen gets an entry, even when all its directions came back
/// empty, so consumers can tell "no trains" from "route missing".
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    routes: BTreeMap<String, Vec<TrainRecord>>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one route/direction result, keeping record order.
    pub fn add(&mut self, scrape: RouteScrape) {
        self.routes
            .entry(scrape.route)
            .or_default()
            .extend(scrape.records);
    }

    /// Finish the snapshot with a single capture timestamp.
    pub fn finish(self, timestamp: DateTime<Local>) -> Snapshot {
        Snapshot::new(timestamp, self.routes)
    }
}

/// Build a snapshot stamped with the current time.
pub fn aggregate(scrapes: impl IntoIterator<Item = RouteScrape>) -> Snapshot {
    aggregate_at(scrapes, Local::now())
}

/// Build a snapshot stamped with `timestamp`.
pub fn aggregate_at(
    scrapes: impl IntoIterator<Item = RouteScrape>,
    timestamp: DateTime<Local>,
) -> Snapshot {
    let mut builder = SnapshotBuilder::new();
    for scrape in scrapes {
        builder.add(scrape);
    }
    builder.finish(timestamp)
}
