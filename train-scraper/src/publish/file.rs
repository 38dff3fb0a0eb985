//! Publishing to JSON files on disk.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::domain::Snapshot;

use super::Publisher;
use super::dto::{CompactRecord, SnapshotDocument};
use super::error::PublishError;

const SNAPSHOT_FILE: &str = "snapshot.json";
const FEED_FILE: &str = "feed.json";

/// Writes the snapshot and compact feed as files in one directory.
///
/// Each file is replaced atomically: the new content is written to a
/// temporary sibling and renamed over the old file, so readers see either
/// the previous document or the new one, never a partial write.
#[derive(Debug, Clone)]
pub struct FilePublisher {
    dir: PathBuf,
}

impl FilePublisher {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE)
    }

    pub fn feed_path(&self) -> PathBuf {
        self.dir.join(FEED_FILE)
    }

    async fn replace<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), PublishError> {
        let bytes = serde_json::to_vec_pretty(value)?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| PublishError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let tmp = path.with_extension("json.tmp");
        if let Err(source) = tokio::fs::write(&tmp, &bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(PublishError::Io { path: tmp, source });
        }

        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|source| PublishError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        debug!(path = %path.display(), bytes = bytes.len(), "Replaced file");
        Ok(())
    }
}

impl Publisher for FilePublisher {
    async fn publish_snapshot(&self, snapshot: &Snapshot) -> Result<(), PublishError> {
        let doc = SnapshotDocument::from(snapshot);
        self.replace(&self.snapshot_path(), &doc).await
    }

    async fn publish_compact_feed(&self, feed: &[CompactRecord]) -> Result<(), PublishError> {
        self.replace(&self.feed_path(), feed).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Action, Direction, ParsedPosition, TrainRecord};
    use crate::publish::publish;
    use crate::scrape::{RouteScrape, StepOutcome, aggregate_at};
    use chrono::{Local, NaiveTime, TimeZone};

    fn snapshot(names: &[&str]) -> Snapshot {
        let records = names
            .iter()
            .map(|name| TrainRecord {
                route: "Tohoku".into(),
                direction: Direction::Down,
                name: name.to_string(),
                position: ParsedPosition::at("SENDAI", Action::Stopped),
                event_time: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            })
            .collect();
        aggregate_at(
            vec![RouteScrape {
                route: "Tohoku".into(),
                direction: Direction::Down,
                records,
                outcome: StepOutcome::Table { rows: names.len() },
            }],
            Local.with_ymd_and_hms(2026, 10, 19, 18, 31, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn writes_both_documents() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path().join("out"));

        publish(&publisher, &snapshot(&["Hayabusa 30", "Yamabiko 140"]))
            .await
            .unwrap();

        let doc: SnapshotDocument =
            serde_json::from_str(&std::fs::read_to_string(publisher.snapshot_path()).unwrap())
                .unwrap();
        assert_eq!(doc.routes["Tohoku"].len(), 2);

        let feed: Vec<CompactRecord> =
            serde_json::from_str(&std::fs::read_to_string(publisher.feed_path()).unwrap())
                .unwrap();
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].n, "Hayabusa 30");
    }

    #[tokio::test]
    async fn overwrites_wholesale() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = FilePublisher::new(dir.path());

        publish(&publisher, &snapshot(&["A", "B", "C"])).await.unwrap();
        publish(&publisher, &snapshot(&["D"])).await.unwrap();

        let feed: Vec<CompactRecord> =
            serde_json::from_str(&std::fs::read_to_string(publisher.feed_path()).unwrap())
                .unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].n, "D");

        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.path().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn unwritable_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"file").unwrap();
        let publisher = FilePublisher::new(&blocker);

        let err = publish(&publisher, &snapshot(&["A"])).await.unwrap_err();
        assert!(matches!(err, PublishError::Io { .. }));
    }
}
