//! Local storage of fetched snapshots.
//!
//! Every `earnings fetch` writes one file named `snapshot.YYYY-MM-DD-NNN.json` into
//! `$EARNINGS_HOME/.snapshots`, where `NNN` is a per-day sequence number. Older files are rotated
//! away so that at most `snapshot_copies` remain.

use crate::model::Snapshot;
use crate::{utils, Config, Result};
use anyhow::{bail, Context};
use chrono::Local;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Prefix of snapshot file names.
pub const SNAPSHOT: &str = "snapshot";

const EXTENSION: &str = "json";

/// Saves, rotates and loads snapshot files.
///
/// Create a new instance via `Config::snapshot_store()` or `SnapshotStore::new()`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
    copies: u32,
}

impl SnapshotStore {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.snapshots().to_path_buf(),
            copies: config.snapshot_copies(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes `snapshot` as pretty-printed JSON, then rotates old files.
    ///
    /// Returns the path to the created file.
    pub async fn save(&self, snapshot: &Snapshot) -> Result<PathBuf> {
        let date = today();
        let seq = self.next_sequence_number(&date).await?;
        let path = self
            .dir
            .join(format!("{SNAPSHOT}.{date}-{seq:03}.{EXTENSION}"));

        let json =
            serde_json::to_string_pretty(snapshot).context("Failed to serialize the snapshot")?;
        utils::write(&path, json).await?;
        debug!("Saved snapshot to {}", path.display());

        self.rotate().await?;
        Ok(path)
    }

    /// The most recent snapshot file, if any.
    pub async fn latest_path(&self) -> Result<Option<PathBuf>> {
        let latest = self.snapshot_files().await?.pop();
        Ok(latest.map(|name| self.dir.join(name)))
    }

    /// Loads the most recent snapshot.
    pub async fn latest(&self) -> Result<Snapshot> {
        match self.latest_path().await? {
            Some(path) => self.load(&path).await,
            None => bail!(
                "No snapshot found in '{}', run `earnings fetch` first",
                self.dir.display()
            ),
        }
    }

    /// Loads the snapshot file at `path`.
    pub async fn load(&self, path: &Path) -> Result<Snapshot> {
        debug!("Loading snapshot from {}", path.display());
        utils::deserialize(path)
            .await
            .with_context(|| format!("Unable to load snapshot '{}'", path.display()))
    }

    /// Snapshot file names, oldest first, ordered by date and then sequence number.
    async fn snapshot_files(&self) -> Result<Vec<String>> {
        let mut files: Vec<(SnapshotName, String)> = utils::file_names(&self.dir)
            .await?
            .into_iter()
            .filter_map(|name| Some((SnapshotName::parse(&name)?, name)))
            .collect();
        files.sort();
        Ok(files.into_iter().map(|(_, name)| name).collect())
    }

    async fn next_sequence_number(&self, date: &str) -> Result<u32> {
        let max_seq = self
            .snapshot_files()
            .await?
            .iter()
            .filter_map(|name| parse_sequence_number(name, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Deletes the oldest files until at most `copies` remain. The newest file is always kept.
    async fn rotate(&self) -> Result<()> {
        let files = self.snapshot_files().await?;
        let to_delete = files.len().saturating_sub(self.copies.max(1) as usize);
        for name in files.into_iter().take(to_delete) {
            debug!("Rotating out snapshot {name}");
            utils::remove(self.dir.join(name)).await?;
        }
        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// The date and sequence number encoded in a snapshot file name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct SnapshotName {
    date: String,
    seq: u32,
}

impl SnapshotName {
    /// Parses `snapshot.YYYY-MM-DD-NNN.json`. Returns `None` for any other file name.
    fn parse(filename: &str) -> Option<Self> {
        let stem = filename
            .strip_prefix(&format!("{SNAPSHOT}."))?
            .strip_suffix(&format!(".{EXTENSION}"))?;
        let (date, seq) = stem.rsplit_once('-')?;
        Some(Self {
            date: date.to_string(),
            seq: seq.parse().ok()?,
        })
    }
}

/// Parses the sequence number from a snapshot file name written on `date`.
fn parse_sequence_number(filename: &str, date: &str) -> Option<u32> {
    SnapshotName::parse(filename)
        .filter(|name| name.date == date)
        .map(|name| name.seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateRange, Transaction};
    use tempfile::TempDir;

    async fn store(copies: u32) -> (TempDir, SnapshotStore) {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore {
            dir: dir.path().to_path_buf(),
            copies,
        };
        (dir, store)
    }

    fn snapshot(amount: i64) -> Snapshot {
        Snapshot::new(
            DateRange::calendar_year(2024).unwrap(),
            vec![Transaction::new(1, "lead", 10, Some(1), amount, Some("2024-01-15"))],
            vec![],
            vec![],
        )
    }

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("snapshot.2025-12-14-001.json", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("snapshot.2025-12-14-042.json", "2025-12-14"),
            Some(42)
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("snapshot.2025-12-13-001.json", "2025-12-14"),
            None
        );
        // Wrong extension
        assert_eq!(
            parse_sequence_number("snapshot.2025-12-14-001.bak", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_snapshot_name_parse() {
        assert_eq!(
            SnapshotName::parse("snapshot.2025-12-14-001.json"),
            Some(SnapshotName {
                date: "2025-12-14".to_string(),
                seq: 1
            })
        );
        assert!(SnapshotName::parse("config.json").is_none());
        assert!(SnapshotName::parse("snapshot.2025-12-14-001.json.tmp").is_none());
        assert!(SnapshotName::parse("snapshot.2025-12-14-abc.json").is_none());
    }

    #[tokio::test]
    async fn test_files_order_by_sequence_number_past_999() {
        let (_dir, store) = store(5).await;
        for name in [
            "snapshot.2025-12-14-999.json",
            "snapshot.2025-12-14-1000.json",
            "snapshot.2025-12-13-1200.json",
        ] {
            let json = serde_json::to_string(&snapshot(1)).unwrap();
            utils::write(store.dir().join(name), json).await.unwrap();
        }
        let files = store.snapshot_files().await.unwrap();
        assert_eq!(
            files,
            vec![
                "snapshot.2025-12-13-1200.json",
                "snapshot.2025-12-14-999.json",
                "snapshot.2025-12-14-1000.json",
            ]
        );
        assert_eq!(
            store.latest_path().await.unwrap().unwrap(),
            store.dir().join("snapshot.2025-12-14-1000.json")
        );
    }

    #[tokio::test]
    async fn test_zero_copies_keeps_the_saved_file() {
        let (_dir, store) = store(0).await;
        let first = store.save(&snapshot(1)).await.unwrap();
        let second = store.save(&snapshot(2)).await.unwrap();
        assert!(!first.exists());
        assert!(second.is_file());
        assert_eq!(store.latest_path().await.unwrap(), Some(second));
    }

    #[tokio::test]
    async fn test_latest_without_snapshots() {
        let (_dir, store) = store(5).await;
        let err = store.latest().await.unwrap_err();
        assert!(err.to_string().contains("earnings fetch"));
    }

    #[tokio::test]
    async fn test_save_then_latest() {
        let (_dir, store) = store(5).await;
        let first = store.save(&snapshot(1)).await.unwrap();
        let second = store.save(&snapshot(2)).await.unwrap();
        assert!(first.to_string_lossy().ends_with("-001.json"));
        assert!(second.to_string_lossy().ends_with("-002.json"));

        let latest = store.latest().await.unwrap();
        assert_eq!(latest, store.load(&second).await.unwrap());
        assert_eq!(latest.transactions()[0].amount().to_string(), "$2.00");
    }

    #[tokio::test]
    async fn test_rotation_keeps_newest() {
        let (_dir, store) = store(2).await;
        for i in 0..4 {
            store.save(&snapshot(i)).await.unwrap();
        }
        let files = store.snapshot_files().await.unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("-003.json"));
        assert!(files[1].ends_with("-004.json"));
    }
}
