//! JSON file implementation of the unsubscribe store.
//!
//! # Purpose
//! Keeps the unsubscribe log in a single pretty-printed JSON document inside
//! the configured data directory. Every write rewrites the whole document.
//!
//! # Durability and consistency
//! - Writes go to a sibling `.tmp` file that is then renamed over the log, so
//!   readers see either the previous or the next complete document.
//! - `add` holds an in-process writer lock across load, lookup, append, and
//!   save. Two requests for the same new address therefore produce one record.
//! - Nothing coordinates separate processes pointed at the same directory.
//!
//! # Failure model
//! - `load` logs read and parse failures and returns an empty log.
//! - `add` only starts from an empty log when the file does not exist. A file
//!   that exists but cannot be read or decoded is left untouched and the
//!   error is returned.
//! - Write failures are logged and dropped; the in-flight record is lost.
use super::{AddOutcome, StoreConfig, StoreError, StoreResult, UnsubscribeStore, add_to_log};
use crate::model::UnsubscribeLog;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

pub struct JsonFileStore {
    /// Full path of `unsubscribe_log.json`.
    path: PathBuf,
    directory: PathBuf,
    /// Serializes load-modify-save sequences.
    writer: Mutex<()>,
}

impl JsonFileStore {
    /// Create the data directory if needed and bind the store to it.
    ///
    /// # Errors
    /// - `StoreError::Persistence` if the directory cannot be created.
    pub async fn open(config: StoreConfig) -> StoreResult<Self> {
        tokio::fs::create_dir_all(&config.directory)
            .await
            .map_err(|source| StoreError::Persistence {
                path: config.directory.clone(),
                source,
            })?;
        Ok(Self {
            path: config.log_path(),
            directory: config.directory,
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("json.tmp")
    }

    async fn read_log(&self) -> StoreResult<UnsubscribeLog> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(UnsubscribeLog::default());
            }
            Err(source) => {
                return Err(StoreError::Persistence {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        serde_json::from_str(&raw).map_err(StoreError::Decode)
    }

    async fn write_log(&self, log: &UnsubscribeLog) -> StoreResult<()> {
        let payload = serde_json::to_string_pretty(log).map_err(StoreError::Encode)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, payload)
            .await
            .map_err(|source| StoreError::Persistence {
                path: temp_path.clone(),
                source,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|source| StoreError::Persistence {
                path: self.path.clone(),
                source,
            })
    }

    async fn load_unlocked(&self) -> UnsubscribeLog {
        match self.read_log().await {
            Ok(log) => {
                metrics::gauge!("unsubscribe_records_total").set(log.len() as f64);
                log
            }
            Err(err) => {
                metrics::counter!("unsubscribe_persistence_errors_total", "op" => "load")
                    .increment(1);
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to read unsubscribe log; using empty log"
                );
                UnsubscribeLog::default()
            }
        }
    }

    async fn save_unlocked(&self, log: &UnsubscribeLog) {
        match self.write_log(log).await {
            Ok(()) => {
                metrics::gauge!("unsubscribe_records_total").set(log.len() as f64);
            }
            Err(err) => {
                metrics::counter!("unsubscribe_persistence_errors_total", "op" => "save")
                    .increment(1);
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "failed to save unsubscribe log"
                );
            }
        }
    }
}

#[async_trait]
impl UnsubscribeStore for JsonFileStore {
    async fn load(&self) -> UnsubscribeLog {
        self.load_unlocked().await
    }

    async fn save(&self, log: &UnsubscribeLog) {
        let _guard = self.writer.lock().await;
        self.save_unlocked(log).await;
    }

    async fn add(&self, email: &str) -> StoreResult<AddOutcome> {
        let _guard = self.writer.lock().await;
        let mut log = match self.read_log().await {
            Ok(log) => log,
            Err(err) => {
                metrics::counter!("unsubscribe_persistence_errors_total", "op" => "load")
                    .increment(1);
                tracing::error!(
                    path = %self.path.display(),
                    error = %err,
                    "unsubscribe log unreadable; refusing to overwrite"
                );
                return Err(err);
            }
        };
        let outcome = add_to_log(&mut log, email);
        if outcome.added {
            self.save_unlocked(&log).await;
        }
        Ok(outcome)
    }

    async fn health_check(&self) -> StoreResult<()> {
        let metadata = tokio::fs::metadata(&self.directory)
            .await
            .map_err(|source| StoreError::Persistence {
                path: self.directory.clone(),
                source,
            })?;
        if !metadata.is_dir() {
            return Err(StoreError::Unexpected(anyhow::anyhow!(
                "data path {} is not a directory",
                self.directory.display()
            )));
        }
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    async fn open_in(dir: &Path) -> JsonFileStore {
        JsonFileStore::open(StoreConfig {
            directory: dir.to_path_buf(),
        })
        .await
        .expect("open store")
    }

    #[tokio::test]
    async fn open_creates_nested_directory() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let nested = tmp.path().join("a").join("b");
        let store = open_in(&nested).await;
        assert!(nested.is_dir());
        assert_eq!(store.path(), nested.join("unsubscribe_log.json"));
        store.health_check().await.expect("healthy");
    }

    #[tokio::test]
    async fn open_fails_when_directory_is_a_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let blocker = tmp.path().join("blocker");
        std::fs::write(&blocker, b"x").expect("write blocker");
        let err = JsonFileStore::open(StoreConfig {
            directory: blocker.join("data"),
        })
        .await
        .err()
        .expect("open should fail");
        assert!(matches!(err, StoreError::Persistence { .. }));
    }

    #[tokio::test]
    async fn load_without_file_returns_empty_log() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;
        let log = store.load().await;
        assert_eq!(log, UnsubscribeLog::default());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn load_fails_open_on_corrupt_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;
        std::fs::write(store.path(), b"{ not json").expect("write corrupt");
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn add_is_idempotent_and_case_insensitive() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;

        let first = store.add("a@x.com").await.expect("add");
        assert!(first.added);
        let second = store.add("a@x.com").await.expect("add");
        assert!(!second.added);
        let third = store.add("A@X.com").await.expect("add");
        assert!(!third.added);
        assert_eq!(third.record.email, "a@x.com");

        let log = store.load().await;
        assert_eq!(log.len(), 1);
        assert_eq!(log.unsubscribed[0], first.record);
    }

    #[tokio::test]
    async fn add_persists_pretty_json() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;
        store.add("test@example.com").await.expect("add");

        let raw = std::fs::read_to_string(store.path()).expect("read");
        assert!(raw.contains("\n  \"unsubscribed\""));
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["unsubscribed"][0]["email"], "test@example.com");
        assert!(value["unsubscribed"][0]["timestamp"].is_string());
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn save_of_load_keeps_document() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;
        let raw = r#"{"unsubscribed":[
            {"email":"Z@x.com","timestamp":"2024-05-01T10:00:00.000Z"},
            {"email":"a@x.com","timestamp":"2023-01-01T00:00:00Z"}
        ]}"#;
        std::fs::write(store.path(), raw).expect("seed");

        let before = store.load().await;
        store.save(&before).await;
        let after = store.load().await;
        assert_eq!(before, after);
        assert_eq!(after.unsubscribed[0].email, "Z@x.com");
        assert_eq!(
            after.unsubscribed[1].timestamp_str(),
            Some("2023-01-01T00:00:00Z")
        );
    }

    #[tokio::test]
    async fn add_keeps_off_schema_records_and_unknown_keys() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;
        let raw = r#"{
  "version": 1,
  "unsubscribed": [
    { "email": "keep1@x.com", "timestamp": "2024-01-01T00:00:00.000Z" },
    { "email": "legacy@x.com" },
    { "email": "keep2@x.com", "timestamp": 1700000000, "source": "admin" }
  ]
}"#;
        std::fs::write(store.path(), raw).expect("seed");

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 3);
        assert_eq!(loaded.extra["version"], 1);

        let duplicate = store.add("KEEP1@x.com").await.expect("add");
        assert!(!duplicate.added);
        assert_eq!(std::fs::read_to_string(store.path()).expect("read"), raw);

        let added = store.add("new@x.com").await.expect("add");
        assert!(added.added);
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(store.path()).expect("read"))
                .expect("json");
        assert_eq!(value["version"], 1);
        let records = value["unsubscribed"].as_array().expect("array");
        assert_eq!(records.len(), 4);
        assert_eq!(records[1], serde_json::json!({ "email": "legacy@x.com" }));
        assert_eq!(records[2]["timestamp"], 1700000000);
        assert_eq!(records[2]["source"], "admin");
        assert_eq!(records[3]["email"], "new@x.com");
    }

    #[tokio::test]
    async fn add_refuses_to_overwrite_undecodable_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;
        let raw = r#"{"unsubscribed":[{"address":"old@x.com"}]}"#;
        std::fs::write(store.path(), raw).expect("seed");

        let err = store.add("new@x.com").await.err().expect("add should fail");
        assert!(matches!(err, StoreError::Decode(_)));
        assert_eq!(std::fs::read_to_string(store.path()).expect("read"), raw);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn add_refuses_to_overwrite_corrupt_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = open_in(tmp.path()).await;
        std::fs::write(store.path(), b"{ not json").expect("write corrupt");

        assert!(store.add("new@x.com").await.is_err());
        assert_eq!(std::fs::read(store.path()).expect("read"), b"{ not json");
    }

    #[tokio::test]
    async fn save_failure_is_swallowed() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("data");
        let store = open_in(&dir).await;
        std::fs::remove_dir_all(&dir).expect("remove data dir");

        let outcome = store.add("lost@example.com").await.expect("add");
        assert!(outcome.added);
        assert!(store.load().await.is_empty());
        assert!(store.health_check().await.is_err());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_duplicate_adds_record_once() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store = Arc::new(open_in(tmp.path()).await);

        let mut handles = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let email = if i % 2 == 0 { "race@x.com" } else { "RACE@x.com" };
            handles.push(tokio::spawn(async move { store.add(email).await }));
        }
        let mut added = 0;
        for handle in handles {
            if handle.await.expect("join").expect("add").added {
                added += 1;
            }
        }
        assert_eq!(added, 1);
        assert_eq!(store.load().await.len(), 1);
    }
}
