//! Unsubscribe record storage.
//!
//! # Purpose
//! Defines the store trait shared by the JSON file backend and the in-memory
//! backend, plus the error and configuration types they use.
//!
//! # Key invariants
//! - No two records in a log compare equal under case-insensitive email
//!   matching.
//! - `load` and `save` fail open: persistence errors are logged by the backend
//!   and never reach the caller.
use crate::model::{UnsubscribeLog, UnsubscribeRecord};
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

pub mod file;
pub mod memory;

/// Name of the backing document inside the data directory.
pub const LOG_FILE_NAME: &str = "unsubscribe_log.json";

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub directory: PathBuf,
}

impl StoreConfig {
    pub fn log_path(&self) -> PathBuf {
        self.directory.join(LOG_FILE_NAME)
    }
}

/// Result of an `add` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOutcome {
    /// `false` when the address was already present.
    pub added: bool,
    /// The new record, or the existing one when `added` is false.
    pub record: UnsubscribeRecord,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("persistence failure at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("encode unsubscribe log: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("decode unsubscribe log: {0}")]
    Decode(#[source] serde_json::Error),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UnsubscribeStore: Send + Sync {
    /// Read the full document; an unreadable or missing document yields an
    /// empty log.
    async fn load(&self) -> UnsubscribeLog;
    /// Overwrite the full document; failures are logged, not returned.
    async fn save(&self, log: &UnsubscribeLog);
    /// Idempotently record `email`.
    async fn add(&self, email: &str) -> StoreResult<AddOutcome>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

/// Shared lookup-or-append step used by every backend under its writer lock.
pub(crate) fn add_to_log(log: &mut UnsubscribeLog, email: &str) -> AddOutcome {
    if let Some(existing) = log.find(email) {
        return AddOutcome {
            added: false,
            record: existing.clone(),
        };
    }
    let record = UnsubscribeRecord::new(email);
    log.unsubscribed.push(record.clone());
    AddOutcome {
        added: true,
        record,
    }
}
