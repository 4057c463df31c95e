//! In-memory implementation of the unsubscribe store.
//!
//! # Purpose
//! Holds the unsubscribe log in a `tokio::sync::RwLock` for local development
//! and tests where nothing should touch the filesystem.
//!
//! # Durability
//! Not durable: the log is lost on restart.
use super::{AddOutcome, StoreResult, UnsubscribeStore, add_to_log};
use crate::model::UnsubscribeLog;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default, Clone)]
pub struct InMemoryStore {
    log: Arc<RwLock<UnsubscribeLog>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: UnsubscribeLog) -> Self {
        Self {
            log: Arc::new(RwLock::new(log)),
        }
    }
}

#[async_trait]
impl UnsubscribeStore for InMemoryStore {
    async fn load(&self) -> UnsubscribeLog {
        self.log.read().await.clone()
    }

    async fn save(&self, log: &UnsubscribeLog) {
        *self.log.write().await = log.clone();
        metrics::gauge!("unsubscribe_records_total").set(log.len() as f64);
    }

    async fn add(&self, email: &str) -> StoreResult<AddOutcome> {
        let mut log = self.log.write().await;
        let outcome = add_to_log(&mut log, email);
        metrics::gauge!("unsubscribe_records_total").set(log.len() as f64);
        Ok(outcome)
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
