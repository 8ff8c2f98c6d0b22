use super::transaction::Transaction;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::io;
use std::sync::Arc;

/// Round-trips the store's full map to a durable medium.
///
/// `load` never fails: a missing, empty, or malformed medium yields an empty
/// map (logged by the implementation). `save` fully overwrites the medium and
/// may block the calling context.
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn load(&self) -> HashMap<String, Transaction>;
    async fn save(&self, transactions: &HashMap<String, Transaction>) -> io::Result<()>;
}

/// Wall-clock abstraction, injectable for deterministic tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Uniform randomness in `[0, 1)`, injectable so outcome probability and
/// boundary behavior are deterministically testable.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

pub type PersistenceAdapterArc = Arc<dyn PersistenceAdapter>;
pub type ClockArc = Arc<dyn Clock>;
pub type RandomSourceArc = Arc<dyn RandomSource>;
