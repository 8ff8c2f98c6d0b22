use crate::domain::ports::PersistenceAdapterArc;
use crate::domain::transaction::{Transaction, TransactionPatch, TransactionStatus};
use crate::error::{DatafonoError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Durable keyed collection of transactions.
///
/// Owns the `orderId -> Transaction` map exclusively; all mutation goes
/// through `add`/`update`. Every successful mutation persists the entire map
/// through the adapter before returning, so a crash between calls never loses
/// more than the latest not-yet-returned mutation. Save failures are logged
/// and swallowed (best-effort durability).
#[derive(Clone)]
pub struct TransactionStore {
    transactions: Arc<RwLock<HashMap<String, Transaction>>>,
    adapter: PersistenceAdapterArc,
}

impl TransactionStore {
    /// Loads the full map from the adapter. A missing or unreadable medium
    /// yields an empty store rather than a startup failure.
    pub async fn open(adapter: PersistenceAdapterArc) -> Self {
        let transactions = adapter.load().await;
        Self {
            transactions: Arc::new(RwLock::new(transactions)),
            adapter,
        }
    }

    async fn persist(&self, transactions: &HashMap<String, Transaction>) {
        // The processing claim is transient; on the medium it is still pending,
        // so a restart always re-reads claimed rows as resolvable.
        let mut snapshot = transactions.clone();
        for tx in snapshot.values_mut() {
            if tx.status == TransactionStatus::Processing {
                tx.status = TransactionStatus::Pending;
            }
        }
        if let Err(e) = self.adapter.save(&snapshot).await {
            tracing::warn!(error = %e, "failed to persist transaction store");
        }
    }

    /// Inserts or overwrites by `orderId` (last-write-wins), then persists.
    /// Rejects transactions without an `orderId` before touching the map.
    pub async fn add(&self, tx: Transaction) -> Result<()> {
        if tx.order_id.is_empty() {
            return Err(DatafonoError::InvalidTransaction);
        }
        let mut transactions = self.transactions.write().await;
        transactions.insert(tx.order_id.clone(), tx);
        self.persist(&transactions).await;
        Ok(())
    }

    pub async fn get(&self, order_id: &str) -> Option<Transaction> {
        let transactions = self.transactions.read().await;
        transactions.get(order_id).cloned()
    }

    /// Full snapshot; mutation must go through `update`.
    pub async fn all(&self) -> Vec<Transaction> {
        let transactions = self.transactions.read().await;
        transactions.values().cloned().collect()
    }

    /// Merges the patch into an existing transaction and persists. A no-op
    /// returning `false` (no persistence call) when `orderId` is absent.
    pub async fn update(&self, order_id: &str, patch: TransactionPatch) -> bool {
        let mut transactions = self.transactions.write().await;
        let Some(tx) = transactions.get_mut(order_id) else {
            return false;
        };
        patch.apply(tx);
        self.persist(&transactions).await;
        true
    }

    /// The transaction with the maximum timestamp, if any. Ties go to the
    /// first one found; timestamps carry millisecond resolution.
    pub async fn latest(&self) -> Option<Transaction> {
        let transactions = self.transactions.read().await;
        transactions
            .values()
            .max_by_key(|tx| tx.timestamp)
            .cloned()
    }

    /// True iff at least one stored transaction is still in flight.
    pub async fn is_busy(&self) -> bool {
        let transactions = self.transactions.read().await;
        transactions.values().any(|tx| !tx.status.is_terminal())
    }

    /// Compare-and-set claim for resolution: transitions `pending` to
    /// `processing` and returns the claimed snapshot, or `None` when the
    /// transaction is absent or already claimed/terminal. The claim is kept
    /// in memory only; a crash before the terminal update re-loads the row
    /// as `pending`, so racing drivers apply at most one outcome.
    pub async fn claim_if_pending(&self, order_id: &str) -> Option<Transaction> {
        let mut transactions = self.transactions.write().await;
        let tx = transactions.get_mut(order_id)?;
        if tx.status != TransactionStatus::Pending {
            return None;
        }
        tx.status = TransactionStatus::Processing;
        Some(tx.clone())
    }
}
