use crate::domain::ports::PersistenceAdapter;
use crate::domain::transaction::Transaction;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A persistence adapter that keeps the document in memory.
///
/// Used when the server runs without a store file, and by tests that need to
/// observe what the store persisted.
#[derive(Default, Clone)]
pub struct InMemoryAdapter {
    document: Arc<RwLock<HashMap<String, Transaction>>>,
}

impl InMemoryAdapter {
    /// Creates a new, empty adapter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the adapter with an existing document.
    pub fn with_document(document: HashMap<String, Transaction>) -> Self {
        Self {
            document: Arc::new(RwLock::new(document)),
        }
    }

    /// Snapshot of the last saved document.
    pub async fn document(&self) -> HashMap<String, Transaction> {
        self.document.read().await.clone()
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryAdapter {
    async fn load(&self) -> HashMap<String, Transaction> {
        self.document.read().await.clone()
    }

    async fn save(&self, transactions: &HashMap<String, Transaction>) -> io::Result<()> {
        let mut document = self.document.write().await;
        *document = transactions.clone();
        Ok(())
    }
}
