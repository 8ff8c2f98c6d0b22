use crate::domain::ports::PersistenceAdapter;
use crate::domain::transaction::Transaction;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// Persists the store as a single pretty-printed JSON object mapping
/// `orderId` to transaction.
///
/// Saves go through a temp file in the same directory followed by a rename,
/// so a concurrent reader never observes a half-written document.
#[derive(Clone)]
pub struct JsonFileAdapter {
    path: PathBuf,
}

impl JsonFileAdapter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PersistenceAdapter for JsonFileAdapter {
    async fn load(&self) -> HashMap<String, Transaction> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return HashMap::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read store file");
                return HashMap::new();
            }
        };
        if data.trim().is_empty() {
            return HashMap::new();
        }
        match serde_json::from_str(&data) {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "malformed store file, starting empty");
                HashMap::new()
            }
        }
    }

    async fn save(&self, transactions: &HashMap<String, Transaction>) -> io::Result<()> {
        let data = serde_json::to_string_pretty(transactions)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
