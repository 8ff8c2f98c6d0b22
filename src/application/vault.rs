use crate::domain::ports::ClockArc;
use crate::domain::token::Token;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Generates and resolves reusable payment tokens.
///
/// Owns the token map exclusively. Tokens are immutable once minted and never
/// expire; the vault has no eviction policy.
#[derive(Clone)]
pub struct TokenVault {
    tokens: Arc<RwLock<HashMap<String, Token>>>,
    clock: ClockArc,
    sequence: Arc<AtomicU64>,
}

impl TokenVault {
    pub fn new(clock: ClockArc) -> Self {
        Self {
            tokens: Arc::new(RwLock::new(HashMap::new())),
            clock,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Mints a new token with a unique token string and subscription id,
    /// stores it, and returns it.
    pub async fn mint(&self) -> Token {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        let token = Token {
            subscription_id: format!("{}-{}", self.clock.now().timestamp_millis(), seq),
            token: Uuid::new_v4().simple().to_string(),
            tokenizer_code: "0".to_string(),
        };
        let mut tokens = self.tokens.write().await;
        tokens.insert(token.token.clone(), token.clone());
        token
    }

    /// Pure lookup by token string.
    pub async fn resolve(&self, token: &str) -> Option<Token> {
        let tokens = self.tokens.read().await;
        tokens.get(token).cloned()
    }
}
