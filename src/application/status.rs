use crate::application::lifecycle::TransactionLifecycle;
use crate::application::store::TransactionStore;
use crate::domain::codes;
use crate::domain::ports::{ClockArc, RandomSourceArc};
use crate::domain::transaction::{DeviceType, Transaction, TransactionPatch, TransactionStatus};
use crate::error::{DatafonoError, Result};

/// Polls past this count force-complete the transaction with a timeout
/// result, bounding how long a caller can be kept waiting.
pub const MAX_POLL_ATTEMPTS: u32 = 20;

/// Probability that a WIFI status poll fails with a transient network error.
const WIFI_FLAKE_PROBABILITY: f64 = 0.1;

/// Read path that advances lifecycle state lazily when queried.
#[derive(Clone)]
pub struct StatusResolver {
    store: TransactionStore,
    lifecycle: TransactionLifecycle,
    clock: ClockArc,
    random: RandomSourceArc,
}

impl StatusResolver {
    pub fn new(
        store: TransactionStore,
        lifecycle: TransactionLifecycle,
        clock: ClockArc,
        random: RandomSourceArc,
    ) -> Self {
        Self {
            store,
            lifecycle,
            clock,
            random,
        }
    }

    /// Current state of a transaction, advancing it if its simulated
    /// processing window has elapsed.
    ///
    /// WIFI polls fail with `TransientNetwork` ~10% of the time; that path
    /// never mutates stored state. Terminal transactions are returned as
    /// stored, without redrawing the outcome.
    pub async fn status(&self, order_id: &str) -> Result<Transaction> {
        let tx = self
            .store
            .get(order_id)
            .await
            .ok_or_else(|| DatafonoError::NotFound(order_id.to_string()))?;

        if tx.device_type == DeviceType::Wifi
            && self.random.next_f64() < WIFI_FLAKE_PROBABILITY
        {
            tracing::debug!(order_id, "simulated network error on status poll");
            return Err(DatafonoError::TransientNetwork);
        }

        if tx.status.is_terminal() {
            return Ok(tx);
        }

        let attempts = tx.attempts + 1;
        if attempts > MAX_POLL_ATTEMPTS {
            // Only the driver still holding a pending transaction may time it
            // out; losing the claim means someone else is already finishing.
            if self.store.claim_if_pending(order_id).await.is_some() {
                let patch = TransactionPatch {
                    status: Some(TransactionStatus::Error),
                    result_code: Some(codes::OPERATION_TIMEOUT),
                    result_message: Some(codes::message(codes::OPERATION_TIMEOUT).to_string()),
                    attempts: Some(attempts),
                    ..Default::default()
                };
                self.store.update(order_id, patch).await;
                tracing::debug!(order_id, attempts, "transaction timed out after polling cap");
            }
            return self
                .store
                .get(order_id)
                .await
                .ok_or_else(|| DatafonoError::NotFound(order_id.to_string()));
        }

        self.store
            .update(
                order_id,
                TransactionPatch {
                    attempts: Some(attempts),
                    ..Default::default()
                },
            )
            .await;

        if self.clock.now() >= tx.processing_end_time
            && let Some(resolved) = self.lifecycle.resolve_now(order_id).await?
        {
            return Ok(resolved);
        }

        self.store
            .get(order_id)
            .await
            .ok_or_else(|| DatafonoError::NotFound(order_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::lifecycle::{DriverMode, TransactionRequest};
    use crate::application::vault::TokenVault;
    use crate::domain::ports::PersistenceAdapterArc;
    use crate::infrastructure::clock::ManualClock;
    use crate::infrastructure::in_memory::InMemoryAdapter;
    use crate::infrastructure::random::ScriptedSource;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct Harness {
        resolver: StatusResolver,
        lifecycle: TransactionLifecycle,
        clock: Arc<ManualClock>,
    }

    async fn harness(random: Arc<ScriptedSource>) -> Harness {
        let adapter: PersistenceAdapterArc = Arc::new(InMemoryAdapter::new());
        let store = TransactionStore::open(adapter).await;
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2023, 1, 1, 10, 0, 0).unwrap(),
        ));
        let vault = TokenVault::new(clock.clone());
        let lifecycle = TransactionLifecycle::new(
            store.clone(),
            vault,
            clock.clone(),
            random.clone(),
            DriverMode::Lazy,
        );
        let resolver = StatusResolver::new(store, lifecycle.clone(), clock.clone(), random);
        Harness {
            resolver,
            lifecycle,
            clock,
        }
    }

    fn cable_request(order_id: &str) -> TransactionRequest {
        TransactionRequest {
            order_id: order_id.into(),
            amount: dec!(10),
            device_type: Some(crate::domain::transaction::DeviceType::Cable),
            tokenization: None,
            transaction_id: None,
        }
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let h = harness(Arc::new(ScriptedSource::constant(0.5))).await;
        assert!(matches!(
            h.resolver.status("GHOST").await,
            Err(DatafonoError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_pending_before_end_time_stays_pending() {
        // creation draw 0.5 -> cable 2000ms
        let h = harness(Arc::new(ScriptedSource::new([0.5], 0.5))).await;
        h.lifecycle
            .create_payment(cable_request("ORDER1"))
            .await
            .unwrap();

        let tx = h.resolver.status("ORDER1").await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.result_code, codes::SERVICE_BUSY);
        assert_eq!(tx.attempts, 1);
    }

    #[tokio::test]
    async fn test_lazy_resolution_past_end_time() {
        // creation 0.5 -> 2000ms; success draw 0.1 -> approved
        let h = harness(Arc::new(ScriptedSource::new([0.5, 0.1], 0.5))).await;
        h.lifecycle
            .create_payment(cable_request("ORDER1"))
            .await
            .unwrap();

        h.clock.advance(Duration::milliseconds(2000));
        let tx = h.resolver.status("ORDER1").await.unwrap();
        assert!(tx.status.is_terminal());
        assert_eq!(tx.status, TransactionStatus::Approved);

        // Terminal state is stable across repeated polls
        let again = h.resolver.status("ORDER1").await.unwrap();
        assert_eq!(again, tx);
    }

    #[tokio::test]
    async fn test_attempt_cap_forces_timeout() {
        let h = harness(Arc::new(ScriptedSource::new([0.5], 0.5))).await;
        h.lifecycle
            .create_payment(cable_request("ORDER1"))
            .await
            .unwrap();

        // Clock never reaches the end time, so every poll stays pending
        for _ in 0..MAX_POLL_ATTEMPTS {
            let tx = h.resolver.status("ORDER1").await.unwrap();
            assert!(!tx.status.is_terminal());
        }

        let tx = h.resolver.status("ORDER1").await.unwrap();
        assert_eq!(tx.status, TransactionStatus::Error);
        assert_eq!(tx.result_code, codes::OPERATION_TIMEOUT);
    }

    #[tokio::test]
    async fn test_wifi_poll_can_flake_without_mutating_state() {
        // creation 0.5 (wifi 4000ms); first poll flake draw 0.05 < 0.1
        let h = harness(Arc::new(ScriptedSource::new([0.5, 0.05], 0.5))).await;
        let mut req = cable_request("ORDER1");
        req.device_type = None; // defaults to WIFI
        h.lifecycle.create_payment(req).await.unwrap();

        assert!(matches!(
            h.resolver.status("ORDER1").await,
            Err(DatafonoError::TransientNetwork)
        ));
        // The failed read did not touch the transaction
        let tx = h.resolver.status("ORDER1").await.unwrap();
        assert_eq!(tx.attempts, 1);
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_cable_polls_never_flake() {
        // Fallback draw 0.05 would flake a WIFI poll; cable ignores it
        let h = harness(Arc::new(ScriptedSource::new([0.5], 0.05))).await;
        h.lifecycle
            .create_payment(cable_request("ORDER1"))
            .await
            .unwrap();
        assert!(h.resolver.status("ORDER1").await.is_ok());
    }
}
