use crate::application::store::TransactionStore;
use crate::application::vault::TokenVault;
use crate::domain::codes;
use crate::domain::ports::{ClockArc, RandomSourceArc};
use crate::domain::transaction::{
    DeviceType, Ticket, Tokenization, Transaction, TransactionPatch, TransactionStatus,
    TransactionType,
};
use crate::error::{DatafonoError, Result};
use chrono::Duration;
use rust_decimal::Decimal;
use uuid::Uuid;

/// Probability that a resolution draw succeeds.
const SUCCESS_PROBABILITY: f64 = 0.9;

/// How the state machine is advanced: by a background timer per transaction,
/// or lazily the first time status is queried past `processing_end_time`.
/// The lazy read-path advance stays active in both modes; the store's claim
/// makes whichever driver fires first the only one to apply an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DriverMode {
    Timer,
    #[default]
    Lazy,
}

/// Parameters for creating a transaction, already parsed and validated by
/// the transport layer.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub order_id: String,
    pub amount: Decimal,
    pub device_type: Option<DeviceType>,
    pub tokenization: Option<Tokenization>,
    /// Reference to the original transaction; required for refunds.
    pub transaction_id: Option<String>,
}

/// The state machine governing pending → processing → terminal transitions,
/// including the randomized outcome and delay policy.
#[derive(Clone)]
pub struct TransactionLifecycle {
    store: TransactionStore,
    vault: TokenVault,
    clock: ClockArc,
    random: RandomSourceArc,
    driver: DriverMode,
}

impl TransactionLifecycle {
    pub fn new(
        store: TransactionStore,
        vault: TokenVault,
        clock: ClockArc,
        random: RandomSourceArc,
        driver: DriverMode,
    ) -> Self {
        Self {
            store,
            vault,
            clock,
            random,
            driver,
        }
    }

    /// Simulated processing duration in milliseconds, uniform over the
    /// device's range: WIFI [2000, 6000), CABLE and anything unrecognized
    /// [1000, 3000).
    pub fn processing_time(&self, device_type: DeviceType) -> u64 {
        let draw = self.random.next_f64();
        match device_type {
            DeviceType::Wifi => 2000 + (draw * 4000.0) as u64,
            DeviceType::Cable => 1000 + (draw * 2000.0) as u64,
        }
    }

    /// Creates a pending payment transaction.
    pub async fn create_payment(&self, request: TransactionRequest) -> Result<Transaction> {
        self.create(request, TransactionType::Payment).await
    }

    /// Creates a pending preauthorization. The simulated device handles one
    /// in-flight preauth at a time: rejected with `DeviceBusy` while any
    /// transaction is still pending.
    pub async fn create_preauth(&self, request: TransactionRequest) -> Result<Transaction> {
        if self.store.is_busy().await {
            return Err(DatafonoError::DeviceBusy);
        }
        self.create(request, TransactionType::Preauth).await
    }

    /// Creates a pending refund pointing at an original transaction.
    pub async fn create_refund(&self, request: TransactionRequest) -> Result<Transaction> {
        if request
            .transaction_id
            .as_deref()
            .is_none_or(|id| id.is_empty())
        {
            return Err(DatafonoError::InvalidRequest(
                "refund requires a transactionId".into(),
            ));
        }
        self.create(request, TransactionType::Refund).await
    }

    /// Completes an approved preauthorization: re-types it and settles the
    /// final amount. The original must exist, be a preauth, and be approved.
    pub async fn complete_preauth(&self, order_id: &str, amount: Decimal) -> Result<Transaction> {
        let tx = self
            .store
            .get(order_id)
            .await
            .ok_or_else(|| DatafonoError::NotFound(order_id.to_string()))?;

        if tx.r#type != Some(TransactionType::Preauth) {
            return Err(DatafonoError::InvalidParams(
                "transaction is not a preauthorization".into(),
            ));
        }
        if tx.status != TransactionStatus::Approved {
            return Err(DatafonoError::NotAllowed(
                "preauthorization is not approved".into(),
            ));
        }

        let patch = TransactionPatch {
            amount: Some(amount),
            r#type: Some(TransactionType::PreauthComplete),
            status: Some(TransactionStatus::Approved),
            result_code: Some(codes::SUCCESS),
            result_message: Some(codes::message(codes::SUCCESS).to_string()),
            ..Default::default()
        };
        self.store.update(order_id, patch).await;
        self.store
            .get(order_id)
            .await
            .ok_or_else(|| DatafonoError::NotFound(order_id.to_string()))
    }

    async fn create(
        &self,
        request: TransactionRequest,
        tx_type: TransactionType,
    ) -> Result<Transaction> {
        if request.amount <= Decimal::ZERO {
            return Err(DatafonoError::InvalidRequest(
                "amount must be positive".into(),
            ));
        }

        let device_type = request.device_type.unwrap_or_default();
        let processing_time = self.processing_time(device_type);
        let now = self.clock.now();

        let tx = Transaction {
            id: format!("TX{}", Uuid::new_v4().simple()),
            order_id: request.order_id,
            transaction_id: request.transaction_id,
            amount: request.amount,
            currency: "EUR".to_string(),
            device_type,
            r#type: Some(tx_type),
            status: TransactionStatus::Pending,
            result_code: codes::SERVICE_BUSY,
            result_message: codes::message(codes::SERVICE_BUSY).to_string(),
            timestamp: now,
            processing_time,
            processing_end_time: now + Duration::milliseconds(processing_time as i64),
            tokenization: request.tokenization,
            ticket: None,
            auth_code: None,
            attempts: 0,
        };
        self.store.add(tx.clone()).await?;

        if self.driver == DriverMode::Timer {
            self.spawn_timer(tx.order_id.clone(), processing_time);
        }

        tracing::debug!(
            order_id = %tx.order_id,
            device = ?tx.device_type,
            processing_time_ms = processing_time,
            "transaction created"
        );
        Ok(tx)
    }

    fn spawn_timer(&self, order_id: String, delay_ms: u64) {
        let lifecycle = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(delay_ms)).await;
            // The transaction may have been resolved or removed meanwhile;
            // both are no-ops inside resolve_now.
            if let Err(e) = lifecycle.resolve_now(&order_id).await {
                tracing::warn!(order_id, error = %e, "background resolution failed");
            }
        });
    }

    /// Applies the terminal outcome to a pending transaction, exactly once.
    ///
    /// Usable both from a timer callback and from the status read path; the
    /// store's pending → processing claim guarantees a single apply even when
    /// drivers race, so tokens are never double-minted. Returns the current
    /// state of the transaction, or `None` if it does not exist.
    pub async fn resolve_now(&self, order_id: &str) -> Result<Option<Transaction>> {
        let Some(claimed) = self.store.claim_if_pending(order_id).await else {
            // Lost the claim, already terminal, or gone entirely.
            return Ok(self.store.get(order_id).await);
        };

        // A referenced token must exist in the vault; a missing one is a
        // hard failure, not subject to the success probability.
        let mut resolved_token = None;
        if let Some(tokenization) = &claimed.tokenization
            && tokenization.create_token != Some(true)
            && let Some(token_str) = &tokenization.token
        {
            match self.vault.resolve(token_str).await {
                Some(token) => resolved_token = Some(token),
                None => {
                    tracing::debug!(order_id, "declined: unknown token");
                    let patch = TransactionPatch {
                        status: Some(TransactionStatus::Declined),
                        result_code: Some(codes::DECLINED),
                        result_message: Some("Invalid token".to_string()),
                        ..Default::default()
                    };
                    self.store.update(order_id, patch).await;
                    return Ok(self.store.get(order_id).await);
                }
            }
        }

        let success = self.random.next_f64() < SUCCESS_PROBABILITY;
        let patch = if success {
            let mut tokenization = claimed.tokenization.clone();
            if let Some(t) = tokenization.as_mut() {
                let token = match t.create_token {
                    // Mint exactly one new token for this transaction.
                    Some(true) => Some(self.vault.mint().await),
                    _ => resolved_token,
                };
                if let Some(token) = token {
                    t.subscription_id = Some(token.subscription_id);
                    t.token = Some(token.token);
                    t.tokenizer_code = Some(token.tokenizer_code);
                }
            }

            let ticket = self.create_ticket(&claimed);
            let auth_code = ticket.authorization.clone();
            TransactionPatch {
                status: Some(TransactionStatus::Approved),
                result_code: Some(codes::SUCCESS),
                result_message: Some(codes::message(codes::SUCCESS).to_string()),
                ticket: Some(ticket),
                tokenization,
                auth_code: Some(auth_code),
                ..Default::default()
            }
        } else {
            let code = if claimed.r#type == Some(TransactionType::Refund) {
                codes::REFUND_NOT_ALLOWED
            } else {
                codes::DECLINED
            };
            TransactionPatch {
                status: Some(TransactionStatus::Declined),
                result_code: Some(code),
                result_message: Some(codes::message(code).to_string()),
                ..Default::default()
            }
        };

        self.store.update(order_id, patch).await;
        tracing::debug!(order_id, success, "transaction resolved");
        Ok(self.store.get(order_id).await)
    }

    fn draw_digits(&self, width: usize, bound: u32) -> String {
        let n = (self.random.next_f64() * bound as f64) as u32;
        format!("{n:0width$}")
    }

    /// Synthesizes the receipt record attached to a successful completion.
    /// Fixed issuer/bank test fixtures; amount in currency minor units.
    fn create_ticket(&self, tx: &Transaction) -> Ticket {
        let now = self.clock.now();
        let ticket_type = match tx.r#type {
            Some(TransactionType::Refund) => "Refund",
            Some(TransactionType::Preauth) | Some(TransactionType::PreauthComplete) => {
                "Preauthorization"
            }
            _ => "Payment",
        };
        Ticket {
            aid: "A0000000031010".to_string(),
            arc: "00".to_string(),
            atc: self.draw_digits(5, 10_000),
            psn: "01".to_string(),
            amount: (tx.amount * Decimal::from(100))
                .round_dp(0)
                .normalize()
                .to_string(),
            authorization: self.draw_digits(6, 1_000_000),
            card_bank: "Comercia Global Payments".to_string(),
            card_holder: String::new(),
            card_issuer: "VISA CLASICA".to_string(),
            card_number: "************2825".to_string(),
            card_technology: 1,
            card_type: String::new(),
            currency: tx.currency.clone(),
            date: now.format("%Y%m%d").to_string(),
            id: ((self.random.next_f64() * 1_000_000.0) as u32).to_string(),
            language: "es".to_string(),
            location: "BARCELONA".to_string(),
            merchant_id: "329811087".to_string(),
            merchant_name: "Comercia Global Payments PRUEBAS".to_string(),
            pin_indicator: 1,
            signature_indicator: 0,
            status: "0".to_string(),
            terminal_id: "00000021".to_string(),
            time: now.format("%H%M").to_string(),
            ticket_type: ticket_type.to_string(),
        }
    }
}
