use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Physical link of the simulated terminal. Selects the timing distribution;
/// anything unrecognized on the wire falls back to `Cable`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum DeviceType {
    #[default]
    Wifi,
    #[serde(other)]
    Cable,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Payment,
    Preauth,
    PreauthComplete,
    Refund,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    #[default]
    Pending,
    /// Transient claim state while a driver applies the outcome. Never persisted.
    Processing,
    Approved,
    Declined,
    Error,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionStatus::Approved | TransactionStatus::Declined | TransactionStatus::Error
        )
    }
}

/// Either a request to mint a token (`create_token`) or a reference to an
/// existing one (`token`). The vault is always consulted by value.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Tokenization {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_token: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code_of_use: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenizer_code: Option<String>,
}

/// Receipt-like record populated only on successful completion. Field names
/// follow the terminal's wire format.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
pub struct Ticket {
    #[serde(rename = "AID")]
    pub aid: String,
    #[serde(rename = "ARC")]
    pub arc: String,
    #[serde(rename = "ATC")]
    pub atc: String,
    #[serde(rename = "PSN")]
    pub psn: String,
    #[serde(rename = "Amount")]
    pub amount: String,
    #[serde(rename = "Authorization")]
    pub authorization: String,
    #[serde(rename = "CardBank")]
    pub card_bank: String,
    #[serde(rename = "CardHolder")]
    pub card_holder: String,
    #[serde(rename = "CardIssuer")]
    pub card_issuer: String,
    #[serde(rename = "CardNumber")]
    pub card_number: String,
    #[serde(rename = "CardTechnology")]
    pub card_technology: u8,
    #[serde(rename = "CardType")]
    pub card_type: String,
    #[serde(rename = "Currency")]
    pub currency: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Language")]
    pub language: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "MerchantId")]
    pub merchant_id: String,
    #[serde(rename = "MerchantName")]
    pub merchant_name: String,
    #[serde(rename = "PinIndicator")]
    pub pin_indicator: u8,
    #[serde(rename = "SignatureIndicator")]
    pub signature_indicator: u8,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "TerminalId")]
    pub terminal_id: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Type")]
    pub ticket_type: String,
}

/// The unit of work. Keyed by `order_id` in the store; `id` is an opaque
/// identifier generated at creation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub order_id: String,
    /// Secondary reference; refunds point at the original transaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    pub currency: String,
    pub device_type: DeviceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TransactionType>,
    pub status: TransactionStatus,
    pub result_code: u16,
    pub result_message: String,
    pub timestamp: DateTime<Utc>,
    /// Simulated duration in milliseconds, drawn once at creation.
    pub processing_time: u64,
    /// `timestamp + processing_time`; never recomputed.
    pub processing_end_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenization: Option<Tokenization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_code: Option<String>,
    /// Status polls observed while non-terminal; past 20 the next poll times out.
    #[serde(default)]
    pub attempts: u32,
}

/// Typed partial update for `TransactionStore::update`. Fields left `None`
/// are untouched by the merge.
#[derive(Debug, Default, Clone)]
pub struct TransactionPatch {
    pub amount: Option<Decimal>,
    pub r#type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub result_code: Option<u16>,
    pub result_message: Option<String>,
    pub ticket: Option<Ticket>,
    pub tokenization: Option<Tokenization>,
    pub auth_code: Option<String>,
    pub attempts: Option<u32>,
}

impl TransactionPatch {
    pub fn apply(self, tx: &mut Transaction) {
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(t) = self.r#type {
            tx.r#type = Some(t);
        }
        if let Some(status) = self.status {
            tx.status = status;
        }
        if let Some(code) = self.result_code {
            tx.result_code = code;
        }
        if let Some(message) = self.result_message {
            tx.result_message = message;
        }
        if let Some(ticket) = self.ticket {
            tx.ticket = Some(ticket);
        }
        if let Some(tokenization) = self.tokenization {
            tx.tokenization = Some(tokenization);
        }
        if let Some(auth_code) = self.auth_code {
            tx.auth_code = Some(auth_code);
        }
        if let Some(attempts) = self.attempts {
            tx.attempts = attempts;
        }
    }
}
