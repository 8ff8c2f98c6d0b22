use crate::domain::codes;
use crate::domain::transaction::{
    DeviceType, Ticket, Tokenization, Transaction, TransactionStatus, TransactionType,
};
use crate::error::DatafonoError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// Wire response shared by all transaction endpoints. Everything except the
/// result pair is optional and omitted when unset.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    pub result_code: u16,
    pub result_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket: Option<Ticket>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokenization: Option<Tokenization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TransactionStatus>,
}

impl TransactionResponse {
    /// A bare result-code response with the table message.
    pub fn code(code: u16) -> Self {
        Self {
            order_id: None,
            transaction_id: None,
            result_code: code,
            result_message: codes::message(code).to_string(),
            device_type: None,
            ticket: None,
            tokenization: None,
            amount: None,
            currency: None,
            timestamp: None,
            r#type: None,
            status: None,
        }
    }

    pub fn from_error(error: &DatafonoError) -> Self {
        Self::code(error.result_code())
    }

    /// The per-transaction view returned by create and status endpoints.
    pub fn summary(tx: &Transaction) -> Self {
        Self {
            order_id: Some(tx.order_id.clone()),
            transaction_id: tx.transaction_id.clone(),
            ticket: tx.ticket.clone(),
            tokenization: tx.tokenization.clone(),
            device_type: Some(tx.device_type),
            result_code: tx.result_code,
            result_message: tx.result_message.clone(),
            ..Self::code(tx.result_code)
        }
    }

    /// The reporting view, adding amount/currency/timestamp/type/status.
    pub fn detailed(tx: &Transaction) -> Self {
        Self {
            amount: Some(tx.amount),
            currency: Some(tx.currency.clone()),
            timestamp: Some(tx.timestamp),
            r#type: tx.r#type,
            status: Some(tx.status),
            ..Self::summary(tx)
        }
    }
}

/// Response for the reporting endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailsResponse {
    pub result_code: u16,
    pub result_message: String,
    pub transactions: Vec<TransactionResponse>,
}
