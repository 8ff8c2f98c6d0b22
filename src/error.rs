use thiserror::Error;

use crate::domain::codes;

/// Failures the engine reports to callers as structured result codes.
///
/// None of these are fatal to the process; the transport layer turns each
/// variant into a `resultCode`/`resultMessage` pair.
#[derive(Error, Debug)]
pub enum DatafonoError {
    #[error("transaction must have an orderId")]
    InvalidTransaction,
    #[error("transaction {0} not found")]
    NotFound(String),
    #[error("device busy: an operation is already in progress")]
    DeviceBusy,
    #[error("token not found in vault")]
    TokenNotFound,
    #[error("simulated network failure")]
    TransientNetwork,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid parameters: {0}")]
    InvalidParams(String),
    #[error("operation not allowed: {0}")]
    NotAllowed(String),
    #[error("persistence error: {0}")]
    Persistence(#[from] std::io::Error),
}

impl DatafonoError {
    /// The numeric result code this failure maps to on the wire.
    pub fn result_code(&self) -> u16 {
        match self {
            DatafonoError::InvalidTransaction => codes::MSG_FORMAT_ERROR,
            DatafonoError::NotFound(_) => codes::DETAILS_NOT_AVAILABLE,
            DatafonoError::DeviceBusy => codes::SERVICE_BUSY,
            DatafonoError::TokenNotFound => codes::DECLINED,
            DatafonoError::TransientNetwork => codes::NETWORK_NOT_AVAILABLE,
            DatafonoError::InvalidRequest(_) => codes::MSG_FORMAT_ERROR,
            DatafonoError::InvalidParams(_) => codes::INVALID_PARAMS,
            DatafonoError::NotAllowed(_) => codes::REFUND_NOT_ALLOWED,
            DatafonoError::Persistence(_) => codes::GENERIC_ERROR,
        }
    }
}

pub type Result<T> = std::result::Result<T, DatafonoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_codes_match_taxonomy() {
        assert_eq!(DatafonoError::DeviceBusy.result_code(), 1001);
        assert_eq!(DatafonoError::NotFound("X".into()).result_code(), 602);
        assert_eq!(DatafonoError::TransientNetwork.result_code(), 25);
        assert_eq!(DatafonoError::InvalidTransaction.result_code(), 2);
        assert_eq!(DatafonoError::TokenNotFound.result_code(), 105);
    }
}
