//! Fixed result-code vocabulary shared by requests and responses.
//!
//! These codes mimic the terminal's protocol and are independent of the
//! transport-level HTTP status (every response goes out as 200 OK).

pub const SUCCESS: u16 = 0;
pub const MSG_FORMAT_ERROR: u16 = 2;
pub const INVALID_PARAMS: u16 = 4;
pub const OPERATION_TIMEOUT: u16 = 17;
pub const DEVICE_FAILURE: u16 = 21;
pub const GENERIC_ERROR: u16 = 24;
pub const NETWORK_NOT_AVAILABLE: u16 = 25;
pub const DECLINED: u16 = 105;
pub const DETAILS_NOT_AVAILABLE: u16 = 602;
pub const REFUND_NOT_ALLOWED: u16 = 950;
pub const INITIALIZATION_SUCCESSFUL: u16 = 1000;
pub const SERVICE_BUSY: u16 = 1001;
pub const EMV_INITIALIZATION_ERROR: u16 = 1010;

/// Human-readable message for a result code.
pub fn message(code: u16) -> &'static str {
    match code {
        SUCCESS => "Success",
        1 => "INCORRECT_MSGID",
        MSG_FORMAT_ERROR => "MSG_FORMAT_ERROR",
        3 => "MSG_PARSING_ERROR",
        INVALID_PARAMS => "MSG_PARAMS_ERROR",
        5 => "UNKNOWN_TRANS_TYPE",
        12 => "OPERATION_FINISHED",
        15 => "INVALID_CARD",
        16 => "OPERATION_CANCELLED",
        OPERATION_TIMEOUT => "OPERATION_TIMEOUT",
        19 => "CARD_REMOVED",
        DEVICE_FAILURE => "DEVICE_FAILURE",
        GENERIC_ERROR => "GENERIC_ERROR",
        NETWORK_NOT_AVAILABLE => "NETWORK_NOT_AVAILABLE",
        26 => "OPERATION_VOIDED",
        100 => "Offline processing in terminal",
        101 => "Declined: Expired card",
        DECLINED => "Declined",
        106 => "Declined: PIN limit exceeded",
        117 => "Declined: Incorrect PIN",
        190 => "Issuer Denied Operation",
        201 => "Not processed",
        400 => "Operation voided",
        600 => "Totals",
        DETAILS_NOT_AVAILABLE => "Details not available",
        603 => "Receipt not found",
        900 => "Authorised for Refund and Confirmations",
        904 => "MerchantID not found",
        909 => "System Error",
        912 => "Issuer not available",
        913 => "Duplicated OrderID",
        944 => "Invalid Session",
        REFUND_NOT_ALLOWED => "Refund Operation not allowed",
        INITIALIZATION_SUCCESSFUL => "Initialization successful",
        SERVICE_BUSY => "Service is busy (operation in progress)",
        EMV_INITIALIZATION_ERROR => "EMV Initialization Error",
        _ => "Unknown result code",
    }
}
