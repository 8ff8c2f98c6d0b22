//! Application layer containing the transaction simulation engine.
//!
//! `TransactionLifecycle` drives the state machine, `TransactionStore` and
//! `TokenVault` own the state, and `StatusResolver` is the lazy read path.
//! All four are process-wide shared instances handed to the transport layer
//! at startup.

pub mod lifecycle;
pub mod status;
pub mod store;
pub mod vault;
