//! Thin axum layer over the engine: header validation, JSON (de)serialization,
//! and the fixed result-code responses. All responses go out as HTTP 200 with
//! a `resultCode`/`resultMessage` body.

pub mod requests;
pub mod responses;
pub mod routes;

pub use routes::{AppState, router};
