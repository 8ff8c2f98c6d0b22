//! Domain types, result-code vocabulary, and the ports the engine is built on.

pub mod codes;
pub mod ports;
pub mod token;
pub mod transaction;
