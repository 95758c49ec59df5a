//! Builds unsigned PSBTs for browser-wallet signing: pays an amount, can move
//! an inscription, selects payment coins largest-first and sizes the fee on a
//! placeholder-signed copy. Also finalizes and broadcasts the signed result.

pub mod address;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod fee;
pub mod finalize;
pub mod request;
pub mod script;
pub mod selector;
pub mod sign;
pub mod signing;
pub mod transaction;
pub mod utxo;

pub use address::AddressType;
pub use client::{ApiClient, UtxoSource};
pub use config::Config;
pub use engine::PsbtEngine;
pub use error::{Error, Result};
pub use fee::FeePolicy;
pub use request::{OrdinalTransferRequest, PaymentRequest};
pub use selector::{CoinSelector, PsbtResult};
pub use signing::InputToSign;
pub use utxo::SpendableUtxo;
