//! Error types for PSBT construction and broadcast

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every way a selection or broadcast call can fail.
///
/// All variants are terminal for the call that produced them. Nothing is
/// retried and no partial transaction is returned alongside an error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported address type: {0}")]
    UnsupportedAddressType(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Invalid address {address}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid transaction id: {0}")]
    InvalidTxid(String),

    #[error("Fee rate must be a positive number of sat/vB")]
    InvalidFeeRate,

    #[error("No inscription UTXOs exist for {address}")]
    NoInscriptionUtxos { address: String },

    #[error("Inscription {inscription_id} not found in unspent inscription UTXOs")]
    InscriptionNotFound { inscription_id: String },

    #[error("Empty output: nothing to send")]
    EmptyOutput,

    #[error("No payment UTXOs exist for {address}")]
    NoPaymentUtxos { address: String },

    #[error("Insufficient funds: have {available} sat, need at least {required} sat")]
    InsufficientFunds { available: u64, required: u64 },

    #[error("Broadcast rejected: {0}")]
    Broadcast(String),

    #[error("PSBT error: {0}")]
    Psbt(#[from] bitcoin::psbt::Error),

    #[error("Base64 decoding error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Sighash computation failed for input {index}: {reason}")]
    Sighash { index: usize, reason: String },

    #[error("Cannot finalize input {index}: {reason}")]
    Finalize { index: usize, reason: String },

    #[error("Transaction extraction failed: {0}")]
    Extract(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
