use serde::{Deserialize, Serialize};

use crate::address::AddressType;
use crate::error::{Error, Result};

/// The payer: funds the transaction and receives change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub address_type: AddressType,
    pub address: String,
    /// Hex-encoded public key
    pub public_key: String,
    /// Satoshis to send to the recipient. May be zero when only an
    /// inscription is being moved.
    pub amount: u64,
}

/// The holder of an inscription that should move to the recipient.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrdinalTransferRequest {
    pub address_type: AddressType,
    pub address: String,
    /// Hex-encoded public key
    pub public_key: String,
    pub inscription_id: String,
}

impl PaymentRequest {
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        decode_public_key(&self.public_key)
    }
}

impl OrdinalTransferRequest {
    pub fn public_key_bytes(&self) -> Result<Vec<u8>> {
        decode_public_key(&self.public_key)
    }
}

fn decode_public_key(public_key: &str) -> Result<Vec<u8>> {
    hex::decode(public_key.trim()).map_err(|e| Error::InvalidPublicKey(e.to_string()))
}
