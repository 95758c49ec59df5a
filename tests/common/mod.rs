#![allow(dead_code)]

use std::sync::Mutex;

use bitcoin::secp256k1::{Secp256k1, SecretKey};
use bitcoin::{Address, CompressedPublicKey, Network, Transaction};
use ordinals_psbt::client::UtxoSource;
use ordinals_psbt::utxo::Inscription;
use ordinals_psbt::{
    AddressType, Error, OrdinalTransferRequest, PaymentRequest, Result, SpendableUtxo,
};

pub const TXID: &str = "dd3d962f95741f2f5c3b87d6395c325baa75c4f3f04c7652e258f6005d70f3e8";
pub const INSCRIPTION_ID: &str =
    "dd3d962f95741f2f5c3b87d6395c325baa75c4f3f04c7652e258f6005d70f3e8i0";

/// Common helpers for the engine tests
pub struct TestUtils;

impl TestUtils {
    /// Deterministic key from a repeated byte
    pub fn key(byte: u8) -> CompressedPublicKey {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(&[byte; 32]).unwrap();
        CompressedPublicKey(secret_key.public_key(&secp))
    }

    pub fn segwit_address(byte: u8) -> String {
        Address::p2wpkh(&Self::key(byte), Network::Testnet).to_string()
    }

    pub fn taproot_address(byte: u8) -> String {
        let secp = Secp256k1::new();
        let (x_only, _) = Self::key(byte).0.x_only_public_key();
        Address::p2tr(&secp, x_only, None, Network::Testnet).to_string()
    }

    pub fn payment_request(byte: u8, amount: u64) -> PaymentRequest {
        PaymentRequest {
            address_type: AddressType::P2wpkh,
            address: Self::segwit_address(byte),
            public_key: hex::encode(Self::key(byte).to_bytes()),
            amount,
        }
    }

    pub fn ordinal_request(byte: u8, inscription_id: &str) -> OrdinalTransferRequest {
        OrdinalTransferRequest {
            address_type: AddressType::P2tr,
            address: Self::taproot_address(byte),
            public_key: hex::encode(Self::key(byte).to_bytes()),
            inscription_id: inscription_id.to_string(),
        }
    }

    pub fn create_test_utxo(vout: u32, amount: u64) -> SpendableUtxo {
        SpendableUtxo {
            txid: TXID.to_string(),
            vout,
            amount,
            is_spent: false,
            inscriptions: Vec::new(),
        }
    }

    pub fn create_inscribed_utxo(vout: u32, amount: u64, inscription_id: &str) -> SpendableUtxo {
        SpendableUtxo {
            inscriptions: vec![Inscription {
                inscription_id: inscription_id.to_string(),
            }],
            ..Self::create_test_utxo(vout, amount)
        }
    }
}

/// In-memory listing API. Records every broadcast it receives.
#[derive(Default)]
pub struct MockSource {
    pub inscription_utxos: Vec<SpendableUtxo>,
    pub payment_utxos: Vec<SpendableUtxo>,
    /// When set, every broadcast is rejected with this body
    pub reject_with: Option<String>,
    /// When set, every listing request fails as an unreachable server would
    pub listings_down: bool,
    pub broadcasts: Mutex<Vec<String>>,
    pub fetched: Mutex<Vec<String>>,
}

impl MockSource {
    pub fn with_payment_utxos(payment_utxos: Vec<SpendableUtxo>) -> Self {
        MockSource {
            payment_utxos,
            ..Default::default()
        }
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.broadcasts.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn listing_result(&self, utxos: &[SpendableUtxo]) -> Result<Vec<SpendableUtxo>> {
        if self.listings_down {
            return Err(Error::Api {
                status: 503,
                body: "service unavailable".to_string(),
            });
        }
        Ok(utxos.to_vec())
    }
}

impl UtxoSource for MockSource {
    async fn inscription_utxos(&self, address: &str) -> Result<Vec<SpendableUtxo>> {
        self.fetched.lock().unwrap().push(format!("inscriptions:{address}"));
        self.listing_result(&self.inscription_utxos)
    }

    async fn payment_utxos(&self, address: &str) -> Result<Vec<SpendableUtxo>> {
        self.fetched.lock().unwrap().push(format!("payment:{address}"));
        self.listing_result(&self.payment_utxos)
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String> {
        self.broadcasts.lock().unwrap().push(raw_tx_hex.to_string());
        if let Some(body) = &self.reject_with {
            return Err(Error::Broadcast(body.clone()));
        }
        let bytes = hex::decode(raw_tx_hex).unwrap();
        let tx: Transaction = bitcoin::consensus::deserialize(&bytes).unwrap();
        Ok(tx.compute_txid().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_addresses_are_testnet() {
        assert!(TestUtils::segwit_address(1).starts_with("tb1q"));
        assert!(TestUtils::taproot_address(2).starts_with("tb1p"));
    }

    #[test]
    fn test_inscribed_utxo() {
        let utxo = TestUtils::create_inscribed_utxo(3, 546, INSCRIPTION_ID);
        assert!(utxo.carries_inscription(INSCRIPTION_ID));
        assert_eq!(utxo.vout, 3);
    }
}
