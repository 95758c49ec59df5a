//! Maps an address type and public key to the script data a PSBT input needs.

use bitcoin::secp256k1::{Secp256k1, Verification, XOnlyPublicKey};
use bitcoin::{Amount, CompressedPublicKey, OutPoint, PublicKey, ScriptBuf};

use crate::address::AddressType;
use crate::error::{Error, Result};
use crate::utxo::SpendableUtxo;

/// Locking script plus whatever a signer needs beyond it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptInfo {
    pub address_type: AddressType,
    pub script_pubkey: ScriptBuf,
    pub redeem_script: Option<ScriptBuf>,
    pub tap_internal_key: Option<XOnlyPublicKey>,
}

/// Derives the spendable-output description for `public_key`.
///
/// Taproot keys may be given compressed (33 bytes, prefix dropped) or already
/// x-only (32 bytes). Segwit types require a compressed key.
pub fn resolve<C: Verification>(
    secp: &Secp256k1<C>,
    address_type: AddressType,
    public_key: &[u8],
) -> Result<ScriptInfo> {
    let info = match address_type {
        AddressType::P2pkh => {
            let key = PublicKey::from_slice(public_key)
                .map_err(|e| Error::InvalidPublicKey(e.to_string()))?;
            ScriptInfo {
                address_type,
                script_pubkey: ScriptBuf::new_p2pkh(&key.pubkey_hash()),
                redeem_script: None,
                tap_internal_key: None,
            }
        }
        AddressType::P2sh | AddressType::P2shP2wpkh => {
            let key = compressed_key(public_key)?;
            let redeem_script = ScriptBuf::new_p2wpkh(&key.wpubkey_hash());
            ScriptInfo {
                address_type,
                script_pubkey: ScriptBuf::new_p2sh(&redeem_script.script_hash()),
                redeem_script: Some(redeem_script),
                tap_internal_key: None,
            }
        }
        AddressType::P2wpkh => {
            let key = compressed_key(public_key)?;
            ScriptInfo {
                address_type,
                script_pubkey: ScriptBuf::new_p2wpkh(&key.wpubkey_hash()),
                redeem_script: None,
                tap_internal_key: None,
            }
        }
        AddressType::P2tr => {
            let internal_key = x_only_key(public_key)?;
            ScriptInfo {
                address_type,
                script_pubkey: ScriptBuf::new_p2tr(secp, internal_key, None),
                redeem_script: None,
                tap_internal_key: Some(internal_key),
            }
        }
    };
    Ok(info)
}

fn compressed_key(public_key: &[u8]) -> Result<CompressedPublicKey> {
    CompressedPublicKey::from_slice(public_key).map_err(|e| Error::InvalidPublicKey(e.to_string()))
}

fn x_only_key(public_key: &[u8]) -> Result<XOnlyPublicKey> {
    let x_only = match public_key.len() {
        33 => &public_key[1..],
        32 => public_key,
        len => {
            return Err(Error::InvalidPublicKey(format!(
                "taproot key must be 32 or 33 bytes, got {len}"
            )))
        }
    };
    XOnlyPublicKey::from_slice(x_only).map_err(|e| Error::InvalidPublicKey(e.to_string()))
}

/// One transaction input: the outpoint being spent and how to spend it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDescriptor {
    pub outpoint: OutPoint,
    pub amount: Amount,
    pub script: ScriptInfo,
}

impl InputDescriptor {
    pub fn new<C: Verification>(
        secp: &Secp256k1<C>,
        address_type: AddressType,
        public_key: &[u8],
        utxo: &SpendableUtxo,
    ) -> Result<Self> {
        Ok(InputDescriptor {
            outpoint: utxo.outpoint()?,
            amount: Amount::from_sat(utxo.amount),
            script: resolve(secp, address_type, public_key)?,
        })
    }
}

/// The real descriptor (owner's key) and its measurement twin (dummy key)
/// for the same UTXO.
#[derive(Debug, Clone)]
pub struct DescriptorPair {
    pub real: InputDescriptor,
    pub dummy: InputDescriptor,
}

impl DescriptorPair {
    pub fn new<C: Verification>(
        secp: &Secp256k1<C>,
        address_type: AddressType,
        public_key: &[u8],
        dummy_public_key: &[u8],
        utxo: &SpendableUtxo,
    ) -> Result<Self> {
        Ok(DescriptorPair {
            real: InputDescriptor::new(secp, address_type, public_key, utxo)?,
            dummy: InputDescriptor::new(secp, address_type, dummy_public_key, utxo)?,
        })
    }
}
