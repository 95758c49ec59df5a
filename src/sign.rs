//! Signing with the well-known placeholder key.
//!
//! The key is the secp256k1 scalar `1`. Its signatures are only ever used to
//! give a throwaway transaction its real post-signing size; they must never
//! reach a PSBT handed back to a caller.

use bitcoin::ecdsa::Signature as EcdsaSignature;
use bitcoin::key::{Keypair, TapTweak};
use std::sync::LazyLock;

use bitcoin::secp256k1::{All, Message, Secp256k1, SecretKey};
use bitcoin::sighash::{EcdsaSighashType, Prevouts, SighashCache, TapSighashType};
use bitcoin::taproot::Signature as TaprootSignature;
use bitcoin::{Psbt, PublicKey, TxOut};

use crate::error::{Error, Result};

pub const DUMMY_SECRET_KEY: [u8; 32] = {
    let mut key = [0u8; 32];
    key[31] = 1;
    key
};

static ONE_KEY: LazyLock<SecretKey> = LazyLock::new(|| {
    SecretKey::from_slice(&DUMMY_SECRET_KEY).expect("scalar one is a valid secret key")
});

pub struct DummySigner {
    secp: Secp256k1<All>,
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl DummySigner {
    pub fn new() -> Self {
        let secp = Secp256k1::new();
        let secret_key = *ONE_KEY;
        let public_key = PublicKey::new(secret_key.public_key(&secp));
        DummySigner {
            secp,
            secret_key,
            public_key,
        }
    }

    pub fn secp(&self) -> &Secp256k1<All> {
        &self.secp
    }

    /// Compressed 33-byte form.
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public_key.inner.serialize()
    }

    /// Signs every input of `psbt` according to the shape of its
    /// `witness_utxo` script.
    pub fn sign(&self, psbt: &mut Psbt) -> Result<()> {
        let prevouts = psbt
            .inputs
            .iter()
            .enumerate()
            .map(|(index, input)| {
                input.witness_utxo.clone().ok_or_else(|| Error::Sighash {
                    index,
                    reason: "missing witness_utxo".to_string(),
                })
            })
            .collect::<Result<Vec<TxOut>>>()?;

        let tx = psbt.unsigned_tx.clone();
        let mut cache = SighashCache::new(&tx);

        for (index, input) in psbt.inputs.iter_mut().enumerate() {
            let prevout = &prevouts[index];
            let script_pubkey = &prevout.script_pubkey;
            let sighash_error = |reason: String| Error::Sighash { index, reason };

            if script_pubkey.is_p2tr() {
                let sighash = cache
                    .taproot_key_spend_signature_hash(
                        index,
                        &Prevouts::All(&prevouts),
                        TapSighashType::Default,
                    )
                    .map_err(|e| sighash_error(e.to_string()))?;
                let keypair = Keypair::from_secret_key(&self.secp, &self.secret_key)
                    .tap_tweak(&self.secp, None)
                    .to_keypair();
                let signature = self
                    .secp
                    .sign_schnorr_no_aux_rand(&Message::from(sighash), &keypair);
                input.tap_key_sig = Some(TaprootSignature {
                    signature,
                    sighash_type: TapSighashType::Default,
                });
                continue;
            }

            let message = if script_pubkey.is_p2pkh() {
                let sighash = cache
                    .legacy_signature_hash(index, script_pubkey, EcdsaSighashType::All.to_u32())
                    .map_err(|e| sighash_error(e.to_string()))?;
                Message::from(sighash)
            } else {
                // Native P2WPKH signs its own program; wrapped P2WPKH signs
                // the program carried in the redeem script.
                let program = match &input.redeem_script {
                    Some(redeem_script) if script_pubkey.is_p2sh() => redeem_script.clone(),
                    _ => script_pubkey.clone(),
                };
                let sighash = cache
                    .p2wpkh_signature_hash(index, &program, prevout.value, EcdsaSighashType::All)
                    .map_err(|e| sighash_error(e.to_string()))?;
                Message::from(sighash)
            };

            let signature = EcdsaSignature {
                signature: self.secp.sign_ecdsa(&message, &self.secret_key),
                sighash_type: EcdsaSighashType::All,
            };
            input.partial_sigs.insert(self.public_key, signature);
        }
        Ok(())
    }
}

impl Default for DummySigner {
    fn default() -> Self {
        Self::new()
    }
}
