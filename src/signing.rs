//! Which wallet address signs which input of a generated PSBT.

use serde::{Deserialize, Serialize};

use crate::request::{OrdinalTransferRequest, PaymentRequest};
use crate::selector::PsbtResult;

/// `SIGHASH_DEFAULT` for taproot, treated as `SIGHASH_ALL` by segwit v0 signers.
pub const SIGHASH_DEFAULT: u8 = 0;

/// One entry of a browser wallet's `inputsToSign` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputToSign {
    pub address: String,
    pub signing_indexes: Vec<usize>,
    #[serde(rename = "sigHash")]
    pub sighash: u8,
}

impl PsbtResult {
    /// Maps transaction inputs to signers.
    ///
    /// The inscription input, when present, is index 0 and is signed by the
    /// inscription holder. Payment input `i` sits at `i + 1` in that case and
    /// at `i` otherwise.
    pub fn inputs_to_sign(
        &self,
        payment: &PaymentRequest,
        ordinals: Option<&OrdinalTransferRequest>,
    ) -> Vec<InputToSign> {
        let mut inputs = Vec::with_capacity(self.payment_utxo_count + 1);
        let offset = match (self.ordinal_input, ordinals) {
            (true, Some(ordinals)) => {
                inputs.push(InputToSign {
                    address: ordinals.address.clone(),
                    signing_indexes: vec![0],
                    sighash: SIGHASH_DEFAULT,
                });
                1
            }
            (true, None) => 1,
            (false, _) => 0,
        };
        for i in 0..self.payment_utxo_count {
            inputs.push(InputToSign {
                address: payment.address.clone(),
                signing_indexes: vec![i + offset],
                sighash: SIGHASH_DEFAULT,
            });
        }
        inputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressType;

    fn result(payment_utxo_count: usize, ordinal_input: bool) -> PsbtResult {
        PsbtResult {
            psbt: Vec::new(),
            psbt_base64: String::new(),
            payment_utxo_count,
            ordinal_input,
            fee: 1000,
        }
    }

    fn payment() -> PaymentRequest {
        PaymentRequest {
            address_type: AddressType::P2wpkh,
            address: "payer".to_string(),
            public_key: String::new(),
            amount: 0,
        }
    }

    fn ordinals() -> OrdinalTransferRequest {
        OrdinalTransferRequest {
            address_type: AddressType::P2tr,
            address: "holder".to_string(),
            public_key: String::new(),
            inscription_id: "i0".to_string(),
        }
    }

    #[test]
    fn test_payment_only_indexes() {
        let inputs = result(3, false).inputs_to_sign(&payment(), None);
        let indexes: Vec<usize> = inputs.iter().map(|i| i.signing_indexes[0]).collect();

        assert_eq!(indexes, vec![0, 1, 2]);
        assert!(inputs.iter().all(|i| i.address == "payer"));
    }

    #[test]
    fn test_inscription_input_shifts_payment_indexes() {
        let ordinals = ordinals();
        let inputs = result(2, true).inputs_to_sign(&payment(), Some(&ordinals));

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0].address, "holder");
        assert_eq!(inputs[0].signing_indexes, vec![0]);
        assert_eq!(inputs[1].signing_indexes, vec![1]);
        assert_eq!(inputs[2].signing_indexes, vec![2]);
    }

    #[test]
    fn test_wallet_json_shape() {
        let inputs = result(1, false).inputs_to_sign(&payment(), None);
        let json = serde_json::to_value(&inputs).unwrap();

        assert_eq!(
            json,
            serde_json::json!([{"address": "payer", "signingIndexes": [0], "sigHash": 0}])
        );
    }
}
