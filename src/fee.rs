use bitcoin::Psbt;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::finalize::finalize_psbt;
use crate::sign::DummySigner;
use crate::transaction::TransactionBuilder;

/// Relay-fee policy constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Floor for any computed fee, in satoshis.
    pub min_relay_fee: u64,
    /// A change output is only added when the leftover clears
    /// `change_headroom_multiplier * fee_rate` on top of the fee.
    pub change_headroom_multiplier: u64,
}

impl Default for FeePolicy {
    fn default() -> Self {
        FeePolicy {
            min_relay_fee: 1000,
            change_headroom_multiplier: 100,
        }
    }
}

impl FeePolicy {
    pub fn fee_for(&self, vsize: u64, fee_rate: u64) -> u64 {
        vsize.saturating_mul(fee_rate).max(self.min_relay_fee)
    }

    pub fn change_headroom(&self, fee_rate: u64) -> u64 {
        self.change_headroom_multiplier.saturating_mul(fee_rate)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    pub vsize: u64,
    pub fee_rate: u64,
    pub fee: u64,
}

/// Measures fees on the dummy transaction: sign every input with the
/// placeholder key, finalize, and read the virtual size.
pub struct FeeEstimator {
    policy: FeePolicy,
    signer: DummySigner,
}

impl FeeEstimator {
    pub fn new(policy: FeePolicy) -> Self {
        FeeEstimator {
            policy,
            signer: DummySigner::new(),
        }
    }

    pub fn policy(&self) -> &FeePolicy {
        &self.policy
    }

    pub fn signer(&self) -> &DummySigner {
        &self.signer
    }

    pub fn measure(&self, dummy: &TransactionBuilder, fee_rate: u64) -> Result<FeeQuote> {
        let mut psbt = Psbt::deserialize(&dummy.to_bytes()?)?;
        self.signer.sign(&mut psbt)?;
        finalize_psbt(&mut psbt)?;

        // fee rate sanity is irrelevant here, only the size is read
        let vsize = psbt.extract_tx_unchecked_fee_rate().vsize() as u64;
        let fee = self.policy.fee_for(vsize, fee_rate);
        debug!(
            inputs = dummy.inputs().len(),
            outputs = dummy.outputs().len(),
            vsize,
            fee,
            "Measured dummy transaction"
        );
        Ok(FeeQuote {
            vsize,
            fee_rate,
            fee,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::AddressType;
    use crate::script::InputDescriptor;
    use crate::utxo::SpendableUtxo;
    use bitcoin::{Address, CompressedPublicKey, Network};

    fn dummy_builder(estimator: &FeeEstimator, inputs: u32, outputs: u32) -> TransactionBuilder {
        let signer = estimator.signer();
        let mut builder = TransactionBuilder::new(Network::Testnet);
        for vout in 0..inputs {
            let utxo = SpendableUtxo {
                txid: "dd3d962f95741f2f5c3b87d6395c325baa75c4f3f04c7652e258f6005d70f3e8"
                    .to_string(),
                vout,
                amount: 50000,
                is_spent: false,
                inscriptions: Vec::new(),
            };
            builder.add_input(
                InputDescriptor::new(
                    signer.secp(),
                    AddressType::P2wpkh,
                    &signer.public_key_bytes(),
                    &utxo,
                )
                .unwrap(),
            );
        }
        let key = CompressedPublicKey::from_slice(&signer.public_key_bytes()).unwrap();
        let address = Address::p2wpkh(&key, Network::Testnet).to_string();
        for _ in 0..outputs {
            builder.add_output(&address, 1000).unwrap();
        }
        builder
    }

    #[test]
    fn test_min_relay_fee_floor() {
        let policy = FeePolicy::default();
        assert_eq!(policy.fee_for(110, 1), 1000);
        assert_eq!(policy.fee_for(110, 30), 3300);
        assert_eq!(policy.change_headroom(30), 3000);
    }

    #[test]
    fn test_measure_single_segwit_input() {
        let estimator = FeeEstimator::new(FeePolicy::default());
        let quote = estimator.measure(&dummy_builder(&estimator, 1, 2), 30).unwrap();

        // 1-in/2-out P2WPKH is 140-142 vB depending on signature length
        assert!((139..=142).contains(&quote.vsize), "vsize {}", quote.vsize);
        assert_eq!(quote.fee, quote.vsize * 30);
    }

    #[test]
    fn test_more_inputs_cost_more() {
        let estimator = FeeEstimator::new(FeePolicy::default());
        let one = estimator.measure(&dummy_builder(&estimator, 1, 1), 10).unwrap();
        let two = estimator.measure(&dummy_builder(&estimator, 2, 1), 10).unwrap();
        let with_change = estimator.measure(&dummy_builder(&estimator, 2, 2), 10).unwrap();

        assert!(two.vsize > one.vsize);
        assert!(with_change.vsize > two.vsize);
    }

    #[test]
    fn test_measure_leaves_builder_unsigned() {
        let estimator = FeeEstimator::new(FeePolicy::default());
        let builder = dummy_builder(&estimator, 1, 1);
        estimator.measure(&builder, 5).unwrap();

        let psbt = builder.to_psbt().unwrap();
        assert!(psbt.inputs[0].partial_sigs.is_empty());
        assert!(psbt.inputs[0].final_script_witness.is_none());
    }
}
