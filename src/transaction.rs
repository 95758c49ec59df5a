use std::str::FromStr;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bitcoin::psbt::Input as PsbtInput;
use bitcoin::{
    absolute::LockTime, transaction::Version, Address, Amount, Network, Psbt, ScriptBuf, Sequence,
    Transaction as BitcoinTransaction, TxIn, TxOut, Witness,
};

use crate::error::{Error, Result};
use crate::script::InputDescriptor;

/// Accumulates inputs and outputs in insertion order.
///
/// Input order is what signer indexes refer to, so nothing here reorders or
/// deduplicates. Validation is left to the `bitcoin` crate.
#[derive(Debug, Clone)]
pub struct TransactionBuilder {
    network: Network,
    inputs: Vec<InputDescriptor>,
    outputs: Vec<TxOut>,
}

impl TransactionBuilder {
    pub fn new(network: Network) -> Self {
        TransactionBuilder {
            network,
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    pub fn add_input(&mut self, input: InputDescriptor) {
        self.inputs.push(input);
    }

    /// Appends an output paying `amount` satoshis to `address`, which must
    /// belong to the builder's network.
    pub fn add_output(&mut self, address: &str, amount: u64) -> Result<()> {
        let script_pubkey = script_for_address(address, self.network)?;
        self.outputs.push(TxOut {
            value: Amount::from_sat(amount),
            script_pubkey,
        });
        Ok(())
    }

    pub fn inputs(&self) -> &[InputDescriptor] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[TxOut] {
        &self.outputs
    }

    pub fn input_value(&self) -> u64 {
        self.inputs.iter().map(|input| input.amount.to_sat()).sum()
    }

    pub fn output_value(&self) -> u64 {
        self.outputs.iter().map(|output| output.value.to_sat()).sum()
    }

    pub fn unsigned_transaction(&self) -> BitcoinTransaction {
        BitcoinTransaction {
            version: Version::TWO,
            lock_time: LockTime::ZERO,
            input: self
                .inputs
                .iter()
                .map(|input| TxIn {
                    previous_output: input.outpoint,
                    script_sig: ScriptBuf::new(),
                    sequence: Sequence::MAX,
                    witness: Witness::new(),
                })
                .collect(),
            output: self.outputs.clone(),
        }
    }

    /// Unsigned PSBT with `witness_utxo`, redeem script and taproot internal
    /// key filled per input.
    pub fn to_psbt(&self) -> Result<Psbt> {
        let mut psbt = Psbt::from_unsigned_tx(self.unsigned_transaction())?;
        for (psbt_input, input) in psbt.inputs.iter_mut().zip(&self.inputs) {
            *psbt_input = PsbtInput {
                witness_utxo: Some(TxOut {
                    value: input.amount,
                    script_pubkey: input.script.script_pubkey.clone(),
                }),
                redeem_script: input.script.redeem_script.clone(),
                tap_internal_key: input.script.tap_internal_key,
                ..Default::default()
            };
        }
        Ok(psbt)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.to_psbt()?.serialize())
    }

    pub fn to_text(&self) -> Result<String> {
        Ok(BASE64.encode(self.to_bytes()?))
    }
}

pub fn script_for_address(address: &str, network: Network) -> Result<ScriptBuf> {
    let invalid = |reason: String| Error::InvalidAddress {
        address: address.to_string(),
        reason,
    };
    let address = Address::from_str(address)
        .map_err(|e| invalid(e.to_string()))?
        .require_network(network)
        .map_err(|e| invalid(e.to_string()))?;
    Ok(address.script_pubkey())
}

pub fn decode_psbt(bytes: &[u8]) -> Result<Psbt> {
    Ok(Psbt::deserialize(bytes)?)
}

pub fn decode_psbt_text(text: &str) -> Result<Psbt> {
    let bytes = BASE64.decode(text.trim())?;
    decode_psbt(&bytes)
}
