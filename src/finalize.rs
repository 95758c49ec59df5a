//! Input finalizer and transaction extractor.
//!
//! Turns signature data into final `script_sig` / witness for the four spend
//! shapes the engine builds, then extracts the network transaction.

use bitcoin::psbt::Input as PsbtInput;
use bitcoin::script::{Builder, PushBytesBuf};
use bitcoin::{Psbt, ScriptBuf, Transaction, TxIn, TxOut, Witness};

use crate::error::{Error, Result};

/// Finalizes every input that is not already final.
///
/// Wallets that finalize on their own leave `final_script_sig` or
/// `final_script_witness` set; those inputs are kept as they are.
pub fn finalize_psbt(psbt: &mut Psbt) -> Result<()> {
    for (index, (input, txin)) in psbt
        .inputs
        .iter_mut()
        .zip(&psbt.unsigned_tx.input)
        .enumerate()
    {
        if input.final_script_sig.is_some() || input.final_script_witness.is_some() {
            continue;
        }
        let prevout = spent_output(input, txin).ok_or_else(|| Error::Finalize {
            index,
            reason: "missing previous output".to_string(),
        })?;
        let (script_sig, witness) = final_fields(index, input, &prevout.script_pubkey)?;

        *input = PsbtInput {
            witness_utxo: input.witness_utxo.take(),
            non_witness_utxo: input.non_witness_utxo.take(),
            final_script_sig: script_sig,
            final_script_witness: witness,
            ..Default::default()
        };
    }
    Ok(())
}

fn spent_output(input: &PsbtInput, txin: &TxIn) -> Option<TxOut> {
    if let Some(witness_utxo) = &input.witness_utxo {
        return Some(witness_utxo.clone());
    }
    input
        .non_witness_utxo
        .as_ref()
        .and_then(|tx| tx.output.get(txin.previous_output.vout as usize).cloned())
}

fn final_fields(
    index: usize,
    input: &PsbtInput,
    script_pubkey: &ScriptBuf,
) -> Result<(Option<ScriptBuf>, Option<Witness>)> {
    let fail = |reason: &str| Error::Finalize {
        index,
        reason: reason.to_string(),
    };

    if script_pubkey.is_p2tr() {
        let signature = input.tap_key_sig.ok_or_else(|| fail("missing taproot key signature"))?;
        return Ok((None, Some(Witness::p2tr_key_spend(&signature))));
    }

    let (public_key, signature) = input
        .partial_sigs
        .iter()
        .next()
        .ok_or_else(|| fail("missing partial signature"))?;

    if script_pubkey.is_p2pkh() {
        let signature_bytes =
            PushBytesBuf::try_from(signature.to_vec()).map_err(|_| fail("signature too long"))?;
        let script_sig = Builder::new()
            .push_slice(signature_bytes)
            .push_key(public_key)
            .into_script();
        return Ok((Some(script_sig), None));
    }

    if script_pubkey.is_p2wpkh() {
        return Ok((None, Some(Witness::p2wpkh(signature, &public_key.inner))));
    }

    if script_pubkey.is_p2sh() {
        let redeem_script = input
            .redeem_script
            .as_ref()
            .filter(|script| script.is_p2wpkh())
            .ok_or_else(|| fail("p2sh input without a p2wpkh redeem script"))?;
        let redeem_bytes = PushBytesBuf::try_from(redeem_script.to_bytes())
            .map_err(|_| fail("redeem script too long"))?;
        let script_sig = Builder::new().push_slice(redeem_bytes).into_script();
        return Ok((
            Some(script_sig),
            Some(Witness::p2wpkh(signature, &public_key.inner)),
        ));
    }

    Err(fail("unsupported script type"))
}

/// Extracts the finalized transaction, refusing absurd fee rates.
pub fn extract_transaction(psbt: Psbt) -> Result<Transaction> {
    psbt.extract_tx().map_err(|e| Error::Extract(e.to_string()))
}
