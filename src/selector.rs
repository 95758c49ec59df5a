//! Coin selection driven by dummy-transaction fee measurement.
//!
//! Two builders are kept side by side. The real one carries the owners'
//! keys and is what the caller receives. The dummy one carries the
//! placeholder key and exists only to be signed and measured; it never
//! leaves this module.

use std::ops::ControlFlow;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bitcoin::{Network, Psbt};
use serde::Serialize;
use tracing::{debug, info};

use crate::address::AddressType;
use crate::error::{Error, Result};
use crate::fee::{FeeEstimator, FeePolicy};
use crate::request::{OrdinalTransferRequest, PaymentRequest};
use crate::script::DescriptorPair;
use crate::transaction::{decode_psbt, TransactionBuilder};
use crate::utxo::{unspent, SpendableUtxo};

/// The inscription holder and the inscription UTXO listing for its address.
#[derive(Debug, Clone)]
pub struct OrdinalLeg<'a> {
    pub request: &'a OrdinalTransferRequest,
    pub utxos: Vec<SpendableUtxo>,
}

/// Everything one selection needs, with listings already fetched.
#[derive(Debug, Clone)]
pub struct SelectionRequest<'a> {
    pub payment: &'a PaymentRequest,
    pub ordinal: Option<OrdinalLeg<'a>>,
    pub recipient: &'a str,
    /// sat/vB, must be positive
    pub fee_rate: u64,
    pub payment_utxos: Vec<SpendableUtxo>,
}

/// An unsigned PSBT ready for an external signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PsbtResult {
    #[serde(skip)]
    pub psbt: Vec<u8>,
    pub psbt_base64: String,
    /// Payment UTXOs consumed, not counting the inscription input.
    pub payment_utxo_count: usize,
    /// Whether input 0 is the inscription-bearing UTXO.
    pub ordinal_input: bool,
    /// Input value minus output value of the returned transaction.
    pub fee: u64,
}

impl PsbtResult {
    fn from_builder(
        builder: &TransactionBuilder,
        payment_utxo_count: usize,
        ordinal_input: bool,
    ) -> Result<Self> {
        let psbt = builder.to_bytes()?;
        Ok(PsbtResult {
            psbt_base64: BASE64.encode(&psbt),
            psbt,
            payment_utxo_count,
            ordinal_input,
            fee: builder.input_value() - builder.output_value(),
        })
    }

    pub fn decode(&self) -> Result<Psbt> {
        decode_psbt(&self.psbt)
    }
}

struct SelectionState {
    real: TransactionBuilder,
    dummy: TransactionBuilder,
    total_input_value: u64,
    payment_utxo_count: usize,
    ordinal_input: bool,
    last_fee: u64,
}

impl SelectionState {
    fn new(network: Network, min_relay_fee: u64) -> Self {
        SelectionState {
            real: TransactionBuilder::new(network),
            dummy: TransactionBuilder::new(network),
            total_input_value: 0,
            payment_utxo_count: 0,
            ordinal_input: false,
            last_fee: min_relay_fee,
        }
    }

    fn push_input(&mut self, pair: DescriptorPair) {
        self.total_input_value = self
            .total_input_value
            .saturating_add(pair.real.amount.to_sat());
        self.real.add_input(pair.real);
        self.dummy.add_input(pair.dummy);
    }

    fn add_output(&mut self, address: &str, amount: u64) -> Result<()> {
        self.real.add_output(address, amount)?;
        self.dummy.add_output(address, amount)
    }
}

/// Per-call values shared by every fold step.
struct Payer<'a> {
    request: &'a PaymentRequest,
    public_key: Vec<u8>,
    /// Amount the recipient output carries, inscription value included.
    amount: u64,
    fee_rate: u64,
}

pub struct CoinSelector {
    network: Network,
    estimator: FeeEstimator,
}

impl CoinSelector {
    pub fn new(network: Network, policy: FeePolicy) -> Self {
        CoinSelector {
            network,
            estimator: FeeEstimator::new(policy),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Builds the unsigned PSBT or fails; never returns a partial result.
    ///
    /// Order of work: optional inscription input first, then the recipient
    /// output, then payment UTXOs largest first until input value covers
    /// the amount plus the measured fee.
    pub fn select(&self, request: SelectionRequest<'_>) -> Result<PsbtResult> {
        if request.fee_rate == 0 {
            return Err(Error::InvalidFeeRate);
        }
        let policy = *self.estimator.policy();
        let mut state = SelectionState::new(self.network, policy.min_relay_fee);
        let mut amount = request.payment.amount;

        if let Some(leg) = request.ordinal {
            let utxo = find_inscription_utxo(leg.request, leg.utxos)?;
            let pair = self.descriptor_pair(
                leg.request.address_type,
                &leg.request.public_key_bytes()?,
                &utxo,
            )?;
            state.push_input(pair);
            state.ordinal_input = true;
            amount = amount.saturating_add(utxo.amount);
            info!(
                inscription_id = %leg.request.inscription_id,
                outpoint = %format!("{}:{}", utxo.txid, utxo.vout),
                value = utxo.amount,
                "Inscription UTXO selected as input 0"
            );
        }

        if amount == 0 {
            return Err(Error::EmptyOutput);
        }
        state.add_output(request.recipient, amount)?;

        let mut pool = unspent(request.payment_utxos);
        if pool.is_empty() {
            return Err(Error::NoPaymentUtxos {
                address: request.payment.address.clone(),
            });
        }
        pool.sort_by(|a, b| b.amount.cmp(&a.amount));
        debug!(
            candidates = pool.len(),
            amount,
            fee_rate = request.fee_rate,
            "Selecting payment UTXOs"
        );

        let payer = Payer {
            request: request.payment,
            public_key: request.payment.public_key_bytes()?,
            amount,
            fee_rate: request.fee_rate,
        };

        let outcome = pool.iter().try_fold(state, |state, utxo| {
            match self.step(&payer, state, utxo) {
                Ok(ControlFlow::Continue(next)) => ControlFlow::Continue(next),
                Ok(ControlFlow::Break(result)) => ControlFlow::Break(Ok(result)),
                Err(e) => ControlFlow::Break(Err(e)),
            }
        });

        match outcome {
            ControlFlow::Break(result) => result,
            ControlFlow::Continue(state) => {
                let required = amount.saturating_add(state.last_fee);
                info!(
                    available = state.total_input_value,
                    required,
                    "Payment UTXOs exhausted"
                );
                Err(Error::InsufficientFunds {
                    available: state.total_input_value,
                    required,
                })
            }
        }
    }

    fn step(
        &self,
        payer: &Payer<'_>,
        mut state: SelectionState,
        utxo: &SpendableUtxo,
    ) -> Result<ControlFlow<PsbtResult, SelectionState>> {
        let pair = self.descriptor_pair(payer.request.address_type, &payer.public_key, utxo)?;
        state.push_input(pair);
        state.payment_utxo_count += 1;

        let quote = self.estimator.measure(&state.dummy, payer.fee_rate)?;
        state.last_fee = quote.fee;
        if state.total_input_value < payer.amount.saturating_add(quote.fee) {
            debug!(
                total = state.total_input_value,
                fee = quote.fee,
                "Still short after {} payment UTXOs",
                state.payment_utxo_count
            );
            return Ok(ControlFlow::Continue(state));
        }

        // Re-measure as if a change output existed; only the dummy gets it.
        state.dummy.add_output(&payer.request.address, quote.fee)?;
        let quote = self.estimator.measure(&state.dummy, payer.fee_rate)?;

        let headroom = self.estimator.policy().change_headroom(payer.fee_rate);
        let threshold = payer
            .amount
            .saturating_add(headroom)
            .saturating_add(quote.fee);
        if state.total_input_value >= threshold {
            let change = state.total_input_value - payer.amount - quote.fee;
            state.real.add_output(&payer.request.address, change)?;
            debug!(change, "Change output added");
        } else {
            debug!(
                excess = state.total_input_value - payer.amount,
                "Leftover below change threshold, absorbed into fee"
            );
        }

        let result =
            PsbtResult::from_builder(&state.real, state.payment_utxo_count, state.ordinal_input)?;
        info!(
            inputs = state.real.inputs().len(),
            outputs = state.real.outputs().len(),
            fee = result.fee,
            "PSBT generated"
        );
        Ok(ControlFlow::Break(result))
    }

    fn descriptor_pair(
        &self,
        address_type: AddressType,
        public_key: &[u8],
        utxo: &SpendableUtxo,
    ) -> Result<DescriptorPair> {
        let signer = self.estimator.signer();
        DescriptorPair::new(
            signer.secp(),
            address_type,
            public_key,
            &signer.public_key_bytes(),
            utxo,
        )
    }
}

fn find_inscription_utxo(
    request: &OrdinalTransferRequest,
    utxos: Vec<SpendableUtxo>,
) -> Result<SpendableUtxo> {
    if utxos.is_empty() {
        return Err(Error::NoInscriptionUtxos {
            address: request.address.clone(),
        });
    }
    unspent(utxos)
        .into_iter()
        .find(|utxo| utxo.carries_inscription(&request.inscription_id))
        .ok_or_else(|| Error::InscriptionNotFound {
            inscription_id: request.inscription_id.clone(),
        })
}
