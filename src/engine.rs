//! Top-level operations: build an unsigned PSBT from live listings, and
//! broadcast one that has come back signed.

use bitcoin::consensus::encode::serialize_hex;
use bitcoin::Network;
use tracing::info;

use crate::client::{ApiClient, UtxoSource};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::fee::FeePolicy;
use crate::finalize::{extract_transaction, finalize_psbt};
use crate::request::{OrdinalTransferRequest, PaymentRequest};
use crate::selector::{CoinSelector, OrdinalLeg, PsbtResult, SelectionRequest};
use crate::transaction::decode_psbt;

pub struct PsbtEngine<S: UtxoSource> {
    source: S,
    selector: CoinSelector,
}

impl PsbtEngine<ApiClient> {
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let client = ApiClient::new(config)?;
        Ok(PsbtEngine::new(client, config.network, config.fee_policy()))
    }
}

impl<S: UtxoSource> PsbtEngine<S> {
    pub fn new(source: S, network: Network, policy: FeePolicy) -> Self {
        PsbtEngine {
            source,
            selector: CoinSelector::new(network, policy),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn network(&self) -> Network {
        self.selector.network()
    }

    /// Builds an unsigned PSBT paying `payment.amount` to `recipient`, moving
    /// the inscription named in `ordinals` as input 0 when given.
    ///
    /// `fee_rate` is in sat/vB. Listings are fetched one after the other,
    /// inscription holder first.
    pub async fn generate_psbt(
        &self,
        payment: &PaymentRequest,
        ordinals: Option<&OrdinalTransferRequest>,
        recipient: &str,
        fee_rate: u64,
    ) -> Result<PsbtResult> {
        // Checked here as well as in the selector so no listing is fetched.
        if fee_rate == 0 {
            return Err(Error::InvalidFeeRate);
        }
        if payment.amount == 0 && ordinals.is_none() {
            return Err(Error::EmptyOutput);
        }

        let ordinal = match ordinals {
            Some(request) => Some(OrdinalLeg {
                request,
                utxos: self.source.inscription_utxos(&request.address).await?,
            }),
            None => None,
        };
        let payment_utxos = self.source.payment_utxos(&payment.address).await?;

        self.selector.select(SelectionRequest {
            payment,
            ordinal,
            recipient,
            fee_rate,
            payment_utxos,
        })
    }

    /// Finalizes a fully signed PSBT, broadcasts it, and returns the txid
    /// reported by the broadcast endpoint.
    pub async fn push_psbt(&self, signed_psbt: &[u8]) -> Result<String> {
        let mut psbt = decode_psbt(signed_psbt)?;
        finalize_psbt(&mut psbt)?;
        let tx = extract_transaction(psbt)?;
        let raw = serialize_hex(&tx);

        info!(txid = %tx.compute_txid(), vsize = tx.vsize(), "Broadcasting signed transaction");
        self.source.broadcast(&raw).await
    }
}
