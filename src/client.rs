use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::utxo::SpendableUtxo;

/// Where UTXO listings come from and where finished transactions go.
#[allow(async_fn_in_trait)]
pub trait UtxoSource {
    /// UTXOs at `address` that carry inscriptions.
    async fn inscription_utxos(&self, address: &str) -> Result<Vec<SpendableUtxo>>;

    /// Plain UTXOs at `address` available to pay fees and amounts.
    async fn payment_utxos(&self, address: &str) -> Result<Vec<SpendableUtxo>>;

    /// Submits a hex-encoded transaction and returns the txid.
    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String>;
}

/// Envelope used by every endpoint of the listing API.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    data: Option<T>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BroadcastRequest<'a> {
    raw_transaction: &'a str,
}

/// HTTP client for the listing / broadcast API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(ApiClient {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, address: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, address, "Fetching UTXO listing");

        let response = self
            .http
            .get(&url)
            .query(&[("address", address)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            warn!(%url, status = status.as_u16(), "Listing request failed");
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        let envelope: ApiResponse<Vec<T>> = response.json().await?;
        Ok(envelope.data.unwrap_or_default())
    }
}

impl UtxoSource for ApiClient {
    async fn inscription_utxos(&self, address: &str) -> Result<Vec<SpendableUtxo>> {
        self.get_list("/getInscriptionUtxoList", address).await
    }

    async fn payment_utxos(&self, address: &str) -> Result<Vec<SpendableUtxo>> {
        self.get_list("/getBtcUtxoList", address).await
    }

    async fn broadcast(&self, raw_tx_hex: &str) -> Result<String> {
        let url = format!("{}/sendRawTransaction", self.base_url);
        let response = self
            .http
            .post(&url)
            .json(&BroadcastRequest {
                raw_transaction: raw_tx_hex,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "Broadcast rejected");
            return Err(Error::Broadcast(body));
        }

        // Some deployments answer 200 with an error payload instead of a txid.
        let envelope: ApiResponse<String> =
            serde_json::from_str(&body).map_err(|_| Error::Broadcast(body.clone()))?;
        match envelope.data {
            Some(txid) => {
                info!(%txid, "Transaction broadcast");
                Ok(txid)
            }
            None => Err(Error::Broadcast(body)),
        }
    }
}
