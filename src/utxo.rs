use std::str::FromStr;

use bitcoin::{OutPoint, Txid};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Error, Result};

/// An unspent output as reported by the UTXO listing endpoints.
///
/// The payment listing omits `inscriptions`; it defaults to empty. Entries are
/// read-only for the engine: they are filtered and sorted, never mutated.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SpendableUtxo {
    pub txid: String,
    pub vout: u32,
    /// Value in satoshis. The listing sends it either as a number or a string.
    #[serde(deserialize_with = "amount_serde::deserialize")]
    pub amount: u64,
    #[serde(default)]
    pub is_spent: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inscriptions: Vec<Inscription>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Inscription {
    pub inscription_id: String,
}

impl SpendableUtxo {
    pub fn outpoint(&self) -> Result<OutPoint> {
        let txid = Txid::from_str(&self.txid).map_err(|_| Error::InvalidTxid(self.txid.clone()))?;
        Ok(OutPoint::new(txid, self.vout))
    }

    /// Exact identifier match only.
    pub fn carries_inscription(&self, inscription_id: &str) -> bool {
        self.inscriptions
            .iter()
            .any(|inscription| inscription.inscription_id == inscription_id)
    }
}

/// Drops entries the listing already flags as spent.
pub fn unspent(utxos: Vec<SpendableUtxo>) -> Vec<SpendableUtxo> {
    utxos.into_iter().filter(|utxo| !utxo.is_spent).collect()
}

mod amount_serde {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(u64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Amount::deserialize(deserializer)? {
            Amount::Number(value) => Ok(value),
            Amount::Text(text) => text.trim().parse().map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TXID: &str = "dd3d962f95741f2f5c3b87d6395c325baa75c4f3f04c7652e258f6005d70f3e8";

    #[test]
    fn test_inscription_utxo_from_listing() {
        let json = format!(
            r#"{{"txid":"{TXID}","vout":1,"amount":"10000","isSpent":false,
                "inscriptions":[{{"inscriptionId":"{TXID}i0"}}]}}"#
        );
        let utxo: SpendableUtxo = serde_json::from_str(&json).unwrap();

        assert_eq!(utxo.amount, 10000);
        assert_eq!(utxo.vout, 1);
        assert!(!utxo.is_spent);
        assert!(utxo.carries_inscription(&format!("{TXID}i0")));
        assert!(!utxo.carries_inscription(&format!("{TXID}i1")));
        assert!(!utxo.carries_inscription(TXID));
    }

    #[test]
    fn test_payment_utxo_defaults() {
        let json = format!(r#"{{"txid":"{TXID}","vout":0,"amount":50000}}"#);
        let utxo: SpendableUtxo = serde_json::from_str(&json).unwrap();

        assert_eq!(utxo.amount, 50000);
        assert!(!utxo.is_spent);
        assert!(utxo.inscriptions.is_empty());
        assert_eq!(utxo.outpoint().unwrap().vout, 0);
    }

    #[test]
    fn test_unspent_filter() {
        let make = |vout, is_spent| SpendableUtxo {
            txid: TXID.to_string(),
            vout,
            amount: 1000,
            is_spent,
            inscriptions: Vec::new(),
        };
        let filtered = unspent(vec![make(0, true), make(1, false), make(2, true)]);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].vout, 1);
    }

    #[test]
    fn test_bad_txid() {
        let utxo = SpendableUtxo {
            txid: "not-a-txid".to_string(),
            vout: 0,
            amount: 1,
            is_spent: false,
            inscriptions: Vec::new(),
        };
        assert!(matches!(utxo.outpoint(), Err(Error::InvalidTxid(_))));
    }
}
