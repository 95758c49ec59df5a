use std::fmt;
use std::str::FromStr;

use bitcoin::Network;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// The output types a payer or inscription holder can spend from.
///
/// The lowercase tag (`p2pkh`, `p2sh`, `p2sh_p2wpkh`, `p2wpkh`, `p2tr`) is the
/// only accepted representation, both in JSON and when parsed from text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressType {
    /// Legacy pay-to-public-key-hash
    P2pkh,
    /// Bare pay-to-script-hash. Resolved as a wrapped P2WPKH program.
    P2sh,
    /// P2WPKH nested in P2SH
    P2shP2wpkh,
    /// Native segwit v0
    P2wpkh,
    /// Taproot key-path
    P2tr,
}

impl AddressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::P2pkh => "p2pkh",
            AddressType::P2sh => "p2sh",
            AddressType::P2shP2wpkh => "p2sh_p2wpkh",
            AddressType::P2wpkh => "p2wpkh",
            AddressType::P2tr => "p2tr",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "p2pkh" => Ok(AddressType::P2pkh),
            "p2sh" => Ok(AddressType::P2sh),
            "p2sh_p2wpkh" => Ok(AddressType::P2shP2wpkh),
            "p2wpkh" => Ok(AddressType::P2wpkh),
            "p2tr" => Ok(AddressType::P2tr),
            other => Err(Error::UnsupportedAddressType(other.to_string())),
        }
    }
}

impl Serialize for AddressType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for AddressType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let tag = String::deserialize(deserializer)?;
        tag.parse().map_err(serde::de::Error::custom)
    }
}

// Serialization for Network through a local mirror enum, so config files
// carry plain lowercase names.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Bitcoin,
    Testnet,
    Signet,
    Regtest,
}

impl From<Network> for NetworkType {
    fn from(network: Network) -> Self {
        match network {
            Network::Bitcoin => NetworkType::Bitcoin,
            Network::Testnet => NetworkType::Testnet,
            Network::Signet => NetworkType::Signet,
            Network::Regtest => NetworkType::Regtest,
            // Testnet4 and later variants share testnet address encoding
            _ => NetworkType::Testnet,
        }
    }
}

impl From<NetworkType> for Network {
    fn from(network: NetworkType) -> Self {
        match network {
            NetworkType::Bitcoin => Network::Bitcoin,
            NetworkType::Testnet => Network::Testnet,
            NetworkType::Signet => Network::Signet,
            NetworkType::Regtest => Network::Regtest,
        }
    }
}

/// `#[serde(with = "network_serde")]` adapter for `bitcoin::Network` fields.
pub mod network_serde {
    use super::*;

    pub fn serialize<S>(network: &Network, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        NetworkType::from(*network).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Network, D::Error>
    where
        D: Deserializer<'de>,
    {
        let network_type = NetworkType::deserialize(deserializer)?;
        Ok(Network::from(network_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_conversion() {
        let network_type = NetworkType::from(Network::Testnet);
        assert!(matches!(network_type, NetworkType::Testnet));

        let converted_back = Network::from(network_type);
        assert!(matches!(converted_back, Network::Testnet));
    }

    #[test]
    fn test_address_type_tags() {
        for tag in ["p2pkh", "p2sh", "p2sh_p2wpkh", "p2wpkh", "p2tr"] {
            let parsed: AddressType = tag.parse().unwrap();
            assert_eq!(parsed.to_string(), tag);
        }
    }

    #[test]
    fn test_unknown_address_type_is_rejected() {
        let err = "p2wsh".parse::<AddressType>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedAddressType(tag) if tag == "p2wsh"));

        // numeric codes are not a second encoding
        assert!("3".parse::<AddressType>().is_err());
    }

    #[test]
    fn test_address_type_json() {
        let json = serde_json::to_string(&AddressType::P2shP2wpkh).unwrap();
        assert_eq!(json, "\"p2sh_p2wpkh\"");

        let parsed: AddressType = serde_json::from_str("\"p2tr\"").unwrap();
        assert_eq!(parsed, AddressType::P2tr);

        assert!(serde_json::from_str::<AddressType>("\"segwit\"").is_err());
    }
}
