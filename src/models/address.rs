//! Cryptocurrency wallet address types.

use serde::Serialize;

/// Structural family an address was recognised by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressFamily {
    /// Base58 P2PKH/P2SH, `1…` or `3…`.
    BitcoinLegacy,
    /// Bech32 segwit, `bc1…` or `ltc1…`.
    Bech32,
    /// 20-byte hex shared by every EVM chain.
    Evm,
    /// Base58 `T…`.
    Tron,
    /// Shelley bech32 `addr1…`.
    Cardano,
}

impl AddressFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BitcoinLegacy => "bitcoin_legacy",
            Self::Bech32 => "bech32",
            Self::Evm => "evm",
            Self::Tron => "tron",
            Self::Cardano => "cardano",
        }
    }
}

/// An address together with the chain it most likely belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalletAddress {
    pub address: String,
    /// Display label such as "Bitcoin", "Litecoin" or "Polygon".
    pub chain: String,
    pub family: AddressFamily,
}

impl WalletAddress {
    pub fn new(address: impl Into<String>, chain: impl Into<String>, family: AddressFamily) -> Self {
        Self {
            address: address.into(),
            chain: chain.into(),
            family,
        }
    }
}
