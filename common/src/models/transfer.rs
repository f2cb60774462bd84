use serde::{Deserialize, Serialize};

/// Upper bound on transfers kept per lookup
pub const MAX_TRANSFERS: usize = 10;

/// ERC-20 transfer event as reported by the block explorer
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct TransferRecord {
    pub block_number: String,
    pub time_stamp: String,
    pub hash: String,
    pub from: String,
    pub to: String,
    pub contract_address: String,
    pub token_name: String,
    pub token_symbol: String,
    pub token_decimal: String,
    /// Raw token units
    pub value: String,
}

/// Direction of a transfer relative to the watched pair
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Buy,
    Sell,
}

impl TransferRecord {
    /// Tokens flowing into the pair are sells, everything else a buy.
    pub fn direction(&self, pair_address: &str) -> TransferDirection {
        if !pair_address.is_empty() && self.to.eq_ignore_ascii_case(pair_address) {
            TransferDirection::Sell
        } else {
            TransferDirection::Buy
        }
    }
}

impl std::fmt::Display for TransferDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferDirection::Buy => write!(f, "buy"),
            TransferDirection::Sell => write!(f, "sell"),
        }
    }
}
