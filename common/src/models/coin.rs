use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Extended coin metadata from the market-data API.
///
/// The payload is kept as-is; accessors read individual attributes and
/// return `None` when the shape differs from what they expect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct CoinDetail(pub Value);

impl CoinDetail {
    fn str_at(&self, pointer: &str) -> Option<&str> {
        self.0.pointer(pointer).and_then(Value::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.str_at("/id")
    }

    pub fn name(&self) -> Option<&str> {
        self.str_at("/name")
    }

    pub fn symbol(&self) -> Option<&str> {
        self.str_at("/symbol")
    }

    pub fn market_cap_rank(&self) -> Option<u64> {
        self.0.pointer("/market_cap_rank").and_then(Value::as_u64)
    }

    pub fn usd_price(&self) -> Option<f64> {
        self.0
            .pointer("/market_data/current_price/usd")
            .and_then(Value::as_f64)
    }

    /// First homepage link with an http or https scheme
    pub fn homepage(&self) -> Option<&str> {
        self.0
            .pointer("/links/homepage")
            .and_then(Value::as_array)?
            .iter()
            .filter_map(Value::as_str)
            .map(str::trim)
            .find(|link| is_web_link(link))
    }
}

fn is_web_link(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    ["http://", "https://"]
        .iter()
        .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
}
