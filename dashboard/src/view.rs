//! View model for the dashboard page.
//!
//! [`build`] is a pure function of a [`DashboardSnapshot`]. Every field it
//! reads may be absent or malformed upstream; such values render blank
//! instead of failing.

use crate::service::DashboardSnapshot;
use chrono::DateTime;
use common::{
    models::{CoinDetail, PairToken, QueryState, TransferDirection, MAX_TRANSFERS},
    numeric,
};
use serde::Serialize;

/// Pair cards shown below the grid
pub const MAX_PAIR_ROWS: usize = 25;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardView {
    /// Prices stay blank until the ETH price lands
    pub eth_price_loading: bool,
    pub tokens: TokenSection,
    pub selection: SelectionSection,
    pub trades: TradeSection,
    pub pairs: PairSection,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TokenSection {
    pub loading: bool,
    pub rows: Vec<TokenRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TokenRow {
    pub id: String,
    pub symbol: String,
    /// USD price with two decimals, blank when it cannot be computed
    pub price: String,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SelectionSection {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub total_liquidity: String,
    pub detail: Option<CoinDetailView>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CoinDetailView {
    pub name: String,
    pub symbol: String,
    pub usd_price: String,
    pub market_cap_rank: Option<u64>,
    pub homepage: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeSection {
    pub loading: bool,
    pub rows: Vec<TradeRow>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TradeRow {
    pub hash: String,
    pub token_name: String,
    pub value: String,
    pub direction: TransferDirection,
    pub time: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairSection {
    pub loading: bool,
    pub cards: Vec<PairCard>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairCard {
    pub id: String,
    /// "SYM0 X SYM1"
    pub title: String,
    pub token0: PairSide,
    pub token1: PairSide,
    pub created: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairSide {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: String,
}

pub fn build(snapshot: &DashboardSnapshot) -> DashboardView {
    let eth_price = snapshot
        .subgraph
        .eth_price
        .ready()
        .map(|price| price.usd.as_str());

    DashboardView {
        eth_price_loading: snapshot.subgraph.eth_price.is_loading(),
        tokens: token_section(snapshot, eth_price),
        selection: selection_section(snapshot),
        trades: trade_section(snapshot),
        pairs: pair_section(snapshot, eth_price),
    }
}

fn price_in_usd(derived_eth: &str, eth_price: Option<&str>) -> String {
    eth_price
        .and_then(|eth| numeric::usd_price(derived_eth, eth))
        .unwrap_or_default()
}

fn format_timestamp(raw: &str) -> String {
    raw.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|time| time.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default()
}

fn token_section(snapshot: &DashboardSnapshot, eth_price: Option<&str>) -> TokenSection {
    let tokens = &snapshot.subgraph.tokens;
    let rows = tokens
        .ready()
        .map(|tokens| {
            tokens
                .iter()
                .map(|token| TokenRow {
                    id: token.id.clone(),
                    symbol: token.symbol.clone(),
                    price: price_in_usd(&token.derived_eth, eth_price),
                })
                .collect()
        })
        .unwrap_or_default();

    TokenSection {
        loading: tokens.is_loading(),
        rows,
    }
}

fn selection_section(snapshot: &DashboardSnapshot) -> SelectionSection {
    let Some(coin) = snapshot.view.selected_coin.as_ref() else {
        return SelectionSection::default();
    };

    SelectionSection {
        id: coin.id.clone(),
        name: coin.name.clone(),
        symbol: coin.symbol.clone(),
        total_liquidity: coin.total_liquidity.clone(),
        detail: snapshot.view.coin_detail.ready().map(coin_detail_view),
    }
}

fn coin_detail_view(detail: &CoinDetail) -> CoinDetailView {
    CoinDetailView {
        name: detail.name().unwrap_or_default().to_string(),
        symbol: detail.symbol().unwrap_or_default().to_uppercase(),
        usd_price: detail
            .usd_price()
            .and_then(|price| numeric::format_amount(&price.to_string()))
            .unwrap_or_default(),
        market_cap_rank: detail.market_cap_rank(),
        homepage: detail.homepage().map(str::to_string),
    }
}

fn trade_section(snapshot: &DashboardSnapshot) -> TradeSection {
    let pair = snapshot.view.selected_pair.as_deref().unwrap_or_default();
    let rows = match &snapshot.view.transfers {
        QueryState::Ready(transfers) => transfers
            .iter()
            .take(MAX_TRANSFERS)
            .map(|transfer| TradeRow {
                hash: transfer.hash.clone(),
                token_name: transfer.token_name.clone(),
                value: numeric::format_amount(&transfer.value).unwrap_or_default(),
                direction: transfer.direction(pair),
                time: format_timestamp(&transfer.time_stamp),
            })
            .collect(),
        _ => Vec::new(),
    };

    TradeSection {
        loading: snapshot.view.transfers.is_loading(),
        rows,
    }
}

fn pair_side(token: &PairToken, eth_price: Option<&str>) -> PairSide {
    PairSide {
        id: token.id.clone(),
        symbol: token.symbol.clone(),
        name: token.name.clone(),
        price: price_in_usd(&token.derived_eth, eth_price),
    }
}

fn pair_section(snapshot: &DashboardSnapshot, eth_price: Option<&str>) -> PairSection {
    let pairs = &snapshot.subgraph.pairs;
    let cards = pairs
        .ready()
        .map(|pairs| {
            pairs
                .iter()
                .take(MAX_PAIR_ROWS)
                .map(|pair| PairCard {
                    id: pair.id.clone(),
                    title: format!("{} X {}", pair.token0.symbol, pair.token1.symbol),
                    token0: pair_side(&pair.token0, eth_price),
                    token1: pair_side(&pair.token1, eth_price),
                    created: format_timestamp(&pair.created_at_timestamp),
                })
                .collect()
        })
        .unwrap_or_default();

    PairSection {
        loading: pairs.is_loading(),
        cards,
    }
}
