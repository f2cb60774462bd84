use common::models::{CoinDetail, QueryState, Token, TransferRecord, MAX_TRANSFERS};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Pair address used for transfer lookups whenever a token is clicked.
///
/// The lookup does not depend on which token was selected.
pub const DEFAULT_TRANSFER_PAIR: &str = "0xc5be99a02c6857f9eac67bbce58df5572498f40c";

/// Emitted by the setters when a selection actually changes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionEvent {
    CoinSelected { generation: u64, coin: Token },
    PairSelected { generation: u64, address: String },
}

/// Selection state of the page and the REST results derived from it.
///
/// Every change bumps a generation counter. Fetch results carry the
/// generation they were started for and are dropped when it is no longer
/// current, so a slow response for an old selection cannot overwrite a newer
/// one.
#[derive(Debug)]
pub struct ViewState {
    selected_coin: Option<Token>,
    selected_pair: String,
    coin_detail: QueryState<CoinDetail>,
    transfers: QueryState<Vec<TransferRecord>>,
    coin_generation: u64,
    pair_generation: u64,
    events: mpsc::UnboundedSender<SelectionEvent>,
}

/// Point-in-time copy handed to the renderer
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ViewSnapshot {
    pub selected_coin: Option<Token>,
    pub selected_pair: Option<String>,
    pub coin_detail: QueryState<CoinDetail>,
    pub transfers: QueryState<Vec<TransferRecord>>,
}

impl ViewState {
    /// Create an empty view state and the receiving end of its event stream.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SelectionEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let state = Self {
            selected_coin: None,
            selected_pair: String::new(),
            coin_detail: QueryState::Idle,
            transfers: QueryState::Idle,
            coin_generation: 0,
            pair_generation: 0,
            events,
        };
        (state, rx)
    }

    pub fn selected_coin(&self) -> Option<&Token> {
        self.selected_coin.as_ref()
    }

    pub fn selected_pair(&self) -> Option<&str> {
        Some(self.selected_pair.as_str()).filter(|address| !address.is_empty())
    }

    pub fn coin_generation(&self) -> u64 {
        self.coin_generation
    }

    pub fn pair_generation(&self) -> u64 {
        self.pair_generation
    }

    /// Click on a token row: select the coin and point transfer lookups at
    /// the fixed pair address.
    pub fn select_token(&mut self, token: Token) {
        self.select_coin(token);
        self.select_pair(DEFAULT_TRANSFER_PAIR);
    }

    /// Select a coin. Returns the generation of the selection.
    pub fn select_coin(&mut self, coin: Token) -> u64 {
        if self.selected_coin.as_ref() == Some(&coin) {
            return self.coin_generation;
        }

        self.coin_generation += 1;
        info!("Selected coin {} ({})", coin.symbol, coin.id);
        self.selected_coin = Some(coin.clone());
        self.coin_detail = QueryState::Idle;
        self.emit(SelectionEvent::CoinSelected {
            generation: self.coin_generation,
            coin,
        });
        self.coin_generation
    }

    /// Select the pair whose transfers are listed. Any string is accepted;
    /// an empty address clears the trades section without a lookup.
    pub fn select_pair(&mut self, address: impl Into<String>) -> u64 {
        let address = address.into();
        if address == self.selected_pair {
            return self.pair_generation;
        }

        self.pair_generation += 1;
        self.selected_pair = address.clone();

        if address.is_empty() {
            self.transfers = QueryState::Idle;
        } else {
            info!("Selected pair {}", address);
            self.transfers = QueryState::Loading;
            self.emit(SelectionEvent::PairSelected {
                generation: self.pair_generation,
                address,
            });
        }
        self.pair_generation
    }

    /// Mark the coin detail of `generation` as being fetched.
    pub fn begin_coin_detail(&mut self, generation: u64) -> bool {
        if generation != self.coin_generation {
            return false;
        }
        self.coin_detail = QueryState::Loading;
        true
    }

    /// Store a coin-detail outcome unless its selection has been superseded.
    pub fn apply_coin_detail<E: std::fmt::Display>(
        &mut self,
        generation: u64,
        outcome: Result<CoinDetail, E>,
    ) -> bool {
        if generation != self.coin_generation {
            debug!(
                "Dropping coin detail for generation {} (current {})",
                generation, self.coin_generation
            );
            return false;
        }
        self.coin_detail.resolve(outcome)
    }

    /// Store a transfer lookup outcome unless its selection has been
    /// superseded. At most [`MAX_TRANSFERS`] records are kept.
    pub fn apply_transfers<E: std::fmt::Display>(
        &mut self,
        generation: u64,
        outcome: Result<Vec<TransferRecord>, E>,
    ) -> bool {
        if generation != self.pair_generation {
            debug!(
                "Dropping transfers for generation {} (current {})",
                generation, self.pair_generation
            );
            return false;
        }
        let outcome = outcome.map(|mut transfers| {
            transfers.truncate(MAX_TRANSFERS);
            transfers
        });
        self.transfers.resolve(outcome)
    }

    /// Forget the selection, as on a fresh page load. Outstanding fetches
    /// become stale.
    pub fn reset(&mut self) {
        self.selected_coin = None;
        self.selected_pair.clear();
        self.coin_detail = QueryState::Idle;
        self.transfers = QueryState::Idle;
        self.coin_generation += 1;
        self.pair_generation += 1;
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        ViewSnapshot {
            selected_coin: self.selected_coin.clone(),
            selected_pair: self.selected_pair().map(str::to_string),
            coin_detail: self.coin_detail.clone(),
            transfers: self.transfers.clone(),
        }
    }

    fn emit(&self, event: SelectionEvent) {
        if self.events.send(event).is_err() {
            debug!("Selection watcher is gone, event dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn token(id: &str, symbol: &str) -> Token {
        Token {
            id: id.to_string(),
            symbol: symbol.to_string(),
            ..Default::default()
        }
    }

    fn transfers(n: usize) -> Vec<TransferRecord> {
        (0..n)
            .map(|i| TransferRecord {
                hash: format!("0x{:02}", i),
                ..Default::default()
            })
            .collect()
    }

    #[test]
    fn any_token_selects_the_fixed_pair() {
        let (mut state, mut rx) = ViewState::new();

        state.select_token(token("0xaaa", "AAA"));
        assert_eq!(state.selected_pair(), Some(DEFAULT_TRANSFER_PAIR));

        state.select_token(token("0xbbb", "BBB"));
        assert_eq!(state.selected_pair(), Some(DEFAULT_TRANSFER_PAIR));
        assert_eq!(state.selected_coin().map(|c| c.id.as_str()), Some("0xbbb"));

        // Coin, pair, then only the second coin: the pair did not change.
        assert!(matches!(rx.try_recv(), Ok(SelectionEvent::CoinSelected { generation: 1, .. })));
        assert!(matches!(rx.try_recv(), Ok(SelectionEvent::PairSelected { generation: 1, .. })));
        assert!(matches!(rx.try_recv(), Ok(SelectionEvent::CoinSelected { generation: 2, .. })));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn reselecting_same_coin_emits_nothing() {
        let (mut state, mut rx) = ViewState::new();
        let first = state.select_coin(token("0xaaa", "AAA"));
        let second = state.select_coin(token("0xaaa", "AAA"));

        assert_eq!(first, second);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_pair_does_not_trigger_lookup() {
        let (mut state, mut rx) = ViewState::new();
        state.select_pair("0xpair");
        rx.try_recv().unwrap();

        state.select_pair("");
        assert_eq!(state.selected_pair(), None);
        assert_eq!(state.snapshot().transfers, QueryState::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn transfers_are_capped() {
        let (mut state, _rx) = ViewState::new();
        let generation = state.select_pair("0xpair");

        assert!(state.apply_transfers::<String>(generation, Ok(transfers(25))));
        let snapshot = state.snapshot();
        assert_eq!(snapshot.transfers.ready().map(Vec::len), Some(MAX_TRANSFERS));
    }

    #[test]
    fn stale_transfers_are_discarded() {
        let (mut state, _rx) = ViewState::new();
        let old = state.select_pair("0xold");
        let new = state.select_pair("0xnew");

        assert!(!state.apply_transfers::<String>(old, Ok(transfers(3))));
        assert!(state.snapshot().transfers.is_loading());

        assert!(state.apply_transfers::<String>(new, Ok(transfers(1))));
        assert_eq!(state.snapshot().transfers.ready().map(Vec::len), Some(1));
    }

    #[test]
    fn failed_lookup_leaves_no_rows() {
        let (mut state, _rx) = ViewState::new();
        let generation = state.select_pair("0xpair");

        assert!(state.apply_transfers::<&str>(generation, Err("connection reset")));
        let snapshot = state.snapshot();
        assert!(snapshot.transfers.ready().is_none());
        assert_eq!(snapshot.transfers.error(), Some("connection reset"));
    }

    #[test]
    fn coin_detail_follows_latest_selection() {
        let (mut state, _rx) = ViewState::new();
        let old = state.select_coin(token("open", "OPEN"));
        assert!(state.begin_coin_detail(old));

        let new = state.select_coin(token("other", "OTHER"));
        assert!(!state.apply_coin_detail::<String>(old, Ok(CoinDetail(json!({ "id": "open" })))));
        assert_eq!(state.snapshot().coin_detail, QueryState::Idle);

        assert!(!state.begin_coin_detail(old));
        assert!(state.begin_coin_detail(new));
        assert!(state.apply_coin_detail::<String>(new, Ok(CoinDetail(json!({ "id": "other" })))));
        assert_eq!(
            state.snapshot().coin_detail.ready().and_then(|d| d.id()),
            Some("other")
        );
    }

    #[test]
    fn reset_invalidates_in_flight_results() {
        let (mut state, _rx) = ViewState::new();
        state.select_token(token("0xaaa", "AAA"));
        let generation = state.pair_generation();

        state.reset();
        assert!(state.selected_coin().is_none());
        assert!(!state.apply_transfers::<String>(generation, Ok(transfers(2))));
        assert_eq!(state.snapshot(), ViewSnapshot::default());
    }
}
