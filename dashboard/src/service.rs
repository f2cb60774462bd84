use crate::config::CoinDetailGate;
use common::{
    models::{EthPrice, Pair, QueryState, Token, TokenDetail},
    Error, Result,
};
use connectors::{
    queries, ExplorerConnector, FetchPolicy, MarketDataConnector, SubgraphConnector,
};
use serde::Serialize;
use std::sync::Arc;
use store::{SelectionEvent, ViewSnapshot, ViewState};
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// The three subgraph slots shown on the page
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SubgraphData {
    pub tokens: QueryState<Vec<Token>>,
    pub pairs: QueryState<Vec<Pair>>,
    pub eth_price: QueryState<EthPrice>,
    /// Bumped per load so a superseded load cannot settle newer slots
    #[serde(skip)]
    load_generation: u64,
}

/// Everything the renderer needs, copied out of the shared state
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DashboardSnapshot {
    pub subgraph: SubgraphData,
    pub view: ViewSnapshot,
}

/// Loads subgraph data and runs the selection-driven REST lookups
#[derive(Clone)]
pub struct DashboardService {
    subgraph: Arc<dyn SubgraphConnector>,
    market: Arc<dyn MarketDataConnector>,
    explorer: Arc<dyn ExplorerConnector>,
    data: Arc<RwLock<SubgraphData>>,
    view: Arc<RwLock<ViewState>>,
    gate: CoinDetailGate,
}

impl DashboardService {
    /// Build the service and the receiver for its selection events.
    ///
    /// Hand the receiver to [`DashboardService::spawn_watcher`].
    pub fn new(
        subgraph: Arc<dyn SubgraphConnector>,
        market: Arc<dyn MarketDataConnector>,
        explorer: Arc<dyn ExplorerConnector>,
        gate: CoinDetailGate,
    ) -> (Self, mpsc::UnboundedReceiver<SelectionEvent>) {
        let (view, events) = ViewState::new();
        let service = Self {
            subgraph,
            market,
            explorer,
            data: Arc::new(RwLock::new(SubgraphData::default())),
            view: Arc::new(RwLock::new(view)),
            gate,
        };
        (service, events)
    }

    /// Mark the three slots loading and fetch them concurrently in the
    /// background. Each slot settles on its own as its query completes.
    pub async fn start_load(&self, policy: FetchPolicy) -> JoinHandle<()> {
        let generation = {
            let mut data = self.data.write().await;
            data.load_generation += 1;
            data.tokens = QueryState::Loading;
            data.pairs = QueryState::Loading;
            data.eth_price = QueryState::Loading;
            data.load_generation
        };

        info!("Loading subgraph data (load {}, {:?})", generation, policy);

        let service = self.clone();
        tokio::spawn(async move {
            tokio::join!(
                service.load_tokens(generation, policy),
                service.load_pairs(generation, policy),
                service.load_eth_price(generation, policy),
            );
            debug!("Load {} finished", generation);
        })
    }

    /// Forget the selection and refetch everything from the network.
    pub async fn reload(&self) -> JoinHandle<()> {
        self.view.write().await.reset();
        self.subgraph.clear_cache().await;
        self.start_load(FetchPolicy::NetworkOnly).await
    }

    async fn load_tokens(&self, generation: u64, policy: FetchPolicy) {
        let outcome = self.subgraph.get_tokens(policy).await;
        match &outcome {
            Ok(tokens) => info!("Loaded {} tokens", tokens.len()),
            Err(e) => warn!("Token query failed: {}", e),
        }
        let mut data = self.data.write().await;
        if data.load_generation == generation {
            data.tokens.resolve(outcome);
        }
    }

    async fn load_pairs(&self, generation: u64, policy: FetchPolicy) {
        let outcome = self.subgraph.get_pairs(policy).await;
        match &outcome {
            Ok(pairs) => info!("Loaded {} pairs", pairs.len()),
            Err(e) => warn!("Pair query failed: {}", e),
        }
        let mut data = self.data.write().await;
        if data.load_generation == generation {
            data.pairs.resolve(outcome);
        }
    }

    async fn load_eth_price(&self, generation: u64, policy: FetchPolicy) {
        let outcome = self.subgraph.get_eth_price(policy).await;
        match &outcome {
            Ok(price) => info!("ETH price is {} USD", price.usd),
            Err(e) => warn!("ETH price query failed: {}", e),
        }
        let mut data = self.data.write().await;
        if data.load_generation == generation {
            data.eth_price.resolve(outcome);
        }
    }

    /// Select a token from the loaded list by id.
    pub async fn select_token(&self, token_id: &str) -> Result<()> {
        let data = self.data.read().await;
        let token = data
            .tokens
            .ready()
            .and_then(|tokens| tokens.iter().find(|t| t.id == token_id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("Token '{}' is not in the loaded list", token_id)))?;
        drop(data);

        self.view.write().await.select_token(token);
        Ok(())
    }

    /// Single-token query for a validated address.
    pub async fn token_detail(&self, address: &str, block: Option<u64>) -> Result<TokenDetail> {
        let address = address.to_lowercase();
        if !queries::is_valid_address(&address) {
            return Err(Error::InvalidInput(format!(
                "'{}' is not a contract address",
                address
            )));
        }
        self.subgraph.get_token_detail(&address, block).await
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        let subgraph = self.data.read().await.clone();
        let view = self.view.read().await.snapshot();
        DashboardSnapshot { subgraph, view }
    }

    /// Consume selection events until the sender side is dropped.
    pub fn spawn_watcher(&self, mut events: mpsc::UnboundedReceiver<SelectionEvent>) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                service.dispatch(event).await;
            }
            debug!("Selection watcher stopped");
        })
    }

    /// Start the lookup an event calls for. The returned task is not
    /// awaited by the watcher; its result is applied to the view state only
    /// if the selection is still current when it lands.
    pub async fn dispatch(&self, event: SelectionEvent) -> Option<JoinHandle<()>> {
        match event {
            SelectionEvent::CoinSelected { generation, coin } => {
                if !self.gate.allows(&coin.id) {
                    debug!("No coin detail lookup for '{}'", coin.id);
                    return None;
                }
                if !self.view.write().await.begin_coin_detail(generation) {
                    return None;
                }

                let market = Arc::clone(&self.market);
                let view = Arc::clone(&self.view);
                Some(tokio::spawn(async move {
                    let outcome = market.get_coin_detail(&coin.id).await;
                    if let Err(e) = &outcome {
                        warn!("Coin detail lookup for '{}' failed: {}", coin.id, e);
                    }
                    if !view.write().await.apply_coin_detail(generation, outcome) {
                        debug!("Discarded coin detail for '{}'", coin.id);
                    }
                }))
            }
            SelectionEvent::PairSelected { generation, address } => {
                let explorer = Arc::clone(&self.explorer);
                let view = Arc::clone(&self.view);
                Some(tokio::spawn(async move {
                    let outcome = explorer.get_transfers(&address).await;
                    match &outcome {
                        Ok(transfers) => debug!("{} transfers for {}", transfers.len(), address),
                        Err(e) => warn!("Transfer lookup for {} failed: {}", address, e),
                    }
                    if !view.write().await.apply_transfers(generation, outcome) {
                        debug!("Discarded transfers for {}", address);
                    }
                }))
            }
        }
    }
}
