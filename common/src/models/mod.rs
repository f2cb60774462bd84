mod coin;
mod price;
mod query_state;
mod token;
mod transfer;

pub use coin::CoinDetail;
pub use price::{EthPrice, Pair, PairToken};
pub use query_state::QueryState;
pub use token::{Token, TokenDetail};
pub use transfer::{TransferDirection, TransferRecord, MAX_TRANSFERS};
