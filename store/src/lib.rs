mod query_cache;
mod view_state;

pub use query_cache::{QueryCache, DEFAULT_CAPACITY};
pub use view_state::{SelectionEvent, ViewSnapshot, ViewState, DEFAULT_TRANSFER_PAIR};
