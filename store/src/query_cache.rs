use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Entries kept before the oldest is evicted
pub const DEFAULT_CAPACITY: usize = 256;

#[derive(Debug, Default)]
struct Entries {
    values: HashMap<String, Value>,
    /// Keys in insertion order, oldest first
    order: VecDeque<String>,
}

/// In-memory cache of successful GraphQL responses.
///
/// Entries are keyed by the normalized query text plus the canonical JSON of
/// its variables. Once `capacity` entries are held, inserting a new key
/// evicts the oldest one.
#[derive(Debug, Clone)]
pub struct QueryCache {
    entries: Arc<RwLock<Entries>>,
    capacity: usize,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(Entries::default())),
            capacity: capacity.max(1),
        }
    }

    /// Build the cache key for a query and its variables.
    ///
    /// Whitespace runs in the query collapse to one space so formatting
    /// differences share an entry. Variable objects are serialized with
    /// sorted keys.
    pub fn key(query: &str, variables: Option<&Value>) -> String {
        let normalized = query.split_whitespace().collect::<Vec<_>>().join(" ");
        let variables = match variables {
            Some(Value::Null) | None => String::new(),
            Some(vars) => canonical(vars).to_string(),
        };
        format!("{}|{}", normalized, variables)
    }

    pub async fn get(&self, key: &str) -> Option<Value> {
        let entries = self.entries.read().await;
        let hit = entries.values.get(key).cloned();
        debug!(
            "Query cache {}: {} entries",
            if hit.is_some() { "hit" } else { "miss" },
            entries.values.len()
        );
        hit
    }

    pub async fn insert(&self, key: String, value: Value) {
        let mut entries = self.entries.write().await;
        if entries.values.insert(key.clone(), value).is_some() {
            return;
        }
        entries.order.push_back(key);
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                entries.values.remove(&oldest);
                debug!("Evicted oldest query cache entry");
            }
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.values.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.values.is_empty()
    }

    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.values.clear();
        entries.order.clear();
    }
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.clone(), canonical(v)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}
