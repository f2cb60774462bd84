use serde::Serialize;

/// Lifecycle of one fetch as seen by the page.
///
/// A request moves `Loading -> Ready | Failed` once; `resolve` on a slot that
/// is not loading is ignored.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "state", content = "value", rename_all = "lowercase")]
pub enum QueryState<T> {
    Idle,
    Loading,
    Ready(T),
    Failed(String),
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState::Idle
    }
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            QueryState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Settle a loading slot with the outcome of its request.
    ///
    /// Returns `false` and leaves the slot untouched if it was not loading.
    pub fn resolve<E: std::fmt::Display>(&mut self, outcome: Result<T, E>) -> bool {
        if !self.is_loading() {
            return false;
        }
        *self = match outcome {
            Ok(value) => QueryState::Ready(value),
            Err(e) => QueryState::Failed(e.to_string()),
        };
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_only_once() {
        let mut slot: QueryState<u32> = QueryState::Loading;
        assert!(slot.resolve::<String>(Ok(7)));
        assert_eq!(slot.ready(), Some(&7));

        assert!(!slot.resolve(Err("late failure")));
        assert_eq!(slot, QueryState::Ready(7));
    }

    #[test]
    fn failure_keeps_message() {
        let mut slot: QueryState<u32> = QueryState::Loading;
        slot.resolve(Err("connection refused"));
        assert_eq!(slot.error(), Some("connection refused"));
        assert!(slot.ready().is_none());
    }

    #[test]
    fn idle_slot_ignores_results() {
        let mut slot: QueryState<u32> = QueryState::default();
        assert!(!slot.resolve::<String>(Ok(1)));
        assert_eq!(slot, QueryState::Idle);
    }
}
