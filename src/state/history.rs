use serde::{Deserialize, Serialize};

use crate::state::response::ResponseData;

/// Hard cap on retained history entries; the oldest is evicted on overflow.
pub const HISTORY_CAP: usize = 100;

/// One past execution. Independent of the live document: it survives request
/// deletion and document close.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub id: String,
    pub request_id: String,
    pub request_name: String,
    pub method: String,
    pub url: String,
    pub timestamp: String,
    pub duration: u64,
    pub response: Option<ResponseData>,
}

/// Append-only, newest-first, bounded ledger of executions.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    items: Vec<HistoryItem>,
}

impl HistoryLedger {
    /// Rehydrate from persisted storage, re-applying the cap.
    pub fn from_items(mut items: Vec<HistoryItem>) -> Self {
        items.truncate(HISTORY_CAP);
        Self { items }
    }

    pub fn push(&mut self, item: HistoryItem) {
        self.items.insert(0, item);
        self.items.truncate(HISTORY_CAP);
    }

    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[HistoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ident::{new_id, now_iso};

    fn item(name: &str) -> HistoryItem {
        HistoryItem {
            id: new_id(),
            request_id: new_id(),
            request_name: name.into(),
            method: "GET".into(),
            url: "https://api.test/x".into(),
            timestamp: now_iso(),
            duration: 1,
            response: None,
        }
    }

    #[test]
    fn test_newest_first() {
        let mut ledger = HistoryLedger::default();
        ledger.push(item("first"));
        ledger.push(item("second"));
        assert_eq!(ledger.items()[0].request_name, "second");
        assert_eq!(ledger.items()[1].request_name, "first");
    }

    #[test]
    fn test_cap_evicts_oldest() {
        let mut ledger = HistoryLedger::default();
        for i in 0..(HISTORY_CAP + 20) {
            ledger.push(item(&format!("r{i}")));
        }
        assert_eq!(ledger.len(), HISTORY_CAP);
        // Newest survives, the very first pushes are gone.
        assert_eq!(ledger.items()[0].request_name, format!("r{}", HISTORY_CAP + 19));
        assert!(ledger.items().iter().all(|i| i.request_name != "r0"));
    }

    #[test]
    fn test_delete_and_clear() {
        let mut ledger = HistoryLedger::default();
        ledger.push(item("a"));
        let id = ledger.items()[0].id.clone();
        assert!(ledger.delete(&id));
        assert!(!ledger.delete(&id));
        ledger.push(item("b"));
        ledger.clear();
        assert!(ledger.is_empty());
    }
}
