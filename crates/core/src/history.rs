//! Bounded, newest-first list of completed calculations.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entries kept before the oldest is evicted.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// The expression as the user built it, e.g. `7 + 3`.
    pub expression: String,
    pub result: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct History {
    limit: usize,
    items: VecDeque<HistoryItem>,
}

impl Default for History {
    fn default() -> Self {
        Self::with_limit(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// A history holding at most `limit` entries. A limit of 0 keeps nothing.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            items: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
        }
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record an entry as the newest, evicting the oldest beyond the limit.
    pub fn push(&mut self, item: HistoryItem) {
        self.items.push_front(item);
        self.items.truncate(self.limit);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Entry by position, 0 being the newest.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&HistoryItem> {
        self.items.get(index)
    }

    #[must_use]
    pub fn newest(&self) -> Option<&HistoryItem> {
        self.items.front()
    }

    /// Iterate newest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryItem> + ExactSizeIterator {
        self.items.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
