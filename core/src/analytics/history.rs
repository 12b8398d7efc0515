use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::result::{AnalyticsResult, ResultStatus};
use crate::telemetry::LogManager;

/// Key the rolling history is stored under.
pub const HISTORY_KEY: &str = "analytics.calculation-history";
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("stored history is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Minimal string key-value port so persistence stays swappable.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub question_id: String,
    pub question_text: String,
    pub answer: String,
    pub status: ResultStatus,
    pub computed_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_result(result: &AnalyticsResult, computed_at: DateTime<Utc>) -> Self {
        Self {
            question_id: result.question_id.clone(),
            question_text: result.question_text.clone(),
            answer: result.answer.clone(),
            status: result.status,
            computed_at,
        }
    }
}

/// Newest-first list of recent calculations, capped at `limit`.
pub struct CalculationHistory<S: KeyValueStore> {
    store: S,
    limit: usize,
    logger: LogManager,
}

impl<S: KeyValueStore> CalculationHistory<S> {
    pub fn new(store: S) -> Self {
        Self::with_limit(store, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(store: S, limit: usize) -> Self {
        Self {
            store,
            limit: limit.max(1),
            logger: LogManager::new("history"),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn entries(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        match self.store.get(HISTORY_KEY)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Prepends `result`; a corrupt stored list is discarded rather than blocking new entries.
    pub fn record(
        &mut self,
        result: &AnalyticsResult,
        computed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut entries = match self.entries() {
            Ok(entries) => entries,
            Err(StoreError::Corrupt(err)) => {
                self.logger
                    .degraded(&format!("discarding unreadable history: {}", err));
                Vec::new()
            }
            Err(err) => return Err(err),
        };
        entries.insert(0, HistoryEntry::from_result(result, computed_at));
        entries.truncate(self.limit);
        self.store.set(HISTORY_KEY, serde_json::to_string(&entries)?)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(HISTORY_KEY)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::catalog::find_question;
    use chrono::{Duration, TimeZone};

    fn result(id: &str) -> AnalyticsResult {
        AnalyticsResult::not_implemented(find_question(id).unwrap())
    }

    #[test]
    fn keeps_newest_first_up_to_limit() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut history = CalculationHistory::new(MemoryStore::new());
        let ids = ["average-views", "median-views", "upload-gaps"];
        for i in 0..12 {
            history
                .record(&result(ids[i % ids.len()]), start + Duration::minutes(i as i64))
                .unwrap();
        }
        let entries = history.entries().unwrap();
        assert_eq!(entries.len(), DEFAULT_HISTORY_LIMIT);
        assert_eq!(entries[0].computed_at, start + Duration::minutes(11));
        assert_eq!(entries[0].question_id, "upload-gaps");
    }

    #[test]
    fn corrupt_history_is_replaced() {
        let mut store = MemoryStore::new();
        store.set(HISTORY_KEY, "{not json".into()).unwrap();
        let mut history = CalculationHistory::new(store);
        assert!(matches!(history.entries(), Err(StoreError::Corrupt(_))));
        history.record(&result("channel-age"), Utc::now()).unwrap();
        assert_eq!(history.entries().unwrap().len(), 1);
    }

    #[test]
    fn clear_empties_the_store() {
        let mut history = CalculationHistory::with_limit(MemoryStore::new(), 3);
        history.record(&result("channel-age"), Utc::now()).unwrap();
        history.clear().unwrap();
        assert!(history.entries().unwrap().is_empty());
        assert_eq!(history.into_inner().get(HISTORY_KEY).unwrap(), None);
    }
}
