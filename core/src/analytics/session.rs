use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::analytics::calculator::Calculator;
use crate::analytics::catalog::{find_question, AnalyticsQuestion, QUESTIONS};
use crate::analytics::input::AnalyticsInput;
use crate::analytics::models::SessionRecords;
use crate::analytics::result::{AnalyticsResult, ResultStatus};
use crate::telemetry::{MetricsRecorder, MetricsSnapshot};

/// One "analyze" action: fixed records, fixed clock, answers computed once.
pub struct AnalyticsSession {
    records: SessionRecords,
    now: DateTime<Utc>,
    calculator: Calculator,
    cache: HashMap<String, AnalyticsResult>,
    metrics: Arc<MetricsRecorder>,
}

impl AnalyticsSession {
    pub fn new(records: SessionRecords) -> Self {
        Self::at(records, Utc::now())
    }

    pub fn at(records: SessionRecords, now: DateTime<Utc>) -> Self {
        Self {
            records,
            now,
            calculator: Calculator::new(),
            cache: HashMap::new(),
            metrics: Arc::new(MetricsRecorder::new()),
        }
    }

    /// Shares an existing recorder, e.g. one owned by a long-running server.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRecorder>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn records(&self) -> &SessionRecords {
        &self.records
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn answer(&mut self, question: &AnalyticsQuestion) -> &AnalyticsResult {
        if !self.cache.contains_key(question.id) {
            let input = AnalyticsInput::new(
                &self.records.video,
                &self.records.channel,
                &self.records.history,
                self.now,
            );
            let result = self.calculator.answer(question, &input);
            match result.status {
                ResultStatus::Computed | ResultStatus::NotImplemented => {
                    self.metrics.record_processed()
                }
                ResultStatus::InsufficientData => self.metrics.record_insufficient(),
                ResultStatus::Failed => self.metrics.record_error(),
            }
            self.cache.insert(question.id.to_string(), result);
        }
        &self.cache[question.id]
    }

    /// `None` when `id` is not in the catalog.
    pub fn answer_id(&mut self, id: &str) -> Option<&AnalyticsResult> {
        let question = find_question(id)?;
        Some(self.answer(question))
    }

    pub fn answer_all(&mut self) -> Vec<AnalyticsResult> {
        QUESTIONS.iter().map(|q| self.answer(q).clone()).collect()
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::routines::fixtures::{channel, now, video, weekly_history};

    fn session(count: usize) -> AnalyticsSession {
        AnalyticsSession::at(
            SessionRecords {
                video: video(),
                channel: channel(),
                history: weekly_history(count),
            },
            now(),
        )
    }

    #[test]
    fn answers_are_cached_per_question() {
        let mut session = session(12);
        let first = session.answer_id("average-views").cloned().unwrap();
        let second = session.answer_id("average-views").cloned().unwrap();
        assert_eq!(first, second);
        assert_eq!(session.cached(), 1);
        assert_eq!(session.metrics().processed, 1);
    }

    #[test]
    fn unknown_ids_are_not_cached() {
        let mut session = session(3);
        assert!(session.answer_id("nope").is_none());
        assert_eq!(session.cached(), 0);
    }

    #[test]
    fn answer_all_tracks_outcomes() {
        let mut session = session(3);
        let results = session.answer_all();
        assert_eq!(results.len(), QUESTIONS.len());
        let snapshot = session.metrics();
        assert_eq!(snapshot.processed + snapshot.insufficient, QUESTIONS.len());
        assert!(snapshot.insufficient > 0);
        assert_eq!(snapshot.errors, 0);
    }
}
