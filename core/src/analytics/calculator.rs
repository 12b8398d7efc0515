use std::any::Any;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};

use crate::analytics::catalog::{find_question, AnalyticsQuestion};
use crate::analytics::input::AnalyticsInput;
use crate::analytics::models::{ChannelRecord, ChannelVideo, SessionRecords, VideoRecord};
use crate::analytics::result::{AnalyticsResult, CalcError};
use crate::analytics::routines::{registry, Routine};
use crate::telemetry::LogManager;

static DISPATCH: LazyLock<HashMap<&'static str, Routine>> =
    LazyLock::new(|| registry().map(|(id, routine)| (*id, *routine)).collect());

/// Single dispatch entry point: every outcome becomes an [`AnalyticsResult`].
#[derive(Debug, Clone)]
pub struct Calculator {
    logger: LogManager,
}

impl Calculator {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new("analytics"),
        }
    }

    pub fn has_routine(id: &str) -> bool {
        DISPATCH.contains_key(id)
    }

    pub fn routine_ids() -> impl Iterator<Item = &'static str> {
        DISPATCH.keys().copied()
    }

    pub fn answer(&self, question: &AnalyticsQuestion, input: &AnalyticsInput) -> AnalyticsResult {
        let Some(routine) = DISPATCH.get(question.id) else {
            self.logger
                .detail(&format!("no routine registered for '{}'", question.id));
            return AnalyticsResult::not_implemented(question);
        };

        match catch_unwind(AssertUnwindSafe(|| routine(input))) {
            Ok(Ok(answer)) => {
                self.logger.detail(&format!("answered '{}'", question.id));
                AnalyticsResult::from_answer(question, answer)
            }
            Ok(Err(CalcError::InsufficientData {
                required,
                available,
                subject,
            })) => {
                self.logger.detail(&format!(
                    "'{}' needs {} {}, found {}",
                    question.id, required, subject, available
                ));
                AnalyticsResult::insufficient(question, required, available, subject)
            }
            Ok(Err(err)) => {
                self.logger
                    .degraded(&format!("'{}' failed: {}", question.id, err));
                AnalyticsResult::failed(question, &err.to_string())
            }
            Err(payload) => {
                let cause = panic_message(payload.as_ref());
                self.logger
                    .degraded(&format!("'{}' panicked: {}", question.id, cause));
                AnalyticsResult::failed(question, &cause)
            }
        }
    }
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic".to_string()
    }
}

/// Answers `question` against the records as of now.
pub fn calculate_answer(
    question: &AnalyticsQuestion,
    video: &VideoRecord,
    channel: &ChannelRecord,
    history: &[ChannelVideo],
) -> AnalyticsResult {
    calculate_answer_at(question, video, channel, history, Utc::now())
}

/// Same as [`calculate_answer`] with a pinned clock.
pub fn calculate_answer_at(
    question: &AnalyticsQuestion,
    video: &VideoRecord,
    channel: &ChannelRecord,
    history: &[ChannelVideo],
    now: DateTime<Utc>,
) -> AnalyticsResult {
    let input = AnalyticsInput::new(video, channel, history, now);
    Calculator::new().answer(question, &input)
}

/// Catalog lookup plus dispatch; `None` when the id is not in the catalog.
pub fn answer_by_id(
    id: &str,
    records: &SessionRecords,
    now: DateTime<Utc>,
) -> Option<AnalyticsResult> {
    let question = find_question(id)?;
    Some(calculate_answer_at(
        question,
        &records.video,
        &records.channel,
        &records.history,
        now,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::catalog::{Complexity, QuestionCategory, VideoType, QUESTIONS};
    use crate::analytics::result::{ResultStatus, NOT_IMPLEMENTED_ANSWER};
    use crate::analytics::routines::fixtures::{channel, clip, now, video, weekly_history};
    use crate::analytics::routines::registry;
    use std::collections::HashSet;

    fn records(history: Vec<ChannelVideo>) -> SessionRecords {
        SessionRecords {
            video: video(),
            channel: channel(),
            history,
        }
    }

    #[test]
    fn catalog_and_dispatch_table_agree() {
        let catalog: HashSet<_> = QUESTIONS.iter().map(|q| q.id).collect();
        let routines: HashSet<_> = Calculator::routine_ids().collect();
        assert_eq!(catalog, routines);
        assert_eq!(registry().count(), QUESTIONS.len());
        assert_eq!(QUESTIONS.len(), 61);
    }

    #[test]
    fn upload_gaps_scenario() {
        let history = vec![clip("a", 10, 5, 600), clip("b", 20, 5, 600), clip("c", 100, 5, 600)];
        let result = answer_by_id("upload-gaps", &records(history), now()).unwrap();
        assert_eq!(result.status, ResultStatus::Computed);
        assert_eq!(result.value["shortestDays"], 10.0);
        assert_eq!(result.value["longestDays"], 80.0);
    }

    #[test]
    fn unknown_question_returns_placeholder() {
        let question = AnalyticsQuestion {
            id: "not-in-the-table",
            question_text: "Will this ever be answered?",
            category: QuestionCategory::Growth,
            description: "",
            video_type: VideoType::Both,
            complexity: Complexity::Basic,
            tags: &[],
        };
        let recs = records(Vec::new());
        let result = calculate_answer(&question, &recs.video, &recs.channel, &recs.history);
        assert_eq!(result.answer, NOT_IMPLEMENTED_ANSWER);
        assert_eq!(result.status, ResultStatus::NotImplemented);
        assert_eq!(result.question_id, "not-in-the-table");
    }

    #[test]
    fn identical_inputs_give_identical_results() {
        let recs = records(weekly_history(25));
        for question in QUESTIONS {
            let first = answer_by_id(question.id, &recs, now());
            let second = answer_by_id(question.id, &recs, now());
            assert_eq!(first, second, "{}", question.id);
        }
    }

    #[test]
    fn no_question_fails_on_a_realistic_channel() {
        let mut history = weekly_history(24);
        history.push(clip("s1", 3, 9_000, 25));
        history.push(clip("s2", 5, 4_000, 45));
        history.push(clip("s3", 6, 2_500, 15));
        let recs = records(history);
        for question in QUESTIONS {
            let result = answer_by_id(question.id, &recs, now()).unwrap();
            assert_eq!(result.status, ResultStatus::Computed, "{}", question.id);
        }
    }

    #[test]
    fn empty_history_never_panics_or_fails() {
        let recs = records(Vec::new());
        for question in QUESTIONS {
            let result = answer_by_id(question.id, &recs, now()).unwrap();
            assert_ne!(result.status, ResultStatus::Failed, "{}", question.id);
        }
    }

    #[test]
    fn minimum_sample_guards_trip_one_below_threshold() {
        let cases = [
            ("upload-gaps", 2),
            ("posting-frequency-trend", 4),
            ("posting-consistency", 5),
            ("best-upload-weekday", 10),
            ("video-length-trend", 10),
            ("common-title-words", 10),
            ("top-videos", 3),
            ("view-outliers", 10),
            ("breakout-rate", 10),
            ("engagement-trend", 10),
            ("comments-disabled-estimate", 5),
            ("recent-momentum", 20),
        ];
        for (id, required) in cases {
            let short = answer_by_id(id, &records(weekly_history(required - 1)), now()).unwrap();
            assert_eq!(short.status, ResultStatus::InsufficientData, "{}", id);
            assert!(short.answer.starts_with("Not enough data"), "{}", id);

            let enough = answer_by_id(id, &records(weekly_history(required)), now()).unwrap();
            assert_eq!(enough.status, ResultStatus::Computed, "{}", id);
        }
    }

    #[test]
    fn panic_payloads_are_reported_as_text() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
    }
}
