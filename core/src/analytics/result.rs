use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analytics::catalog::AnalyticsQuestion;

pub const NOT_IMPLEMENTED_ANSWER: &str = "This question is not yet implemented.";
pub const FAILED_ANSWER: &str = "An error occurred while calculating this answer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStatus {
    Computed,
    InsufficientData,
    NotImplemented,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Timeline,
}

/// Rendering hint: `data` and `labels` are parallel arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    #[serde(rename = "type")]
    pub chart_type: ChartType,
    pub data: Vec<f64>,
    pub labels: Vec<String>,
}

impl Chart {
    pub fn new(chart_type: ChartType, points: Vec<(String, f64)>) -> Self {
        let (labels, data) = points.into_iter().unzip();
        Self {
            chart_type,
            data,
            labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    pub question_id: String,
    pub question_text: String,
    pub status: ResultStatus,
    pub answer: String,
    pub value: Value,
    pub details: Vec<String>,
    pub insights: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart: Option<Chart>,
}

impl AnalyticsResult {
    pub fn from_answer(question: &AnalyticsQuestion, answer: Answer) -> Self {
        Self {
            question_id: question.id.to_string(),
            question_text: question.question_text.to_string(),
            status: ResultStatus::Computed,
            answer: answer.answer,
            value: answer.value,
            details: answer.details,
            insights: answer.insights,
            chart: answer.chart,
        }
    }

    pub fn insufficient(
        question: &AnalyticsQuestion,
        required: usize,
        available: usize,
        subject: &str,
    ) -> Self {
        Self {
            question_id: question.id.to_string(),
            question_text: question.question_text.to_string(),
            status: ResultStatus::InsufficientData,
            answer: format!(
                "Not enough data: need at least {} {} (found {}).",
                required, subject, available
            ),
            value: Value::Null,
            details: vec![format!(
                "This calculation needs {} {} to produce a meaningful result; only {} available.",
                required, subject, available
            )],
            insights: vec![
                "Analyze a channel with more upload history to unlock this insight.".to_string(),
            ],
            chart: None,
        }
    }

    pub fn not_implemented(question: &AnalyticsQuestion) -> Self {
        Self {
            question_id: question.id.to_string(),
            question_text: question.question_text.to_string(),
            status: ResultStatus::NotImplemented,
            answer: NOT_IMPLEMENTED_ANSWER.to_string(),
            value: Value::Null,
            details: vec!["The calculation for this question has not been added yet.".into()],
            insights: Vec::new(),
            chart: None,
        }
    }

    pub fn failed(question: &AnalyticsQuestion, cause: &str) -> Self {
        Self {
            question_id: question.id.to_string(),
            question_text: question.question_text.to_string(),
            status: ResultStatus::Failed,
            answer: FAILED_ANSWER.to_string(),
            value: Value::Null,
            details: vec![format!("Calculation error: {}", cause)],
            insights: vec!["Try re-running the analysis or choose another question.".into()],
            chart: None,
        }
    }
}

/// What a routine produces; the calculator attaches the question identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub answer: String,
    pub value: Value,
    pub details: Vec<String>,
    pub insights: Vec<String>,
    pub chart: Option<Chart>,
}

impl Answer {
    pub fn new(answer: impl Into<String>, value: Value) -> Self {
        Self {
            answer: answer.into(),
            value,
            details: Vec::new(),
            insights: Vec::new(),
            chart: None,
        }
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.details.push(detail.into());
        self
    }

    pub fn details<I, S>(mut self, details: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.details.extend(details.into_iter().map(Into::into));
        self
    }

    pub fn insight(mut self, insight: impl Into<String>) -> Self {
        self.insights.push(insight.into());
        self
    }

    pub fn chart(mut self, chart: Chart) -> Self {
        self.chart = Some(chart);
        self
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CalcError {
    #[error("need at least {required} {subject}, found {available}")]
    InsufficientData {
        required: usize,
        available: usize,
        subject: &'static str,
    },
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("non-finite value while computing {0}")]
    NonFinite(&'static str),
}

pub type CalcResult<T> = Result<T, CalcError>;

/// Short-circuits a routine when fewer than `required` samples are available.
pub fn ensure_samples(available: usize, required: usize, subject: &'static str) -> CalcResult<()> {
    if available < required {
        Err(CalcError::InsufficientData {
            required,
            available,
            subject,
        })
    } else {
        Ok(())
    }
}

/// Rejects NaN and infinities before they reach a result.
pub fn finite(value: f64, what: &'static str) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(CalcError::NonFinite(what))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_samples_reports_counts() {
        assert_eq!(ensure_samples(5, 5, "videos"), Ok(()));
        assert_eq!(
            ensure_samples(4, 5, "videos"),
            Err(CalcError::InsufficientData {
                required: 5,
                available: 4,
                subject: "videos"
            })
        );
    }

    #[test]
    fn chart_splits_points_into_parallel_arrays() {
        let chart = Chart::new(
            ChartType::Bar,
            vec![("a".into(), 1.0), ("b".into(), 2.0)],
        );
        assert_eq!(chart.labels, vec!["a", "b"]);
        assert_eq!(chart.data, vec![1.0, 2.0]);
    }

    #[test]
    fn finite_rejects_nan() {
        assert!(finite(f64::NAN, "ratio").is_err());
        assert_eq!(finite(1.5, "ratio"), Ok(1.5));
    }
}
