//! Channel analytics: records, the question catalog, and the calculator
//! that answers each question from a snapshot of channel data.

pub mod calculator;
pub mod catalog;
pub mod duration;
pub mod history;
pub mod input;
pub mod models;
pub mod result;
pub mod routines;
pub mod session;

pub use calculator::{answer_by_id, calculate_answer, calculate_answer_at, Calculator};
pub use catalog::{
    find_question, questions_in, AnalyticsQuestion, Complexity, QuestionCategory, VideoType,
    QUESTIONS,
};
pub use duration::{format_duration, format_duration_iso, parse_duration};
pub use history::{
    CalculationHistory, HistoryEntry, KeyValueStore, MemoryStore, StoreError,
    DEFAULT_HISTORY_LIMIT, HISTORY_KEY,
};
pub use input::AnalyticsInput;
pub use models::{ChannelRecord, ChannelVideo, SessionRecords, VideoRecord, SHORT_MAX_SECONDS};
pub use result::{
    AnalyticsResult, Answer, CalcError, CalcResult, Chart, ChartType, ResultStatus,
    FAILED_ANSWER, NOT_IMPLEMENTED_ANSWER,
};
pub use session::AnalyticsSession;
