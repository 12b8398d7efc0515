use creatorcore::analytics::SessionRecords;
use serde::{Deserialize, Serialize};

/// Body of `POST /answer`: the question id plus the session records inline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    #[serde(flatten)]
    pub records: SessionRecords,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorReply {
    pub error: String,
}

impl ErrorReply {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
