//! Thumbnail sub-scores. Each scorer starts from a baseline, applies bounded
//! deltas and clamps into [0, 100].

pub mod composition;
pub mod lighting;
pub mod report;
pub mod subject;
pub mod text;

pub use composition::score_composition;
pub use lighting::{score_lighting, LightingStats};
pub use report::ThumbnailReport;
pub use subject::{detect_subjects, DetectedSubject, NoopDetector, ObjectDetector};
pub use text::{analyze_text, score_text, TextAnalysis};
