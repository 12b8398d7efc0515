//! Core engine for the creator toolkit.
//!
//! Two independent halves share the crate: a saliency heatmap engine with
//! thumbnail scorers, and a channel-analytics calculator. Both are pure
//! computations over in-memory records; decoding, storage and transport
//! belong to the caller.

pub mod analytics;
pub mod imaging;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod scoring;
pub mod telemetry;

pub use analytics::{calculate_answer, AnalyticsQuestion, AnalyticsResult};
pub use imaging::PixelBuffer;
pub use prelude::{HeatmapConfig, ProcessingStage, ScoreResult, StageError, TextHeuristics};
pub use processing::{generate_heatmap, render_heatmap_bytes};
pub use scoring::ThumbnailReport;
