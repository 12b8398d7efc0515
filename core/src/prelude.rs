use serde::{Deserialize, Serialize};

/// Tunable constants for the saliency/heatmap pipeline.
///
/// Every weight and threshold here is an empirically chosen heuristic, not a
/// derived value. They are exposed so callers can tune them per workflow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Largest side of the analysis buffer; bigger inputs are downscaled.
    pub max_dimension: u32,
    pub edge_weight: f32,
    pub saturation_weight: f32,
    pub brightness_weight: f32,
    pub skin_boost: f32,
    pub skin_min_red: u8,
    pub skin_min_green: u8,
    pub skin_min_blue: u8,
    pub skin_max_red_green_gap: u8,
    pub center_bias_falloff: f32,
    pub center_bias_strength: f32,
    pub blur_radius: usize,
    pub blur_stride: usize,
    pub blur_sigma: f32,
    pub contrast_gamma: f32,
    pub alpha_scale: f32,
    pub alpha_offset: f32,
    /// Opacity of the black layer drawn over the source before the heatmap.
    pub darken_opacity: f32,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            max_dimension: 800,
            edge_weight: 0.6,
            saturation_weight: 100.0,
            brightness_weight: 0.4,
            skin_boost: 60.0,
            skin_min_red: 120,
            skin_min_green: 80,
            skin_min_blue: 60,
            skin_max_red_green_gap: 50,
            center_bias_falloff: 2.5,
            center_bias_strength: 50.0,
            blur_radius: 12,
            blur_stride: 2,
            blur_sigma: 6.0,
            contrast_gamma: 0.65,
            alpha_scale: 230.0,
            alpha_offset: 40.0,
            darken_opacity: 0.4,
        }
    }
}

/// Edge-density thresholds used by the text-likelihood heuristic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TextHeuristics {
    pub sample_stride: usize,
    pub probe_offset: usize,
    pub sharp_edge_threshold: f32,
    pub min_edge_density: f64,
    pub max_edge_density: f64,
    pub min_edge_balance: f64,
}

impl Default for TextHeuristics {
    fn default() -> Self {
        Self {
            sample_stride: 3,
            probe_offset: 2,
            sharp_edge_threshold: 70.0,
            min_edge_density: 0.025,
            max_edge_density: 0.15,
            min_edge_balance: 0.5,
        }
    }
}

/// A 0-100 score with the sentences that justify it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScoreResult {
    pub score: u8,
    pub reason: String,
}

impl ScoreResult {
    /// Clamps `raw` into [0, 100] and joins the reason fragments with ". ".
    pub fn new(raw: i32, reasons: &[String]) -> Self {
        let reason = if reasons.is_empty() {
            "No notable characteristics detected".to_string()
        } else {
            reasons.join(". ")
        };
        Self {
            score: raw.clamp(0, 100) as u8,
            reason,
        }
    }
}

/// Common error type for stage execution.
#[derive(thiserror::Error, Debug)]
pub enum StageError {
    #[error("buffer exhaustion: {0}")]
    BufferExhaustion(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("decode failure: {0}")]
    Decode(String),
    #[error("encode failure: {0}")]
    Encode(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type StageResult<T> = Result<T, StageError>;

/// Trait describing a configurable step of the heatmap pipeline.
pub trait ProcessingStage {
    type Input;
    type Output;

    fn initialize(&mut self, config: &HeatmapConfig) -> StageResult<()>;
    fn execute(&mut self, input: Self::Input) -> StageResult<Self::Output>;
    fn cleanup(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_result_clamps_into_range() {
        assert_eq!(ScoreResult::new(140, &["great".into()]).score, 100);
        assert_eq!(ScoreResult::new(-20, &["poor".into()]).score, 0);
    }

    #[test]
    fn score_result_joins_reasons() {
        let result = ScoreResult::new(70, &["First".into(), "Second".into()]);
        assert_eq!(result.reason, "First. Second");
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: HeatmapConfig = serde_json::from_str(r#"{"blur_radius": 8}"#).unwrap();
        assert_eq!(config.blur_radius, 8);
        assert_eq!(config.max_dimension, 800);
    }
}
