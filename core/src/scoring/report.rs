use serde::{Deserialize, Serialize};

use crate::imaging::PixelBuffer;
use crate::prelude::{ScoreResult, TextHeuristics};
use crate::scoring::composition::score_composition;
use crate::scoring::lighting::score_lighting;
use crate::scoring::subject::{detect_subjects, score_subject_clarity, DetectedSubject};
use crate::scoring::text::{analyze_text, score_text, TextAnalysis};
use crate::telemetry::LogManager;

const EXCELLENT: u8 = 85;
const NEEDS_WORK: u8 = 60;
const STRONG_OVERALL: f64 = 80.0;

/// Full thumbnail assessment: four sub-scores, their mean and takeaways.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailReport {
    pub composition: ScoreResult,
    pub lighting: ScoreResult,
    pub text_readability: ScoreResult,
    pub subject_clarity: ScoreResult,
    pub text: TextAnalysis,
    pub subjects: Vec<DetectedSubject>,
    pub overall: f64,
    pub insights: Vec<String>,
}

impl ThumbnailReport {
    pub fn analyze(buffer: &PixelBuffer) -> Self {
        Self::analyze_with(buffer, &TextHeuristics::default())
    }

    pub fn analyze_with(buffer: &PixelBuffer, heuristics: &TextHeuristics) -> Self {
        let composition = score_composition(buffer);
        let lighting = score_lighting(buffer);
        let text = analyze_text(buffer, heuristics);
        let text_readability = score_text(&text);
        let subjects = detect_subjects(buffer);
        let subject_clarity = score_subject_clarity(&subjects);

        let overall = [
            composition.score,
            lighting.score,
            text_readability.score,
            subject_clarity.score,
        ]
        .iter()
        .map(|&s| s as f64)
        .sum::<f64>()
            / 4.0;

        let insights = build_insights(
            &composition,
            &lighting,
            &text_readability,
            text.has_text,
            overall,
        );

        LogManager::new("thumbnail").record(&format!(
            "overall {:.1} (composition {}, lighting {}, text {}, subject {})",
            overall,
            composition.score,
            lighting.score,
            text_readability.score,
            subject_clarity.score
        ));

        Self {
            composition,
            lighting,
            text_readability,
            subject_clarity,
            text,
            subjects,
            overall,
            insights,
        }
    }
}

fn build_insights(
    composition: &ScoreResult,
    lighting: &ScoreResult,
    text: &ScoreResult,
    has_text: bool,
    overall: f64,
) -> Vec<String> {
    let mut insights = Vec::new();

    if composition.score > EXCELLENT {
        insights.push("Excellent composition: the focal point is clear and well framed.".into());
    } else if composition.score < NEEDS_WORK {
        insights.push(
            "Composition needs improvement: place the main subject near the center.".into(),
        );
    }

    if lighting.score > EXCELLENT {
        insights.push("Excellent lighting with balanced exposure and contrast.".into());
    } else if lighting.score < NEEDS_WORK {
        insights.push("Lighting needs improvement: brighten the subject or add contrast.".into());
    }

    if has_text {
        if text.score > EXCELLENT {
            insights.push("Text overlay looks bold and easy to read.".into());
        } else if text.score < NEEDS_WORK {
            insights.push(
                "Text readability needs improvement: use larger, higher-contrast lettering."
                    .into(),
            );
        }
    } else {
        insights.push("Consider adding a short, bold text hook to boost click-through.".into());
    }

    if overall > STRONG_OVERALL {
        insights.push("Strong thumbnail overall: it should stand out in search and suggestions.".into());
    }

    insights
}
