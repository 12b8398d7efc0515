use serde::{Deserialize, Serialize};

use crate::imaging::PixelBuffer;
use crate::prelude::{ScoreResult, TextHeuristics};

/// Score used when no text-like edge pattern is found.
pub const NO_TEXT_SCORE: u8 = 50;

/// Edge-density statistics from the sparse probe grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextAnalysis {
    pub has_text: bool,
    pub confidence: f64,
    pub readability_score: Option<u8>,
    pub edge_density: f64,
    pub edge_balance: f64,
    pub horizontal_edges: usize,
    pub vertical_edges: usize,
    pub samples: usize,
}

/// Text likelihood from balanced horizontal and vertical sharp edges; not OCR.
pub fn analyze_text(buffer: &PixelBuffer, heuristics: &TextHeuristics) -> TextAnalysis {
    let offset = heuristics.probe_offset as u32;
    let stride = heuristics.sample_stride.max(1);
    let (w, h) = (buffer.width(), buffer.height());

    let mut horizontal = 0usize;
    let mut vertical = 0usize;
    let mut samples = 0usize;

    if w > 2 * offset && h > 2 * offset {
        for y in (offset..h - offset).step_by(stride) {
            for x in (offset..w - offset).step_by(stride) {
                samples += 1;
                let dx = (buffer.gray(x - offset, y) - buffer.gray(x + offset, y)).abs();
                let dy = (buffer.gray(x, y - offset) - buffer.gray(x, y + offset)).abs();
                if dx > heuristics.sharp_edge_threshold {
                    horizontal += 1;
                }
                if dy > heuristics.sharp_edge_threshold {
                    vertical += 1;
                }
            }
        }
    }

    let edge_density = if samples == 0 {
        0.0
    } else {
        (horizontal + vertical) as f64 / samples as f64
    };
    let edge_balance =
        horizontal.min(vertical) as f64 / horizontal.max(vertical).max(1) as f64;

    let has_text = edge_density > heuristics.min_edge_density
        && edge_density < heuristics.max_edge_density
        && edge_balance > heuristics.min_edge_balance;

    let (confidence, readability_score) = if has_text {
        let readability = (edge_balance * 80.0 + (edge_density * 500.0).min(30.0)).round();
        (
            (edge_density * 15.0).min(0.95),
            Some(readability.min(90.0) as u8),
        )
    } else {
        (0.0, None)
    };

    TextAnalysis {
        has_text,
        confidence,
        readability_score,
        edge_density,
        edge_balance,
        horizontal_edges: horizontal,
        vertical_edges: vertical,
        samples,
    }
}

pub fn score_text(analysis: &TextAnalysis) -> ScoreResult {
    match analysis.readability_score {
        Some(score) if analysis.has_text => {
            let mut reasons = vec![format!(
                "Text-like edges detected ({:.0}% confidence)",
                analysis.confidence * 100.0
            )];
            if score >= 70 {
                reasons.push("Letterforms appear crisp and balanced".to_string());
            } else {
                reasons.push("Text may be hard to read at small sizes".to_string());
            }
            ScoreResult::new(score as i32, &reasons)
        }
        _ => ScoreResult::new(
            NO_TEXT_SCORE as i32,
            &["No prominent text detected".to_string()],
        ),
    }
}
