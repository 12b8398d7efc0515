use crate::imaging::PixelBuffer;
use crate::math::StatsHelper;
use crate::prelude::ScoreResult;

const BASE_SCORE: i32 = 70;
const BRIGHT_PIXEL: f64 = 200.0;
const DARK_PIXEL: f64 = 50.0;

/// Exposure, clipping and contrast statistics behind the lighting score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightingStats {
    pub mean_brightness: f64,
    pub bright_fraction: f64,
    pub dark_fraction: f64,
    pub contrast: f64,
}

impl LightingStats {
    pub fn measure(buffer: &PixelBuffer) -> Self {
        let brightness: Vec<f64> = buffer
            .pixels()
            .map(|[r, g, b, _]| (r as f64 + g as f64 + b as f64) / 3.0)
            .collect();
        let total = brightness.len().max(1) as f64;
        let bright = brightness.iter().filter(|&&v| v > BRIGHT_PIXEL).count();
        let dark = brightness.iter().filter(|&&v| v < DARK_PIXEL).count();
        Self {
            mean_brightness: StatsHelper::mean(&brightness),
            bright_fraction: bright as f64 / total,
            dark_fraction: dark as f64 / total,
            contrast: StatsHelper::std_dev(&brightness),
        }
    }
}

pub fn score_lighting(buffer: &PixelBuffer) -> ScoreResult {
    let stats = LightingStats::measure(buffer);
    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    if stats.mean_brightness > 100.0 && stats.mean_brightness < 180.0 {
        score += 15;
        reasons.push("Well-balanced overall brightness".to_string());
    } else if stats.mean_brightness <= 100.0 {
        reasons.push("Image may be too dark to stand out".to_string());
    } else {
        reasons.push("Image may be too bright and washed out".to_string());
    }

    if stats.bright_fraction < 0.05 && stats.dark_fraction < 0.05 {
        score += 10;
        reasons.push("Good dynamic range without clipped highlights or shadows".to_string());
    } else if stats.bright_fraction > 0.2 || stats.dark_fraction > 0.2 {
        score -= 15;
        reasons.push("Large blown-out or crushed areas lose detail".to_string());
    }

    if stats.contrast > 40.0 && stats.contrast < 70.0 {
        score += 10;
        reasons.push("Good contrast makes elements pop".to_string());
    } else if stats.contrast <= 40.0 {
        reasons.push("Low contrast may appear flat".to_string());
    } else {
        reasons.push("Very high contrast may look harsh".to_string());
    }

    ScoreResult::new(score, &reasons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_gray_is_balanced_but_flat() {
        let result = score_lighting(&PixelBuffer::filled(64, 36, [128, 128, 128, 255]));
        assert_eq!(result.score, 95);
        assert!(result.reason.contains("Well-balanced"));
        assert!(result.reason.contains("Low contrast may appear flat"));
    }

    #[test]
    fn black_frame_is_penalised() {
        let result = score_lighting(&PixelBuffer::filled(10, 10, [5, 5, 5, 255]));
        assert_eq!(result.score, 55);
        assert!(result.reason.contains("too dark"));
    }

    #[test]
    fn moderate_contrast_earns_bonus() {
        // Alternating 80/180 columns: mean 130, std-dev 50, nothing clipped.
        let buffer = PixelBuffer::from_fn(20, 10, |x, _| {
            let v = if x % 2 == 0 { 80 } else { 180 };
            [v, v, v, 255]
        });
        let result = score_lighting(&buffer);
        assert_eq!(result.score, 100);
        assert!(result.reason.contains("Good contrast"));
    }
}
