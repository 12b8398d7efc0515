use crate::imaging::PixelBuffer;
use crate::prelude::ScoreResult;

const BASE_SCORE: i32 = 70;
const CENTER_FOCUS_BONUS: i32 = 15;
const ASPECT_BONUS: i32 = 10;
/// Center must be this much brighter than the whole frame to count as focused.
const CENTER_FOCUS_RATIO: f64 = 1.1;
const WIDESCREEN_RANGE: (f64, f64) = (1.5, 1.8);

fn average_brightness(buffer: &PixelBuffer, x0: u32, x1: u32, y0: u32, y1: u32) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for y in y0..y1 {
        for x in x0..x1 {
            total += buffer.gray(x, y) as f64;
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Brightness of the central third relative to the whole frame, plus aspect ratio.
pub fn score_composition(buffer: &PixelBuffer) -> ScoreResult {
    let (w, h) = (buffer.width(), buffer.height());
    let overall = average_brightness(buffer, 0, w, 0, h);
    let (cx0, cx1) = (w / 3, (2 * w / 3).max(w / 3 + 1).min(w));
    let (cy0, cy1) = (h / 3, (2 * h / 3).max(h / 3 + 1).min(h));
    let center = average_brightness(buffer, cx0, cx1, cy0, cy1);

    let mut score = BASE_SCORE;
    let mut reasons = Vec::new();

    if center > overall * CENTER_FOCUS_RATIO {
        score += CENTER_FOCUS_BONUS;
        reasons.push("Strong center focus draws the eye to the subject".to_string());
    } else {
        reasons.push("Subject could be better centered or highlighted".to_string());
    }

    let aspect = buffer.aspect_ratio();
    if (WIDESCREEN_RANGE.0..=WIDESCREEN_RANGE.1).contains(&aspect) {
        score += ASPECT_BONUS;
        reasons.push("Perfect 16:9 aspect ratio for YouTube".to_string());
    } else {
        reasons.push("Non-standard aspect ratio may be cropped on some surfaces".to_string());
    }

    ScoreResult::new(score, &reasons)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_gray_widescreen_gets_aspect_bonus_only() {
        let result = score_composition(&PixelBuffer::filled(192, 108, [128, 128, 128, 255]));
        assert_eq!(result.score, 80);
        assert!(result.reason.contains("16:9"));
        assert!(!result.reason.contains("Non-standard"));
    }

    #[test]
    fn bright_center_scores_focus_bonus() {
        let buffer = PixelBuffer::from_fn(160, 90, |x, y| {
            if (60..100).contains(&x) && (35..55).contains(&y) {
                [250, 250, 250, 255]
            } else {
                [40, 40, 40, 255]
            }
        });
        let result = score_composition(&buffer);
        assert_eq!(result.score, 95);
        assert!(result.reason.contains("center focus"));
    }

    #[test]
    fn square_image_flags_cropping() {
        let result = score_composition(&PixelBuffer::filled(50, 50, [90, 90, 90, 255]));
        assert_eq!(result.score, 70);
        assert!(result.reason.contains("Non-standard aspect ratio"));
    }
}
