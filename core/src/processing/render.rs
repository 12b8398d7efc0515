use crate::imaging::PixelBuffer;
use crate::prelude::{HeatmapConfig, ProcessingStage, StageError, StageResult};
use crate::processing::saliency::SaliencyMap;
use crate::telemetry::log::LogManager;

/// Smoothed map plus the full-resolution image it was computed from.
#[derive(Debug, Clone)]
pub struct RenderInput {
    pub smoothed: SaliencyMap,
    pub source: PixelBuffer,
}

/// Min-max normalization into [0, 1]; a flat map normalizes to all zeros.
pub fn normalize(map: &SaliencyMap) -> Vec<f32> {
    let Some((min, max)) = map.min_max() else {
        return Vec::new();
    };
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return vec![0.0; map.len()];
    }
    map.iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}

/// Gamma below one lifts mid and low values toward visibility.
pub fn apply_contrast(normalized: f32, gamma: f32) -> f32 {
    normalized.clamp(0.0, 1.0).powf(gamma)
}

/// Six-stop ramp: deep blue, cyan, green, yellow, orange, red.
pub fn ramp_color(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let (r, g, b) = if t < 0.15 {
        (0.0, 0.0, 128.0 + 127.0 * (t / 0.15))
    } else if t < 0.35 {
        (0.0, 255.0 * (t - 0.15) / 0.20, 255.0)
    } else if t < 0.55 {
        (0.0, 255.0, 255.0 * (1.0 - (t - 0.35) / 0.20))
    } else if t < 0.70 {
        (255.0 * (t - 0.55) / 0.15, 255.0, 0.0)
    } else if t < 0.85 {
        (255.0, 255.0 - 90.0 * (t - 0.70) / 0.15, 0.0)
    } else {
        (255.0, 165.0 * (1.0 - (t - 0.85) / 0.15), 0.0)
    };
    [channel(r), channel(g), channel(b)]
}

fn channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

pub fn overlay_alpha(t: f32, config: &HeatmapConfig) -> u8 {
    channel(t * config.alpha_scale + config.alpha_offset)
}

/// Low-resolution RGBA overlay at the analysis size.
pub fn colorize(map: &SaliencyMap, config: &HeatmapConfig) -> StageResult<PixelBuffer> {
    let mut data = Vec::with_capacity(map.len() * 4);
    for normalized in normalize(map) {
        let t = apply_contrast(normalized, config.contrast_gamma);
        let [r, g, b] = ramp_color(t);
        data.extend_from_slice(&[r, g, b, overlay_alpha(t, config)]);
    }
    PixelBuffer::new(map.width() as u32, map.height() as u32, data)
}

/// Darkens the source, then alpha-blends the upscaled overlay on top.
pub fn composite(
    source: &PixelBuffer,
    overlay: &PixelBuffer,
    darken_opacity: f32,
) -> StageResult<PixelBuffer> {
    let overlay = overlay.resized(source.width(), source.height())?;
    let keep = 1.0 - darken_opacity.clamp(0.0, 1.0);

    let mut data = Vec::with_capacity(source.pixel_count() * 4);
    for (base, heat) in source.pixels().zip(overlay.pixels()) {
        let alpha = heat[3] as f32 / 255.0;
        for c in 0..3 {
            let darkened = base[c] as f32 * keep;
            data.push(channel(heat[c] as f32 * alpha + darkened * (1.0 - alpha)));
        }
        data.push(255);
    }
    PixelBuffer::new(source.width(), source.height(), data)
}

/// Final stage: colour ramp, upscale and composite over the darkened source.
pub struct HeatmapRenderer {
    config: Option<HeatmapConfig>,
    logger: LogManager,
}

impl HeatmapRenderer {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("render"),
        }
    }
}

impl Default for HeatmapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStage for HeatmapRenderer {
    type Input = RenderInput;
    type Output = PixelBuffer;

    fn initialize(&mut self, config: &HeatmapConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: RenderInput) -> StageResult<PixelBuffer> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;

        let overlay = colorize(&input.smoothed, config)?;
        let rendered = composite(&input.source, &overlay, config.darken_opacity)?;
        self.logger.record(&format!(
            "rendered {}x{} overlay onto {}x{} source",
            overlay.width(),
            overlay.height(),
            rendered.width(),
            rendered.height()
        ));
        Ok(rendered)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn flat_map_normalizes_to_zero_without_nan() {
        let map = SaliencyMap::from_vec(3, 2, vec![7.5; 6]).unwrap();
        let normalized = normalize(&map);
        assert_eq!(normalized, vec![0.0; 6]);
    }

    #[test]
    fn normalization_spans_unit_interval() {
        let map = SaliencyMap::from_vec(2, 2, vec![10.0, 20.0, 30.0, 50.0]).unwrap();
        let normalized = normalize(&map);
        assert_eq!(normalized.first(), Some(&0.0));
        assert_eq!(normalized.last(), Some(&1.0));
    }

    #[test]
    fn ramp_endpoints_are_deep_blue_and_red() {
        assert_eq!(ramp_color(0.0), [0, 0, 128]);
        assert_eq!(ramp_color(1.0), [255, 0, 0]);
        assert_eq!(ramp_color(0.35), [0, 255, 255]);
        assert_eq!(ramp_color(0.70), [255, 255, 0]);
    }

    #[test]
    fn low_saliency_stays_semi_visible() {
        let config = HeatmapConfig::default();
        assert_eq!(overlay_alpha(0.0, &config), 40);
        assert_eq!(overlay_alpha(1.0, &config), 255);
    }

    #[test]
    fn contrast_curve_boosts_mid_values() {
        assert!(apply_contrast(0.25, 0.65) > 0.25);
        assert_eq!(apply_contrast(1.0, 0.65), 1.0);
    }

    #[test]
    fn rendered_image_matches_source_resolution() {
        let source = PixelBuffer::filled(40, 20, [200, 200, 200, 255]);
        let map = SaliencyMap::from_vec(10, 5, (0..50).map(|v| v as f32).collect()).unwrap();
        let mut renderer = HeatmapRenderer::new();
        renderer.initialize(&HeatmapConfig::default()).unwrap();
        let output = renderer
            .execute(RenderInput {
                smoothed: map,
                source,
            })
            .unwrap();
        assert_eq!((output.width(), output.height()), (40, 20));
        assert!(output.pixels().all(|px| px[3] == 255));
    }

    #[test]
    fn transparent_overlay_leaves_darkened_source() {
        let source = PixelBuffer::filled(2, 2, [100, 100, 100, 255]);
        let overlay = PixelBuffer::filled(2, 2, [255, 0, 0, 0]);
        let output = composite(&source, &overlay, 0.4).unwrap();
        assert_eq!(output.pixel(0, 0), [60, 60, 60, 255]);
    }

    proptest! {
        #[test]
        fn normalized_values_stay_in_unit_interval(
            (width, height, values) in (1usize..12, 1usize..12).prop_flat_map(|(w, h)| {
                (Just(w), Just(h), prop::collection::vec(-1.0e4f32..1.0e4, w * h))
            })
        ) {
            let map = SaliencyMap::from_vec(width, height, values).unwrap();
            let normalized = normalize(&map);
            prop_assert_eq!(normalized.len(), width * height);
            prop_assert!(normalized.iter().all(|v| v.is_finite() && (0.0..=1.0).contains(v)));
            let (min, max) = map.min_max().unwrap();
            if max > min {
                prop_assert!(normalized.iter().any(|&v| v == 0.0));
                prop_assert!(normalized.iter().any(|&v| v == 1.0));
            } else {
                prop_assert!(normalized.iter().all(|&v| v == 0.0));
            }
        }

        #[test]
        fn flat_and_single_pixel_maps_normalize_to_zero(
            width in 1usize..12,
            height in 1usize..12,
            level in -1.0e4f32..1.0e4,
        ) {
            let flat = SaliencyMap::from_vec(width, height, vec![level; width * height]).unwrap();
            prop_assert!(normalize(&flat).iter().all(|&v| v == 0.0));
            let single = SaliencyMap::from_vec(1, 1, vec![level]).unwrap();
            prop_assert_eq!(normalize(&single), vec![0.0]);
        }
    }
}
