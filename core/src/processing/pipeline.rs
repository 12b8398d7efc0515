use std::sync::Arc;

use crate::imaging::PixelBuffer;
use crate::prelude::{HeatmapConfig, ProcessingStage, StageResult};
use crate::processing::render::{HeatmapRenderer, RenderInput};
use crate::processing::saliency::{SaliencyMap, SaliencyStage};
use crate::processing::smoothing::SmoothingStage;
use crate::telemetry::{LogManager, MetricsRecorder};

/// Everything a caller may want to keep from one heatmap run.
#[derive(Debug, Clone)]
pub struct HeatmapOutput {
    pub image: PixelBuffer,
    pub smoothed: SaliencyMap,
    pub analysis_width: u32,
    pub analysis_height: u32,
}

/// Chains saliency -> smoothing -> render for one image at a time.
#[derive(Clone)]
pub struct HeatmapPipeline {
    config: HeatmapConfig,
    metrics: Arc<MetricsRecorder>,
    logger: LogManager,
}

impl HeatmapPipeline {
    pub fn new(config: HeatmapConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(MetricsRecorder::new()),
            logger: LogManager::new("heatmap"),
        }
    }

    pub fn config(&self) -> &HeatmapConfig {
        &self.config
    }

    pub fn metrics(&self) -> &MetricsRecorder {
        &self.metrics
    }

    pub fn execute(&self, source: &PixelBuffer) -> StageResult<HeatmapOutput> {
        let analysis = source.downscaled(self.config.max_dimension)?;
        let (analysis_width, analysis_height) = (analysis.width(), analysis.height());

        let mut saliency_stage = SaliencyStage::new();
        saliency_stage.initialize(&self.config)?;
        let raw = saliency_stage.execute(analysis)?;
        saliency_stage.cleanup();

        let mut smoothing_stage = SmoothingStage::new(1);
        smoothing_stage.initialize(&self.config)?;
        let smoothed = smoothing_stage.execute(raw)?;
        smoothing_stage.cleanup();

        let mut renderer = HeatmapRenderer::new();
        renderer.initialize(&self.config)?;
        let image = renderer.execute(RenderInput {
            smoothed: smoothed.clone(),
            source: source.clone(),
        })?;
        renderer.cleanup();

        Ok(HeatmapOutput {
            image,
            smoothed,
            analysis_width,
            analysis_height,
        })
    }

    /// Like [`execute`](Self::execute) but falls back to the untouched source on failure.
    pub fn render_or_original(&self, source: &PixelBuffer) -> PixelBuffer {
        match self.execute(source) {
            Ok(output) => {
                self.metrics.record_processed();
                output.image
            }
            Err(err) => {
                self.metrics.record_error();
                self.logger
                    .degraded(&format!("heatmap failed, returning original: {}", err));
                source.clone()
            }
        }
    }

    /// Decodes `bytes`, renders a PNG heatmap, or hands the input back unmodified.
    pub fn render_bytes(&self, bytes: &[u8]) -> Vec<u8> {
        let rendered = PixelBuffer::decode(bytes).and_then(|source| {
            let output = self.execute(&source)?;
            output.image.encode_png()
        });
        match rendered {
            Ok(png) => {
                self.metrics.record_processed();
                png
            }
            Err(err) => {
                self.metrics.record_error();
                self.logger
                    .degraded(&format!("heatmap failed, returning original bytes: {}", err));
                bytes.to_vec()
            }
        }
    }
}

impl Default for HeatmapPipeline {
    fn default() -> Self {
        Self::new(HeatmapConfig::default())
    }
}

/// Renders a heatmap at source resolution; never fails.
pub fn generate_heatmap(source: &PixelBuffer, config: &HeatmapConfig) -> PixelBuffer {
    HeatmapPipeline::new(config.clone()).render_or_original(source)
}

/// Byte-level variant for callers holding an encoded upload.
pub fn render_heatmap_bytes(bytes: &[u8], config: &HeatmapConfig) -> Vec<u8> {
    HeatmapPipeline::new(config.clone()).render_bytes(bytes)
}

/// Runs the CPU-bound pipeline on the blocking pool so async callers stay responsive.
pub async fn generate_heatmap_async(source: PixelBuffer, config: HeatmapConfig) -> PixelBuffer {
    let fallback = source.clone();
    let pipeline = HeatmapPipeline::new(config);
    match tokio::task::spawn_blocking(move || pipeline.render_or_original(&source)).await {
        Ok(image) => image,
        Err(err) => {
            LogManager::new("heatmap")
                .degraded(&format!("heatmap task aborted, returning original: {}", err));
            fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, |x, y| {
            [(x * 7 % 256) as u8, (y * 13 % 256) as u8, 90, 255]
        })
    }

    #[test]
    fn output_keeps_source_resolution() {
        let source = gradient(64, 36);
        let output = HeatmapPipeline::default().execute(&source).unwrap();
        assert_eq!((output.image.width(), output.image.height()), (64, 36));
        assert_eq!(output.smoothed.len(), 64 * 36);
    }

    #[test]
    fn large_sources_are_analysed_downscaled() {
        let config = HeatmapConfig {
            max_dimension: 32,
            ..Default::default()
        };
        let output = HeatmapPipeline::new(config)
            .execute(&gradient(128, 72))
            .unwrap();
        assert_eq!((output.analysis_width, output.analysis_height), (32, 18));
        assert_eq!(output.smoothed.len(), 32 * 18);
        assert_eq!(output.image.width(), 128);
    }

    #[test]
    fn undecodable_bytes_are_returned_unmodified() {
        let bytes = b"definitely not a png".to_vec();
        let pipeline = HeatmapPipeline::default();
        assert_eq!(pipeline.render_bytes(&bytes), bytes);
        assert_eq!(pipeline.metrics().snapshot().errors, 1);
    }

    #[test]
    fn zero_sized_source_is_returned_unchanged() {
        let empty = PixelBuffer::filled(0, 0, [10, 20, 30, 255]);
        let pipeline = HeatmapPipeline::default();
        assert!(pipeline.execute(&empty).is_err());
        assert_eq!(pipeline.render_or_original(&empty), empty);
        assert_eq!(pipeline.metrics().snapshot().errors, 1);
        assert_eq!(generate_heatmap(&empty, &HeatmapConfig::default()), empty);
    }

    #[test]
    fn truncated_png_is_returned_unmodified() {
        let png = gradient(48, 27).encode_png().unwrap();
        let truncated = png[..png.len() / 2].to_vec();
        let output = render_heatmap_bytes(&truncated, &HeatmapConfig::default());
        assert_eq!(output, truncated);
    }

    #[test]
    fn encoded_input_produces_png_heatmap() {
        let png = gradient(48, 27).encode_png().unwrap();
        let output = render_heatmap_bytes(&png, &HeatmapConfig::default());
        let decoded = PixelBuffer::decode(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (48, 27));
    }

    #[tokio::test]
    async fn async_variant_renders_off_thread() {
        let source = gradient(32, 18);
        let image = generate_heatmap_async(source.clone(), HeatmapConfig::default()).await;
        assert_eq!(image.width(), 32);
        assert_ne!(image, source);
    }

    proptest! {
        #[test]
        fn saliency_shape_matches_any_image(width in 1u32..24, height in 1u32..24, seed in 0u8..255) {
            let source = PixelBuffer::from_fn(width, height, |x, y| {
                [seed.wrapping_add(x as u8), seed.wrapping_mul(y as u8), 40, 255]
            });
            let output = HeatmapPipeline::default().execute(&source).unwrap();
            prop_assert_eq!(output.smoothed.len(), (width * height) as usize);
            prop_assert_eq!(output.image.pixel_count(), (width * height) as usize);
        }
    }
}
