use ndarray::Array2;

use crate::imaging::PixelBuffer;
use crate::prelude::{HeatmapConfig, ProcessingStage, StageError, StageResult};
use crate::telemetry::log::LogManager;

/// Per-pixel attention estimate, indexed `[[y, x]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SaliencyMap {
    values: Array2<f32>,
}

impl SaliencyMap {
    pub fn from_vec(width: usize, height: usize, values: Vec<f32>) -> StageResult<Self> {
        let values = Array2::from_shape_vec((height, width), values)
            .map_err(|err| StageError::InvalidInput(format!("saliency shape: {}", err)))?;
        Ok(Self { values })
    }

    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            values: Array2::zeros((height, width)),
        }
    }

    pub fn width(&self) -> usize {
        self.values.ncols()
    }

    pub fn height(&self) -> usize {
        self.values.nrows()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[[y, x]]
    }

    /// Reads with coordinates clamped to the map bounds (edge replication).
    pub fn get_clamped(&self, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, self.width() as isize - 1) as usize;
        let cy = y.clamp(0, self.height() as isize - 1) as usize;
        self.values[[cy, cx]]
    }

    /// Row-major iteration, same order as the source pixel buffer.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        self.values.iter().copied()
    }

    pub fn min_max(&self) -> Option<(f32, f32)> {
        let mut iter = self.iter();
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))))
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.values.into_raw_vec()
    }
}

/// Saliency stage combining edge energy, saturation, brightness, a skin-tone
/// bonus and a radial center bias.
pub struct SaliencyStage {
    config: Option<HeatmapConfig>,
    logger: LogManager,
}

impl SaliencyStage {
    pub fn new() -> Self {
        Self {
            config: None,
            logger: LogManager::new("saliency"),
        }
    }
}

impl Default for SaliencyStage {
    fn default() -> Self {
        Self::new()
    }
}

fn grayscale_grid(buffer: &PixelBuffer) -> Array2<f32> {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    Array2::from_shape_fn((height, width), |(y, x)| buffer.gray(x as u32, y as u32))
}

/// Sobel gradient magnitude at an interior pixel.
pub(crate) fn sobel_magnitude(gray: &Array2<f32>, x: usize, y: usize) -> f32 {
    let p = |dx: isize, dy: isize| {
        gray[[
            (y as isize + dy) as usize,
            (x as isize + dx) as usize,
        ]]
    };
    let gx = -p(-1, -1) - 2.0 * p(-1, 0) - p(-1, 1) + p(1, -1) + 2.0 * p(1, 0) + p(1, 1);
    let gy = -p(-1, -1) - 2.0 * p(0, -1) - p(1, -1) + p(-1, 1) + 2.0 * p(0, 1) + p(1, 1);
    (gx * gx + gy * gy).sqrt()
}

fn saturation(r: f32, g: f32, b: f32) -> f32 {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    if max <= 0.0 {
        0.0
    } else {
        (max - min) / max
    }
}

fn is_skin_tone(config: &HeatmapConfig, r: u8, g: u8, b: u8) -> bool {
    r > config.skin_min_red
        && g > config.skin_min_green
        && b > config.skin_min_blue
        && r > b
        && (r as i16 - g as i16).unsigned_abs() < config.skin_max_red_green_gap as u16
}

/// `exp(-k * d) * C` where `d` is the distance from center over the half-diagonal.
pub(crate) fn center_bias(config: &HeatmapConfig, x: usize, y: usize, w: usize, h: usize) -> f32 {
    let cx = w as f32 / 2.0;
    let cy = h as f32 / 2.0;
    let half_diagonal = (cx * cx + cy * cy).sqrt().max(f32::EPSILON);
    let dx = x as f32 - cx;
    let dy = y as f32 - cy;
    let distance = (dx * dx + dy * dy).sqrt() / half_diagonal;
    (-config.center_bias_falloff * distance).exp() * config.center_bias_strength
}

impl ProcessingStage for SaliencyStage {
    type Input = PixelBuffer;
    type Output = SaliencyMap;

    fn initialize(&mut self, config: &HeatmapConfig) -> StageResult<()> {
        self.config = Some(config.clone());
        Ok(())
    }

    fn execute(&mut self, input: PixelBuffer) -> StageResult<SaliencyMap> {
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| StageError::Internal("stage not initialized".into()))?;
        if input.is_empty() {
            return Err(StageError::InvalidInput(format!(
                "cannot estimate saliency of a {}x{} image",
                input.width(),
                input.height()
            )));
        }

        let width = input.width() as usize;
        let height = input.height() as usize;
        let gray = grayscale_grid(&input);
        let mut values = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                let [r, g, b, _] = input.pixel(x as u32, y as u32);
                let (rf, gf, bf) = (r as f32, g as f32, b as f32);

                let interior = x >= 1 && y >= 1 && x + 1 < width && y + 1 < height;
                let edge = if interior {
                    sobel_magnitude(&gray, x, y)
                } else {
                    0.0
                };
                let brightness = (rf + gf + bf) / 3.0;
                let skin = if is_skin_tone(config, r, g, b) {
                    config.skin_boost
                } else {
                    0.0
                };

                let score = edge * config.edge_weight
                    + saturation(rf, gf, bf) * config.saturation_weight
                    + brightness * config.brightness_weight
                    + skin
                    + center_bias(config, x, y, width, height);
                values.push(score);
            }
        }

        let map = SaliencyMap::from_vec(width, height, values)?;
        if let Some((lo, hi)) = map.min_max() {
            self.logger.record(&format!(
                "{}x{} saliency range {:.2}..{:.2}",
                width, height, lo, hi
            ));
        }
        Ok(map)
    }

    fn cleanup(&mut self) {
        self.config = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn run(buffer: PixelBuffer) -> SaliencyMap {
        let mut stage = SaliencyStage::new();
        stage.initialize(&HeatmapConfig::default()).unwrap();
        let map = stage.execute(buffer).unwrap();
        stage.cleanup();
        map
    }

    #[test]
    fn saliency_map_matches_pixel_count() {
        let map = run(PixelBuffer::filled(17, 9, [90, 40, 200, 255]));
        assert_eq!(map.len(), 17 * 9);
        assert_eq!(map.width(), 17);
        assert_eq!(map.height(), 9);
    }

    #[test]
    fn flat_image_peaks_at_center() {
        let map = run(PixelBuffer::filled(21, 21, [50, 50, 50, 255]));
        let center = map.get(10, 10);
        assert!(center > map.get(0, 0));
        assert!(center > map.get(20, 10));
    }

    #[test]
    fn flat_gray_center_score_is_brightness_plus_bias() {
        let map = run(PixelBuffer::filled(20, 20, [100, 100, 100, 255]));
        // Exact center: zero edges, zero saturation, full center bias.
        assert_relative_eq!(map.get(10, 10), 100.0 * 0.4 + 50.0, epsilon = 1e-3);
    }

    #[test]
    fn edges_raise_saliency() {
        let buffer = PixelBuffer::from_fn(20, 20, |x, _| {
            if x < 10 {
                [0, 0, 0, 255]
            } else {
                [255, 255, 255, 255]
            }
        });
        let map = run(buffer);
        // Same column distance from center, left of the edge vs. on it.
        assert!(map.get(9, 5) > map.get(3, 5));
    }

    #[test]
    fn skin_tone_pixels_receive_boost() {
        let config = HeatmapConfig::default();
        assert!(is_skin_tone(&config, 200, 170, 140));
        assert!(!is_skin_tone(&config, 200, 100, 140));
        assert!(!is_skin_tone(&config, 60, 50, 40));
    }

    #[test]
    fn saturation_of_black_is_zero() {
        assert_eq!(saturation(0.0, 0.0, 0.0), 0.0);
        assert_relative_eq!(saturation(255.0, 0.0, 0.0), 1.0);
    }

    #[test]
    fn execute_rejects_zero_sized_image() {
        let mut stage = SaliencyStage::new();
        stage.initialize(&HeatmapConfig::default()).unwrap();
        assert!(matches!(
            stage.execute(PixelBuffer::filled(0, 0, [0, 0, 0, 255])),
            Err(StageError::InvalidInput(_))
        ));
    }

    #[test]
    fn execute_requires_initialize() {
        let mut stage = SaliencyStage::new();
        assert!(stage
            .execute(PixelBuffer::filled(2, 2, [0, 0, 0, 255]))
            .is_err());
    }
}
