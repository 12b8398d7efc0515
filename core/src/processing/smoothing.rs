use crate::prelude::{HeatmapConfig, ProcessingStage, StageError, StageResult};
use crate::processing::buffer_pool::BufferPool;
use crate::processing::saliency::SaliencyMap;
use crate::telemetry::log::LogManager;

/// One sampled kernel tap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelTap {
    pub dx: isize,
    pub dy: isize,
    pub weight: f32,
}

/// Offsets `0, ±stride, ±2·stride, ...` within `radius`, ascending.
fn symmetric_offsets(radius: usize, stride: usize) -> Vec<isize> {
    let stride = stride.max(1);
    let steps = (radius / stride) as isize;
    let stride = stride as isize;
    (-steps..=steps).map(|step| step * stride).collect()
}

/// Gaussian taps on a centred lattice within `radius`, sampled every `stride` pixels.
pub fn sparse_gaussian_kernel(radius: usize, stride: usize, sigma: f32) -> Vec<KernelTap> {
    let offsets = symmetric_offsets(radius, stride);
    let two_sigma_sq = 2.0 * sigma.max(f32::EPSILON).powi(2);
    let mut taps = Vec::with_capacity(offsets.len() * offsets.len());
    for &dy in &offsets {
        for &dx in &offsets {
            let distance_sq = (dx * dx + dy * dy) as f32;
            taps.push(KernelTap {
                dx,
                dy,
                weight: (-distance_sq / two_sigma_sq).exp(),
            });
        }
    }
    taps
}

/// Weighted-average blur over a sparse Gaussian kernel with edge replication.
pub struct SmoothingStage {
    pool: BufferPool,
    kernel: Vec<KernelTap>,
    logger: LogManager,
}

impl SmoothingStage {
    pub fn new(pool_size: usize) -> Self {
        Self {
            pool: BufferPool::with_capacity(pool_size),
            kernel: Vec::new(),
            logger: LogManager::new("smoothing"),
        }
    }
}

impl ProcessingStage for SmoothingStage {
    type Input = SaliencyMap;
    type Output = SaliencyMap;

    fn initialize(&mut self, config: &HeatmapConfig) -> StageResult<()> {
        self.kernel = sparse_gaussian_kernel(config.blur_radius, config.blur_stride, config.blur_sigma);
        Ok(())
    }

    fn execute(&mut self, input: SaliencyMap) -> StageResult<SaliencyMap> {
        if self.kernel.is_empty() {
            return Err(StageError::Internal("stage not initialized".into()));
        }
        if input.is_empty() {
            return Err(StageError::InvalidInput("empty saliency map".into()));
        }

        let width = input.width();
        let height = input.height();
        let mut output = self.pool.checkout(width * height)?;

        for y in 0..height {
            for x in 0..width {
                let mut total = 0.0;
                let mut weight_sum = 0.0;
                for tap in &self.kernel {
                    let value = input.get_clamped(x as isize + tap.dx, y as isize + tap.dy);
                    total += value * tap.weight;
                    weight_sum += tap.weight;
                }
                output[y * width + x] = total / weight_sum;
            }
        }

        self.pool.detach();
        self.logger.record(&format!(
            "blurred {}x{} with {} kernel taps",
            width,
            height,
            self.kernel.len()
        ));
        SaliencyMap::from_vec(width, height, output)
    }

    fn cleanup(&mut self) {
        self.pool.reset();
        self.kernel.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn smooth(map: SaliencyMap) -> SaliencyMap {
        let mut stage = SmoothingStage::new(2);
        stage.initialize(&HeatmapConfig::default()).unwrap();
        let output = stage.execute(map).unwrap();
        stage.cleanup();
        output
    }

    #[test]
    fn default_kernel_samples_even_offsets_only() {
        let kernel = sparse_gaussian_kernel(12, 2, 6.0);
        assert_eq!(kernel.len(), 13 * 13);
        assert!(kernel.iter().all(|tap| tap.dx % 2 == 0 && tap.dy % 2 == 0));
        let center = kernel.iter().find(|t| t.dx == 0 && t.dy == 0).unwrap();
        assert_relative_eq!(center.weight, 1.0);
    }

    #[test]
    fn odd_radius_kernel_stays_centred() {
        let kernel = sparse_gaussian_kernel(5, 2, 3.0);
        assert_eq!(kernel.len(), 5 * 5);
        assert!(kernel.iter().any(|t| t.dx == 0 && t.dy == 0));
        assert_eq!(kernel.iter().map(|t| t.dx).sum::<isize>(), 0);
        assert_eq!(kernel.iter().map(|t| t.dx).max(), Some(4));
        assert_eq!(kernel.iter().map(|t| t.dy).min(), Some(-4));
    }

    #[test]
    fn smoothing_preserves_shape() {
        let map = SaliencyMap::zeros(31, 7);
        let output = smooth(map);
        assert_eq!(output.len(), 31 * 7);
        assert_eq!(output.width(), 31);
    }

    #[test]
    fn constant_map_stays_constant() {
        let map = SaliencyMap::from_vec(6, 4, vec![42.0; 24]).unwrap();
        let output = smooth(map);
        assert!(output.iter().all(|v| (v - 42.0).abs() < 1e-3));
    }

    #[test]
    fn single_spike_spreads_to_neighbours() {
        let mut values = vec![0.0; 25 * 25];
        values[12 * 25 + 12] = 100.0;
        let output = smooth(SaliencyMap::from_vec(25, 25, values).unwrap());
        assert!(output.get(12, 12) < 100.0);
        assert!(output.get(14, 12) > 0.0);
        assert!(output.get(12, 12) > output.get(20, 20));
    }
}
