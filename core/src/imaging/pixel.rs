use std::io::Cursor;

use image::{imageops::FilterType, DynamicImage, ImageOutputFormat, RgbaImage};

use crate::prelude::{StageError, StageResult};

/// Row-major RGBA grid with the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> StageResult<Self> {
        if width == 0 || height == 0 {
            return Err(StageError::InvalidInput(format!(
                "image must not be empty ({}x{})",
                width, height
            )));
        }
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(StageError::InvalidInput(format!(
                "expected {} RGBA bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Buffer where every pixel holds the same RGBA value. Unlike [`new`](Self::new)
    /// this accepts a zero-sized grid; stages reject those at execution time.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let count = width as usize * height as usize;
        let data = rgba.iter().copied().cycle().take(count * 4).collect();
        Self {
            width,
            height,
            data,
        }
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel. Zero-sized
    /// grids are allowed, as with [`filled`](Self::filled).
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [u8; 4]) -> Self {
        let mut data = Vec::with_capacity(width as usize * height as usize * 4);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    /// Decodes any format the `image` crate understands.
    pub fn decode(bytes: &[u8]) -> StageResult<Self> {
        let decoded =
            image::load_from_memory(bytes).map_err(|err| StageError::Decode(err.to_string()))?;
        Self::from_rgba_image(decoded.to_rgba8())
    }

    pub fn encode_png(&self) -> StageResult<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(self.to_rgba_image()?)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .map_err(|err| StageError::Encode(err.to_string()))?;
        Ok(cursor.into_inner())
    }

    pub fn from_rgba_image(image: RgbaImage) -> StageResult<Self> {
        let (width, height) = image.dimensions();
        Self::new(width, height, image.into_raw())
    }

    pub fn to_rgba_image(&self) -> StageResult<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
            .ok_or_else(|| StageError::Internal("pixel data does not fit dimensions".into()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]
    }

    /// Unweighted channel average.
    pub fn gray(&self, x: u32, y: u32) -> f32 {
        let [r, g, b, _] = self.pixel(x, y);
        (r as f32 + g as f32 + b as f32) / 3.0
    }

    pub fn pixels(&self) -> impl Iterator<Item = [u8; 4]> + '_ {
        self.data
            .chunks_exact(4)
            .map(|px| [px[0], px[1], px[2], px[3]])
    }

    /// Proportionally shrinks the buffer so neither side exceeds `max_dimension`.
    pub fn downscaled(&self, max_dimension: u32) -> StageResult<Self> {
        let longest = self.width.max(self.height);
        if max_dimension == 0 || longest <= max_dimension {
            return Ok(self.clone());
        }
        let scale = max_dimension as f64 / longest as f64;
        let width = ((self.width as f64 * scale).round() as u32).max(1);
        let height = ((self.height as f64 * scale).round() as u32).max(1);
        self.resized(width, height)
    }

    pub fn resized(&self, width: u32, height: u32) -> StageResult<Self> {
        if width == self.width && height == self.height {
            return Ok(self.clone());
        }
        let source = self.to_rgba_image()?;
        let scaled = image::imageops::resize(&source, width, height, FilterType::Triangle);
        Self::from_rgba_image(scaled)
    }
}
