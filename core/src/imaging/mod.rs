pub mod pixel;

pub use pixel::PixelBuffer;
