use anyhow::{ensure, Context};
use std::path::Path;

pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;
pub const TARGET_ASPECT_RATIO: f64 = 16.0 / 9.0;
/// Relative deviation from 16:9 still accepted.
pub const ASPECT_TOLERANCE: f64 = 0.01;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Type and size checks done before the bytes are read.
pub fn validate_file(path: &Path, size: u64) -> anyhow::Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .with_context(|| format!("{} has no file extension", path.display()))?;
    ensure!(
        IMAGE_EXTENSIONS.contains(&extension.as_str()),
        "{} is not an image file (expected one of {})",
        path.display(),
        IMAGE_EXTENSIONS.join(", ")
    );
    ensure!(
        size <= MAX_UPLOAD_BYTES,
        "{} is {} bytes; uploads are limited to 50MB",
        path.display(),
        size
    );
    Ok(())
}

pub fn validate_aspect(width: u32, height: u32) -> anyhow::Result<()> {
    ensure!(width > 0 && height > 0, "image has no pixels");
    let ratio = width as f64 / height as f64;
    let deviation = (ratio - TARGET_ASPECT_RATIO).abs() / TARGET_ASPECT_RATIO;
    ensure!(
        deviation <= ASPECT_TOLERANCE,
        "{}x{} is not 16:9 (ratio {:.3}); resize to e.g. 1280x720",
        width,
        height,
        ratio
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_common_image_extensions() {
        assert!(validate_file(Path::new("thumb.PNG"), 1024).is_ok());
        assert!(validate_file(Path::new("thumb.jpeg"), 1024).is_ok());
    }

    #[test]
    fn rejects_non_images_and_oversized_files() {
        assert!(validate_file(Path::new("notes.txt"), 10).is_err());
        assert!(validate_file(Path::new("thumb"), 10).is_err());
        assert!(validate_file(Path::new("thumb.png"), MAX_UPLOAD_BYTES + 1).is_err());
    }

    #[test]
    fn aspect_check_allows_one_percent() {
        assert!(validate_aspect(1920, 1080).is_ok());
        assert!(validate_aspect(1280, 720).is_ok());
        assert!(validate_aspect(1930, 1080).is_ok());
        assert!(validate_aspect(1080, 1080).is_err());
        assert!(validate_aspect(1000, 0).is_err());
    }
}
