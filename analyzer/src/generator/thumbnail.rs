use creatorcore::imaging::PixelBuffer;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Synthetic thumbnail: a colour gradient, a warm subject block in the middle
/// third, and a band of high-contrast stripes standing in for title text.
pub fn build_thumbnail(width: u32, height: u32, seed: u64) -> PixelBuffer {
    let mut rng = StdRng::seed_from_u64(seed);
    let hue_shift: u8 = rng.gen();
    let (w, h) = (width.max(1), height.max(1));

    PixelBuffer::from_fn(w, h, |x, y| {
        let in_subject = x > w / 3 && x < 2 * w / 3 && y > h / 4 && y < 3 * h / 4;
        let in_caption = y > h / 12 && y < h / 5 && x > w / 10 && x < 9 * w / 10;
        if in_subject {
            [225, 172, 140, 255]
        } else if in_caption {
            if (x / 3) % 2 == 0 {
                [250, 250, 250, 255]
            } else {
                [15, 15, 15, 255]
            }
        } else {
            let r = (x * 255 / w) as u8;
            let b = (y * 255 / h) as u8;
            [r.wrapping_add(hue_shift) / 2, 40, b / 2 + 60, 255]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_has_requested_size() {
        let thumb = build_thumbnail(128, 72, 5);
        assert_eq!((thumb.width(), thumb.height()), (128, 72));
    }

    #[test]
    fn subject_block_does_not_depend_on_seed() {
        let a = build_thumbnail(64, 36, 1);
        let b = build_thumbnail(64, 36, 2);
        assert_eq!(a.pixel(32, 18), b.pixel(32, 18));
        assert_eq!(a.pixel(32, 18), [225, 172, 140, 255]);
    }
}
