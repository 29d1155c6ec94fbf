//! Binary transparency from a background mask.

use image::RgbaImage;

use crate::mask::Mask;

/// Set alpha to 0 for every pixel in `background`.
///
/// Color channels are left as they are, and pixels outside the mask keep
/// their original alpha. Returns the number of pixels made transparent.
///
/// # Panics
///
/// Panics if the mask and image dimensions differ.
pub fn apply_background_alpha(image: &mut RgbaImage, background: &Mask) -> usize {
    assert_eq!(
        image.dimensions(),
        background.dimensions(),
        "background mask must match image dimensions"
    );

    let mut cleared = 0;
    for (px, &is_bg) in image.pixels_mut().zip(background.as_slice()) {
        if is_bg {
            px[3] = 0;
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn masked_pixels_become_transparent_and_others_keep_alpha() {
        let mut img = RgbaImage::from_fn(3, 3, |x, y| {
            #[allow(clippy::cast_possible_truncation)]
            let a = (50 + 20 * (y * 3 + x)) as u8;
            Rgba([10, 200, 30, a])
        });
        let original = img.clone();
        let mut mask = Mask::new(3, 3);
        mask.set(0, 0, true);
        mask.set(2, 1, true);

        let cleared = apply_background_alpha(&mut img, &mask);
        assert_eq!(cleared, 2);

        for (x, y, px) in img.enumerate_pixels() {
            let before = original.get_pixel(x, y);
            assert_eq!(px.0[..3], before.0[..3], "RGB changed at ({x}, {y})");
            if mask.get(x, y) {
                assert_eq!(px[3], 0);
            } else {
                assert_eq!(px[3], before[3]);
            }
        }
    }

    #[test]
    #[should_panic(expected = "must match image dimensions")]
    fn mismatched_mask_panics() {
        let mut img = RgbaImage::new(4, 4);
        let _ = apply_background_alpha(&mut img, &Mask::new(4, 3));
    }
}
