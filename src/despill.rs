//! Green spill suppression along the key boundary.
//!
//! Light bouncing off a green screen leaves a thin green halo on the subject.
//! Every foreground pixel that touches the background (4-connected) has its
//! green channel clamped to `max(R, B)`. Green is never raised and no other
//! channel is touched, so a second pass changes nothing.

use image::RgbaImage;

use crate::mask::Mask;

/// Whether the foreground pixel at `(x, y)` has a background 4-neighbor.
///
/// Pixels outside the image are not neighbors.
///
/// # Panics
///
/// Panics if `(x, y)` is outside the mask.
#[must_use]
pub fn is_edge_pixel(background: &Mask, x: u32, y: u32) -> bool {
    if background.get(x, y) {
        return false;
    }
    let (w, h) = background.dimensions();
    (y > 0 && background.get(x, y - 1))
        || (y + 1 < h && background.get(x, y + 1))
        || (x > 0 && background.get(x - 1, y))
        || (x + 1 < w && background.get(x + 1, y))
}

/// Clamp green spill on edge pixels in place.
///
/// Returns the number of pixels whose green channel was lowered.
///
/// # Panics
///
/// Panics if the mask and image dimensions differ.
pub fn despill_edges(image: &mut RgbaImage, background: &Mask) -> usize {
    assert_eq!(
        image.dimensions(),
        background.dimensions(),
        "background mask must match image dimensions"
    );

    let mut clamped = 0;
    for (x, y, px) in image.enumerate_pixels_mut() {
        if !is_edge_pixel(background, x, y) {
            continue;
        }
        let max_rb = px[0].max(px[2]);
        if px[1] > max_rb {
            px[1] = max_rb;
            clamped += 1;
        }
    }
    clamped
}
