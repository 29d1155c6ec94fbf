//! Per-pixel chroma-key classification.
//!
//! A pixel is keyed as green only when the green channel *dominates* red and
//! blue, not merely when it is bright. The three tests together reject white
//! highlights and skin tones while accepting saturated screen green:
//!
//! - `G >= g_min`
//! - `G - max(R, B) >= delta`
//! - `G >= max(R, B) * ratio`

use image::RgbaImage;

use crate::config::Thresholds;

/// A boolean mask aligned pixel-for-pixel with an image, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl Mask {
    /// Create a mask with every entry cleared.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width as usize * height as usize],
        }
    }

    /// Create a mask from row-major booleans.
    ///
    /// # Panics
    ///
    /// Panics if `bits.len() != width * height`.
    #[must_use]
    pub fn from_vec(width: u32, height: u32, bits: Vec<bool>) -> Self {
        assert_eq!(
            bits.len(),
            width as usize * height as usize,
            "mask length {} does not match dimensions {width}x{height}",
            bits.len(),
        );
        Self {
            width,
            height,
            bits,
        }
    }

    /// Mask width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Number of entries (`width * height`).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Whether the mask has no entries at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Entry at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn get(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.bits[self.index(x, y)]
    }

    /// Set the entry at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn set(&mut self, x: u32, y: u32, value: bool) {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        let idx = self.index(x, y);
        self.bits[idx] = value;
    }

    /// Flat row-major view of the entries.
    #[must_use]
    pub fn as_slice(&self) -> &[bool] {
        &self.bits
    }

    pub(crate) fn as_mut_slice(&mut self) -> &mut [bool] {
        &mut self.bits
    }

    /// Number of set entries.
    #[must_use]
    pub fn count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Whether every set entry of `self` is also set in `other`.
    ///
    /// Masks of different dimensions are never subsets of each other.
    #[must_use]
    pub fn is_subset_of(&self, other: &Self) -> bool {
        self.dimensions() == other.dimensions()
            && self
                .bits
                .iter()
                .zip(&other.bits)
                .all(|(&a, &b)| !a || b)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Classify a single RGB triple.
///
/// Arithmetic is done in `i32`/`f64` so `G - max(R, B)` and the ratio product
/// cannot overflow or wrap.
#[inline]
#[must_use]
pub fn is_key_green(r: u8, g: u8, b: u8, thresholds: &Thresholds) -> bool {
    let g = i32::from(g);
    let max_rb = i32::from(r.max(b));
    g >= thresholds.g_min
        && g - max_rb >= thresholds.delta
        && f64::from(g) >= f64::from(max_rb) * thresholds.ratio
}

/// Build the color mask of an image: `true` where the pixel is key green.
///
/// Alpha is ignored. With the `parallel` feature the pixels are classified
/// with rayon; the result is identical to the sequential pass.
#[must_use]
pub fn build_green_mask(image: &RgbaImage, thresholds: &Thresholds) -> Mask {
    let raw = image.as_raw();

    #[cfg(feature = "parallel")]
    let bits: Vec<bool> = {
        use rayon::prelude::*;
        raw.par_chunks_exact(4)
            .map(|px| is_key_green(px[0], px[1], px[2], thresholds))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let bits: Vec<bool> = raw
        .chunks_exact(4)
        .map(|px| is_key_green(px[0], px[1], px[2], thresholds))
        .collect();

    Mask::from_vec(image.width(), image.height(), bits)
}
