//! Chroma-key pipeline and file processing.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use image::{ImageFormat, RgbaImage};

use crate::compositing;
use crate::config::{KeyConfig, KeyMode};
use crate::connectivity;
use crate::despill;
use crate::error::{Error, Result};
use crate::mask::{self, Mask};

/// Share of the image that was keyed out, for spotting bad thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Nothing was removed; thresholds are probably too strict.
    None,
    /// Some but not all pixels were removed.
    Partial,
    /// Every pixel was removed; thresholds are probably too loose.
    Full,
}

/// Pixel counts from one keying run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyStats {
    /// Pixels marked background (now fully transparent).
    pub removed: u64,
    /// Total pixels in the image.
    pub total: u64,
    /// Edge pixels whose green channel was clamped by despill.
    pub despilled: u64,
}

impl KeyStats {
    /// Removed share in `[0, 1]`; `0.0` for an empty image.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.removed as f64 / self.total as f64
        }
    }

    /// Classify the removed share. An empty image counts as [`Coverage::None`].
    #[must_use]
    pub fn coverage(&self) -> Coverage {
        if self.removed == 0 {
            Coverage::None
        } else if self.removed == self.total {
            Coverage::Full
        } else {
            Coverage::Partial
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the input file.
    pub path: PathBuf,
    /// Path the keyed image was written to.
    pub output: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Removal statistics, present on success.
    pub stats: Option<KeyStats>,
    /// Human-readable status message.
    pub message: String,
}

/// A validated chroma-key pipeline.
///
/// Create once with [`ChromaKey::new()`] and reuse for any number of images.
#[derive(Debug, Clone)]
pub struct ChromaKey {
    config: KeyConfig,
}

impl ChromaKey {
    /// Validate `config` and build the pipeline.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] if a threshold is out of range.
    pub fn new(config: KeyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this pipeline runs with.
    #[must_use]
    pub fn config(&self) -> &KeyConfig {
        &self.config
    }

    /// Compute the background mask without touching the image.
    ///
    /// In [`KeyMode::AllGreen`] this is the color mask itself; in
    /// [`KeyMode::Background`] it is the border-connected part of it.
    #[must_use]
    pub fn background_mask(&self, image: &RgbaImage) -> Mask {
        let color = mask::build_green_mask(image, &self.config.thresholds);
        tracing::debug!(keyed = color.count(), mode = ?self.config.mode, "color mask built");
        match self.config.mode {
            KeyMode::AllGreen => color,
            KeyMode::Background => connectivity::border_connected(&color),
        }
    }

    /// Key out the background of `image` in place.
    ///
    /// Background pixels get alpha 0, then edge spill is clamped unless
    /// despill is disabled.
    pub fn apply(&self, image: &mut RgbaImage) -> KeyStats {
        let background = self.background_mask(image);
        let removed = compositing::apply_background_alpha(image, &background);
        let despilled = if self.config.despill {
            despill::despill_edges(image, &background)
        } else {
            0
        };

        let stats = KeyStats {
            removed: removed as u64,
            total: u64::from(image.width()) * u64::from(image.height()),
            despilled: despilled as u64,
        };
        tracing::debug!(
            removed = stats.removed,
            total = stats.total,
            despilled = stats.despilled,
            "background keyed out"
        );
        match stats.coverage() {
            Coverage::None => {
                tracing::warn!("no pixels matched the key thresholds");
            }
            Coverage::Full => {
                tracing::warn!("every pixel matched the key thresholds");
            }
            Coverage::Partial => {}
        }
        stats
    }

    /// Load `input`, key it, and write the result to `output`.
    ///
    /// Missing parent directories of `output` are created. Nothing is
    /// written if the output format cannot hold alpha or the input cannot be
    /// decoded.
    ///
    /// # Errors
    ///
    /// Returns an error if the output format is unsupported, or if decoding,
    /// directory creation or encoding fails.
    pub fn key_file(&self, input: &Path, output: &Path) -> Result<KeyStats> {
        let format = output_format(output)?;
        let mut rgba = load_rgba(input)?;
        let stats = self.apply(&mut rgba);

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        rgba.save_with_format(output, format)?;
        Ok(stats)
    }

    /// Process a single image file, capturing the outcome in a
    /// [`ProcessResult`] instead of returning an error.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            output: output.to_path_buf(),
            success: false,
            stats: None,
            message: String::new(),
        };

        match self.key_file(input, output) {
            Ok(stats) => {
                result.success = true;
                result.message = match stats.coverage() {
                    Coverage::None => "No background matched the thresholds".to_string(),
                    Coverage::Full => "Every pixel matched the thresholds".to_string(),
                    Coverage::Partial => "Background removed".to_string(),
                };
                result.stats = Some(stats);
            }
            Err(e) => {
                tracing::debug!(path = %input.display(), error = %e, "processing failed");
                result.message = format!("Failed: {e}");
            }
        }

        result
    }

    /// Process all supported images in a directory.
    ///
    /// Each image is written to `output_dir` under its default output name
    /// (see [`default_output_path`]). Inputs sharing a stem (`hero.png`,
    /// `hero.bmp`) keep their extension in the name instead
    /// (`hero_png_clean.png`, `hero_bmp_clean.png`); an input whose name is
    /// still taken fails without writing. Uses parallel iteration when the
    /// `parallel` feature is enabled (via rayon).
    #[must_use]
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Vec<ProcessResult> {
        let mut entries: Vec<PathBuf> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .map(|e| e.path())
                .filter(|p| is_supported_image(p))
                .collect(),
            Err(e) => {
                return vec![self.failure(input_dir, format!("Failed to read directory: {e}"))];
            }
        };
        entries.sort();

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![self.failure(
                    output_dir,
                    format!("Failed to create output directory: {e}"),
                )];
            }
        }

        let jobs = assign_output_names(&entries);
        let job = |(input_path, name): &(PathBuf, Option<String>)| match name {
            Some(name) => self.process_file(input_path, &output_dir.join(name)),
            None => self.failure(
                input_path,
                format!(
                    "Output name {} is already used by another input",
                    default_output_name(input_path)
                ),
            ),
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            jobs.par_iter().map(job).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            jobs.iter().map(job).collect()
        }
    }

    #[allow(clippy::unused_self)]
    fn failure(&self, path: &Path, message: String) -> ProcessResult {
        ProcessResult {
            path: path.to_path_buf(),
            output: PathBuf::new(),
            success: false,
            stats: None,
            message,
        }
    }
}

/// Decode an image file as RGBA8.
///
/// Images without an alpha channel come back fully opaque.
///
/// # Errors
///
/// Returns [`Error::Image`] if the file is missing or cannot be decoded.
pub fn load_rgba(path: &Path) -> Result<RgbaImage> {
    Ok(image::open(path)?.to_rgba8())
}

/// Save an RGBA image in a lossless format that keeps the alpha channel.
///
/// The format is chosen from the extension: PNG, WebP, BMP or TIFF.
///
/// # Errors
///
/// Returns [`Error::UnsupportedFormat`] for unknown extensions and for
/// formats without alpha support (JPEG), or an I/O/encoding error.
pub fn save_rgba(img: &RgbaImage, path: &Path) -> Result<()> {
    let format = output_format(path)?;
    img.save_with_format(path, format)?;
    Ok(())
}

/// Pick the output format from the extension, rejecting formats without alpha.
fn output_format(path: &Path) -> Result<ImageFormat> {
    let format =
        ImageFormat::from_path(path).map_err(|e| Error::UnsupportedFormat(e.to_string()))?;

    match format {
        ImageFormat::Png | ImageFormat::WebP | ImageFormat::Bmp | ImageFormat::Tiff => Ok(format),
        _ => Err(Error::UnsupportedFormat(format!(
            "{format:?} cannot store transparency"
        ))),
    }
}

/// Check if a file has a supported input image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp" | "tif" | "tiff"
        ),
        None => false,
    }
}

/// Generate a default output path from an input path.
///
/// The output is always PNG so transparency survives.
/// Example: `"sprites/hero.jpg"` becomes `"sprites/hero_clean.png"`.
#[must_use]
pub fn default_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(default_output_name(input))
}

fn default_output_name(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    format!("{stem}_clean.png")
}

fn extension_output_name(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let ext = input.extension().unwrap_or_default().to_string_lossy();
    format!("{stem}_{ext}_clean.png")
}

/// Give every input a distinct output file name, in input order.
///
/// `None` marks an input whose name is still taken after disambiguation.
fn assign_output_names(inputs: &[PathBuf]) -> Vec<(PathBuf, Option<String>)> {
    let mut shared: HashMap<String, usize> = HashMap::new();
    for input in inputs {
        *shared.entry(default_output_name(input)).or_default() += 1;
    }

    let mut claimed = HashSet::new();
    inputs
        .iter()
        .map(|input| {
            let plain = default_output_name(input);
            let name = if shared[&plain] > 1 {
                extension_output_name(input)
            } else {
                plain
            };
            let name = claimed.insert(name.clone()).then_some(name);
            (input.clone(), name)
        })
        .collect()
}
