//! Remove green-screen backgrounds from sprite sheets.
//!
//! Pixels are keyed by how strongly green dominates red and blue. In
//! [`KeyMode::Background`] only keyed pixels connected to the image border
//! are removed, so green details inside the subject survive; in
//! [`KeyMode::AllGreen`] every keyed pixel goes. Removed pixels get alpha 0
//! and the green halo left on the subject's edge is clamped away.
//!
//! # Quick Start
//!
//! ```no_run
//! use sprite_chroma_key::{ChromaKey, KeyConfig, KeyMode};
//!
//! let key = ChromaKey::new(KeyConfig::for_mode(KeyMode::Background)).expect("valid config");
//! let mut img = image::open("sheet.png").unwrap().to_rgba8();
//! let stats = key.apply(&mut img);
//! img.save("sheet_clean.png").unwrap();
//! println!("removed {} / {} pixels", stats.removed, stats.total);
//! ```
//!
//! # Stages
//!
//! The pipeline is also available piece by piece:
//!
//! ```
//! use image::{Rgba, RgbaImage};
//! use sprite_chroma_key::{compositing, connectivity, despill, mask, KeyMode};
//!
//! let mut img = RgbaImage::from_pixel(5, 5, Rgba([30, 200, 30, 255]));
//! img.put_pixel(2, 2, Rgba([180, 60, 60, 255]));
//!
//! let color = mask::build_green_mask(&img, &KeyMode::Background.default_thresholds());
//! let background = connectivity::border_connected(&color);
//! compositing::apply_background_alpha(&mut img, &background);
//! despill::despill_edges(&mut img, &background);
//!
//! assert_eq!(background.count(), 24);
//! assert_eq!(img.get_pixel(2, 2)[3], 255);
//! ```

#![deny(missing_docs)]

pub mod compositing;
pub mod config;
pub mod connectivity;
pub mod despill;
mod engine;
pub mod error;
pub mod mask;

pub use config::{KeyConfig, KeyMode, Thresholds};
pub use engine::{
    default_output_path, is_supported_image, load_rgba, save_rgba, ChromaKey, Coverage,
    KeyStats, ProcessResult,
};
pub use error::{Error, Result};
pub use mask::Mask;
