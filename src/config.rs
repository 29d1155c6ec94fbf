//! Keying configuration: mode selection, color thresholds and despill toggle.

use crate::error::{Error, Result};

/// How the color mask becomes the background mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyMode {
    /// Every pixel passing the color test is background, wherever it sits.
    ///
    /// Interior green (eyes, clothing) is removed as well.
    #[default]
    AllGreen,
    /// Only green pixels connected to the image border are background.
    Background,
}

impl KeyMode {
    /// Default thresholds for this mode.
    #[must_use]
    pub fn default_thresholds(self) -> Thresholds {
        match self {
            Self::AllGreen => Thresholds {
                g_min: 1,
                delta: 0,
                ratio: 1.0,
            },
            Self::Background => Thresholds {
                g_min: 120,
                delta: 40,
                ratio: 1.25,
            },
        }
    }
}

/// Chroma-key color thresholds.
///
/// A pixel is green when all three hold:
/// `G >= g_min`, `G - max(R, B) >= delta` and `G >= max(R, B) * ratio`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Minimum green channel level, `0..=255`.
    pub g_min: i32,
    /// Minimum `G - max(R, B)`; any value, though outside `-255..=255` the
    /// test is constant.
    pub delta: i32,
    /// Minimum `G / max(R, B)`; finite and positive.
    pub ratio: f64,
}

impl Thresholds {
    /// Check every threshold against its accepted range.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] naming the first offending value.
    pub fn validate(&self) -> Result<()> {
        if !(0..=255).contains(&self.g_min) {
            return Err(Error::InvalidThreshold {
                name: "g_min",
                reason: format!("must be within 0..=255, got {}", self.g_min),
            });
        }
        if !self.ratio.is_finite() || self.ratio <= 0.0 {
            return Err(Error::InvalidThreshold {
                name: "ratio",
                reason: format!("must be finite and positive, got {}", self.ratio),
            });
        }
        Ok(())
    }
}

/// Full configuration for one keying run.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyConfig {
    /// Mask mode.
    pub mode: KeyMode,
    /// Color thresholds.
    pub thresholds: Thresholds,
    /// Clamp green spill on foreground pixels bordering the background.
    pub despill: bool,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self::for_mode(KeyMode::default())
    }
}

impl KeyConfig {
    /// Configuration with the mode's default thresholds and despill enabled.
    #[must_use]
    pub fn for_mode(mode: KeyMode) -> Self {
        Self {
            mode,
            thresholds: mode.default_thresholds(),
            despill: true,
        }
    }

    /// Replace the thresholds that were explicitly given, keeping the mode
    /// defaults for the rest.
    #[must_use]
    pub fn with_overrides(
        mut self,
        g_min: Option<i32>,
        delta: Option<i32>,
        ratio: Option<f64>,
    ) -> Self {
        if let Some(g_min) = g_min {
            self.thresholds.g_min = g_min;
        }
        if let Some(delta) = delta {
            self.thresholds.delta = delta;
        }
        if let Some(ratio) = ratio {
            self.thresholds.ratio = ratio;
        }
        self
    }

    /// Enable or disable despill.
    #[must_use]
    pub fn with_despill(mut self, despill: bool) -> Self {
        self.despill = despill;
        self
    }

    /// Validate the thresholds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidThreshold`] if any threshold is out of range.
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_defaults_match_documented_values() {
        let all = KeyMode::AllGreen.default_thresholds();
        assert_eq!(all.g_min, 1);
        assert_eq!(all.delta, 0);
        assert!((all.ratio - 1.0).abs() < f64::EPSILON);

        let bg = KeyMode::Background.default_thresholds();
        assert_eq!(bg.g_min, 120);
        assert_eq!(bg.delta, 40);
        assert!((bg.ratio - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn default_config_is_all_green_with_despill() {
        let config = KeyConfig::default();
        assert_eq!(config.mode, KeyMode::AllGreen);
        assert!(config.despill);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_replace_only_given_values() {
        let config = KeyConfig::for_mode(KeyMode::Background).with_overrides(Some(90), None, None);
        assert_eq!(config.thresholds.g_min, 90);
        assert_eq!(config.thresholds.delta, 40);
        assert!((config.thresholds.ratio - 1.25).abs() < f64::EPSILON);
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let base = KeyConfig::default();

        let err = base.clone().with_overrides(Some(-1), None, None).validate();
        assert!(matches!(
            err,
            Err(Error::InvalidThreshold { name: "g_min", .. })
        ));

        let err = base.clone().with_overrides(Some(256), None, None).validate();
        assert!(matches!(
            err,
            Err(Error::InvalidThreshold { name: "g_min", .. })
        ));

        for ratio in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = base.clone().with_overrides(None, None, Some(ratio)).validate();
            assert!(matches!(
                err,
                Err(Error::InvalidThreshold { name: "ratio", .. })
            ));
        }
    }

    #[test]
    fn validate_accepts_boundary_values() {
        let config = KeyConfig::default().with_overrides(Some(0), Some(-255), Some(0.01));
        assert!(config.validate().is_ok());
        let config = KeyConfig::default().with_overrides(Some(255), Some(255), Some(255.0));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn any_delta_is_accepted() {
        for delta in [i32::MIN, -300, 300, i32::MAX] {
            let config =
                KeyConfig::for_mode(KeyMode::Background).with_overrides(None, Some(delta), None);
            assert!(config.validate().is_ok(), "delta={delta}");
        }
    }
}
