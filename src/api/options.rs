//! Contains the builder structs for the per-method tuning parameters.

use crate::{ColorSpace, ExtractError, Result};
use serde::{Deserialize, Serialize};

/// A builder struct to specify the parameters for k-means clustering.
///
/// # Examples
/// ```
/// # use color_extractor::{ColorSpace, KmeansOptions};
/// let options = KmeansOptions::new()
///     .max_iterations(50)
///     .seed(42)
///     .colorspace(ColorSpace::Lab);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KmeansOptions {
    /// The maximum number of Lloyd iterations.
    pub(crate) max_iterations: u32,
    /// Iterations stop once no centroid moves further than this.
    pub(crate) tolerance: f32,
    /// The seed value for the random number generator.
    pub(crate) seed: u64,
    /// The color space the `kmeans` method clusters in.
    pub(crate) colorspace: ColorSpace,
}

impl Default for KmeansOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl KmeansOptions {
    /// Creates a new [`KmeansOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-3,
            seed: 0,
            colorspace: ColorSpace::Srgb,
        }
    }

    /// Sets the maximum number of iterations.
    ///
    /// The default is `100`.
    #[must_use]
    pub const fn max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance, measured as the largest distance
    /// any centroid moved during an iteration.
    ///
    /// The default is `1e-3`.
    #[must_use]
    pub const fn tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the seed value for the random number generator.
    ///
    /// The default seed is `0`.
    #[must_use]
    pub const fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the color space used by the `kmeans` method.
    ///
    /// The `lab` and `multistage` methods always cluster in [`ColorSpace::Lab`]
    /// and the `vibrant` method always clusters in [`ColorSpace::Srgb`].
    ///
    /// The default is [`ColorSpace::Srgb`].
    #[must_use]
    pub const fn colorspace(mut self, colorspace: ColorSpace) -> Self {
        self.colorspace = colorspace;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(ExtractError::configuration("max_iterations", self.max_iterations));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ExtractError::configuration("tolerance", self.tolerance));
        }
        Ok(())
    }
}

/// A builder struct to specify the parameters for the `aggressive` binning method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggressiveOptions {
    /// The number of high bits kept per channel.
    pub(crate) bits: u8,
}

impl Default for AggressiveOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl AggressiveOptions {
    /// Creates a new [`AggressiveOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 3 }
    }

    /// Sets the number of high bits kept per channel, in `1..=8`.
    ///
    /// Fewer bits means coarser bins (`2^(3 * bits)` bins in total).
    /// The default is `3`, that is, 512 bins.
    #[must_use]
    pub const fn bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }
}

/// A builder struct to specify the parameters for the `vibrant` method.
///
/// # Examples
/// ```
/// # use color_extractor::VibrantOptions;
/// let options = VibrantOptions::new()
///     .min_saturation(0.5)
///     .saturation_weight(4.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VibrantOptions {
    /// Colors with a lower HSV saturation are ignored.
    pub(crate) min_saturation: f32,
    /// Colors with a lower HSV value are ignored.
    pub(crate) min_value: f32,
    /// How much saturation boosts a color's weight.
    pub(crate) saturation_weight: f32,
}

impl Default for VibrantOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl VibrantOptions {
    /// Creates a new [`VibrantOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            min_saturation: 0.35,
            min_value: 0.20,
            saturation_weight: 2.0,
        }
    }

    /// Sets the minimum HSV saturation in `[0, 1]`.
    ///
    /// The default is `0.35`.
    #[must_use]
    pub const fn min_saturation(mut self, min_saturation: f32) -> Self {
        self.min_saturation = min_saturation;
        self
    }

    /// Sets the minimum HSV value (brightness) in `[0, 1]`.
    ///
    /// The default is `0.2`.
    #[must_use]
    pub const fn min_value(mut self, min_value: f32) -> Self {
        self.min_value = min_value;
        self
    }

    /// Sets the saturation weight. A color with saturation `s` and count `c`
    /// is weighted as `c * (1 + saturation_weight * s)`.
    ///
    /// The default is `2.0`.
    #[must_use]
    pub const fn saturation_weight(mut self, saturation_weight: f32) -> Self {
        self.saturation_weight = saturation_weight;
        self
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.min_saturation) {
            return Err(ExtractError::configuration("min_saturation", self.min_saturation));
        }
        if !(0.0..=1.0).contains(&self.min_value) {
            return Err(ExtractError::configuration("min_value", self.min_value));
        }
        if !(self.saturation_weight.is_finite() && self.saturation_weight >= 0.0) {
            return Err(ExtractError::configuration(
                "saturation_weight",
                self.saturation_weight,
            ));
        }
        Ok(())
    }
}

/// A builder struct to specify the parameters for the `multistage` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultistageOptions {
    /// The number of high bits kept per channel in the binning stage.
    pub(crate) bits: u8,
}

impl Default for MultistageOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MultistageOptions {
    /// Creates a new [`MultistageOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self { bits: 5 }
    }

    /// Sets the number of high bits kept per channel in the binning stage, in `1..=8`.
    ///
    /// The default is `5`.
    #[must_use]
    pub const fn bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }
}

fn validate_bits(parameter: &'static str, bits: u8) -> Result<()> {
    if (1..=8).contains(&bits) {
        Ok(())
    } else {
        Err(ExtractError::configuration(parameter, bits))
    }
}

/// The tuning parameters of every extraction method.
///
/// Only the options of the configured [`Method`](crate::Method) are used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodOptions {
    /// Options for the `kmeans`, `vibrant`, `lab` and `multistage` clustering.
    pub kmeans: KmeansOptions,
    /// Options for the `aggressive` method.
    pub aggressive: AggressiveOptions,
    /// Options for the `vibrant` method.
    pub vibrant: VibrantOptions,
    /// Options for the `multistage` method.
    pub multistage: MultistageOptions,
}

impl Default for MethodOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl MethodOptions {
    /// Creates a new [`MethodOptions`] with the default options of every method.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            kmeans: KmeansOptions::new(),
            aggressive: AggressiveOptions::new(),
            vibrant: VibrantOptions::new(),
            multistage: MultistageOptions::new(),
        }
    }

    /// Checks every option against its allowed range.
    ///
    /// # Errors
    /// Returns [`ExtractError::Configuration`] naming the first invalid parameter.
    pub fn validate(&self) -> Result<()> {
        self.kmeans.validate()?;
        validate_bits("aggressive.bits", self.aggressive.bits)?;
        self.vibrant.validate()?;
        validate_bits("multistage.bits", self.multistage.bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MethodOptions::default().validate().is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        let mut options = MethodOptions::default();
        options.aggressive = options.aggressive.bits(0);
        assert!(options.validate().is_err_and(|e| e.is_configuration()));

        let mut options = MethodOptions::default();
        options.multistage = options.multistage.bits(9);
        assert!(options.validate().is_err());

        let mut options = MethodOptions::default();
        options.vibrant = options.vibrant.min_saturation(1.5);
        assert!(options.validate().is_err());

        let mut options = MethodOptions::default();
        options.kmeans = options.kmeans.tolerance(f32::NAN);
        assert!(options.validate().is_err());

        let mut options = MethodOptions::default();
        options.kmeans = options.kmeans.max_iterations(0);
        assert!(options.validate().is_err());
    }
}
