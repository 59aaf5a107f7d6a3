//! The extraction configuration and method selection.

use crate::{
    extractor::EXTRACTORS, ExtractError, Extractor, MethodOptions, PaletteSize, ResizeFilter,
    Result, SortKey, MAX_COLORS,
};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, path::Path, str::FromStr};

/// The set of supported palette extraction methods.
///
/// See the corresponding [`Extractor`] implementors in the crate root for details on each method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Weighted k-means over the distinct colors (sRGB by default).
    #[default]
    Kmeans,
    /// Coarse uniform quantization, returning the most populated bins.
    Aggressive,
    /// k-means over saturated colors, weighted by saturation.
    Vibrant,
    /// k-means in CIELAB.
    Lab,
    /// Fine uniform quantization followed by k-means in CIELAB.
    Multistage,
}

impl Method {
    /// Every method, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::Kmeans,
        Self::Aggressive,
        Self::Vibrant,
        Self::Lab,
        Self::Multistage,
    ];

    /// The lowercase name of the method.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Method::Kmeans => "kmeans",
            Method::Aggressive => "aggressive",
            Method::Vibrant => "vibrant",
            Method::Lab => "lab",
            Method::Multistage => "multistage",
        }
    }

    /// The extractor implementing this method.
    #[must_use]
    pub fn extractor(self) -> &'static dyn Extractor {
        EXTRACTORS[self as usize]
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Method {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        Method::ALL
            .into_iter()
            .find(|method| method.name() == s)
            .ok_or_else(|| ExtractError::configuration("method", s))
    }
}

/// A builder struct holding every parameter of an extraction call.
///
/// # Examples
/// ```
/// # use color_extractor::{ExtractionConfig, Method, SortKey};
/// let config = ExtractionConfig::new()
///     .method(Method::Lab)
///     .n_colors(6)
///     .sort_by(SortKey::SpatialX)
///     .return_stats(true)
///     .max_dimension(Some(256));
/// assert!(config.validate().is_ok());
/// ```
///
/// Configurations can also be loaded from JSON, where missing fields take their default value:
/// ```
/// # use color_extractor::{ExtractionConfig, Method};
/// # fn main() -> color_extractor::Result<()> {
/// let config = ExtractionConfig::from_json_str(r#"{ "method": "vibrant", "n_colors": 8 }"#)?;
/// assert_eq!(config.method, Method::Vibrant);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// The extraction method.
    pub method: Method,
    /// The number of colors to extract, in `1..=256`.
    pub n_colors: u16,
    /// The order of the returned colors.
    pub sort_by: SortKey,
    /// Whether to compute per-color statistics.
    pub return_stats: bool,
    /// If set, images whose larger side exceeds this are downscaled first.
    pub max_dimension: Option<u32>,
    /// The resampling filter used for downscaling.
    pub resize_filter: ResizeFilter,
    /// Per-method tuning parameters.
    pub options: MethodOptions,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionConfig {
    /// Creates a new [`ExtractionConfig`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            method: Method::Kmeans,
            n_colors: 5,
            sort_by: SortKey::None,
            return_stats: false,
            max_dimension: None,
            resize_filter: ResizeFilter::Lanczos3,
            options: MethodOptions::new(),
        }
    }

    /// Builds a configuration from user supplied names, as a command line or binding would.
    ///
    /// # Errors
    /// Returns [`ExtractError::Configuration`] for an unknown method or sort key,
    /// or if `n_colors` is not in `1..=256`.
    pub fn from_names(method: &str, n_colors: i64, sort_by: &str, return_stats: bool) -> Result<Self> {
        let n_colors = u16::try_from(n_colors)
            .ok()
            .filter(|n| (1..=MAX_COLORS).contains(n))
            .ok_or_else(|| ExtractError::configuration("n_colors", n_colors))?;

        Ok(Self::new()
            .method(method.parse()?)
            .n_colors(n_colors)
            .sort_by(sort_by.parse()?)
            .return_stats(return_stats))
    }

    /// Parses a configuration from JSON. Missing fields take their default value.
    ///
    /// # Errors
    /// Returns [`ExtractError::Configuration`] for an unknown method or sort key name
    /// and [`ExtractError::Json`] if the JSON is otherwise malformed.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value = serde_json::from_str::<serde_json::Value>(json)?;
        if let Some(method) = value.get("method").and_then(serde_json::Value::as_str) {
            method.parse::<Method>()?;
        }
        if let Some(sort_by) = value.get("sort_by").and_then(serde_json::Value::as_str) {
            sort_by.parse::<SortKey>()?;
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    /// Returns [`ExtractError::Io`] if the file cannot be read
    /// and [`ExtractError::Json`] if it cannot be parsed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Saves the configuration to a JSON file.
    ///
    /// # Errors
    /// Returns [`ExtractError::Io`] if the file cannot be written.
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Sets the extraction method.
    ///
    /// The default method is [`Method::Kmeans`].
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the number of colors to extract.
    ///
    /// The default is `5`.
    #[must_use]
    pub const fn n_colors(mut self, n_colors: u16) -> Self {
        self.n_colors = n_colors;
        self
    }

    /// Sets the order of the returned colors.
    ///
    /// Every key except [`SortKey::None`] (the default) requires [`ExtractionConfig::return_stats`].
    #[must_use]
    pub const fn sort_by(mut self, sort_by: SortKey) -> Self {
        self.sort_by = sort_by;
        self
    }

    /// Sets whether per-color statistics are computed.
    ///
    /// The default is `false`.
    #[must_use]
    pub const fn return_stats(mut self, return_stats: bool) -> Self {
        self.return_stats = return_stats;
        self
    }

    /// Sets the downscaling bound. Images whose larger side exceeds it are resampled
    /// so that the larger side equals it.
    ///
    /// The default is `None`, that is, no downscaling.
    #[must_use]
    pub const fn max_dimension(mut self, max_dimension: Option<u32>) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    /// Sets the resampling filter for downscaling.
    ///
    /// The default is [`ResizeFilter::Lanczos3`].
    #[must_use]
    pub const fn resize_filter(mut self, resize_filter: ResizeFilter) -> Self {
        self.resize_filter = resize_filter;
        self
    }

    /// Sets the per-method tuning parameters.
    #[must_use]
    pub const fn options(mut self, options: MethodOptions) -> Self {
        self.options = options;
        self
    }

    /// Checks every parameter and returns the validated palette size.
    ///
    /// # Errors
    /// Returns [`ExtractError::Configuration`] naming the first invalid parameter.
    pub fn validate(&self) -> Result<PaletteSize> {
        if self.n_colors == 0 {
            return Err(ExtractError::configuration("n_colors", self.n_colors));
        }
        let size = PaletteSize::try_from(self.n_colors)?;

        if self.max_dimension == Some(0) {
            return Err(ExtractError::configuration("max_dimension", 0));
        }

        self.options.validate()?;
        Ok(size)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{ColorSpace, KmeansOptions};

    #[test]
    fn method_names() {
        for method in Method::ALL {
            assert_eq!(method.to_string().parse::<Method>().unwrap(), method);
        }

        let err = "unknown".parse::<Method>().unwrap_err();
        assert!(matches!(err, ExtractError::Configuration { parameter: "method", .. }));
    }

    #[test]
    fn from_names() {
        let config = ExtractionConfig::from_names("lab", 6, "spatial-x", true).unwrap();
        assert_eq!(config.method, Method::Lab);
        assert_eq!(config.n_colors, 6);
        assert_eq!(config.sort_by, SortKey::SpatialX);
        assert!(config.return_stats);

        for (method, n, sort) in [
            ("unknown", 5, "none"),
            ("kmeans", 0, "none"),
            ("kmeans", -3, "none"),
            ("kmeans", 257, "none"),
            ("kmeans", 5, "brightness"),
        ] {
            let err = ExtractionConfig::from_names(method, n, sort, false).unwrap_err();
            assert!(err.is_configuration(), "{method} {n} {sort}");
        }
    }

    #[test]
    fn validate() {
        assert_eq!(ExtractionConfig::new().validate().unwrap(), PaletteSize::from(5));
        assert!(ExtractionConfig::new().n_colors(0).validate().is_err());
        assert!(ExtractionConfig::new().n_colors(257).validate().is_err());
        assert_eq!(
            ExtractionConfig::new().n_colors(256).validate().unwrap(),
            PaletteSize::MAX
        );
        assert!(ExtractionConfig::new().max_dimension(Some(0)).validate().is_err());
    }

    #[test]
    fn json_defaults() {
        let config = ExtractionConfig::from_json_str(
            r#"{ "method": "multistage", "sort_by": "frequency", "return_stats": true,
                 "options": { "kmeans": { "colorspace": "lab", "seed": 3 } } }"#,
        )
        .unwrap();

        assert_eq!(config.method, Method::Multistage);
        assert_eq!(config.n_colors, 5);
        assert_eq!(config.sort_by, SortKey::Frequency);
        assert_eq!(config.resize_filter, ResizeFilter::Lanczos3);
        assert_eq!(
            config.options.kmeans,
            KmeansOptions::new().colorspace(ColorSpace::Lab).seed(3)
        );

        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(ExtractionConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn json_file_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("color-extractor-config-{}.json", std::process::id()));
        let config = ExtractionConfig::new()
            .method(Method::Vibrant)
            .n_colors(8)
            .sort_by(SortKey::SpatialY)
            .return_stats(true)
            .max_dimension(Some(320))
            .resize_filter(ResizeFilter::Triangle);

        config.to_json_file(&path).unwrap();
        let loaded = ExtractionConfig::from_json_file(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), config);

        assert!(matches!(
            ExtractionConfig::from_json_file(&path),
            Err(ExtractError::Io(_))
        ));
    }

    #[test]
    fn json_errors() {
        let err = ExtractionConfig::from_json_str(r#"{ "method": "median" }"#).unwrap_err();
        assert!(matches!(err, ExtractError::Configuration { parameter: "method", .. }), "{err}");

        let err = ExtractionConfig::from_json_str(r#"{ "sort_by": "hue" }"#).unwrap_err();
        assert!(matches!(err, ExtractError::Configuration { parameter: "sort_by", .. }), "{err}");

        let err = ExtractionConfig::from_json_str(r#"{ "method": 3 }"#).unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
        assert!(matches!(
            ExtractionConfig::from_json_str("{ \"n_colors\": "),
            Err(ExtractError::Json(_))
        ));

        let config =
            ExtractionConfig::from_json_str(r#"{ "options": { "aggressive": { "bits": 9 } } }"#)
                .unwrap();
        assert!(config.validate().is_err_and(|e| e.is_configuration()));
    }
}
