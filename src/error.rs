//! The error type shared by every fallible operation in the crate.

use crate::{AboveMaxLen, SortKey};
use thiserror::Error;

/// Result type alias for color extraction operations.
pub type Result<T> = std::result::Result<T, ExtractError>;

/// The ways a color extraction call can fail.
///
/// Errors are raised at the point of detection and never retried internally,
/// since extraction is deterministic.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// An unknown method or sort key name, or an out of range parameter.
    #[error("invalid configuration: {parameter} = {value}")]
    Configuration {
        /// The name of the offending parameter.
        parameter: &'static str,
        /// The rejected value, formatted for display.
        value: String,
    },

    /// The pixel data does not have a supported shape.
    #[error("invalid pixel shape: {reason}")]
    InvalidShape {
        /// What was wrong with the shape.
        reason: String,
    },

    /// A declared value range is empty, inverted, or not finite.
    #[error("invalid value range: ({min}, {max})")]
    InvalidRange {
        /// The lower bound of the range.
        min: f64,
        /// The upper bound of the range.
        max: f64,
    },

    /// A sort key that needs statistics was requested without statistics.
    #[error("sorting by {sort_by} requires statistics, but return_stats is false")]
    MissingStats {
        /// The sort key that was requested.
        sort_by: SortKey,
    },

    /// A color value that cannot be formatted or parsed.
    #[error("invalid color: {value}")]
    InvalidColor {
        /// The rejected color, formatted for display.
        value: String,
    },

    /// The image collaborator failed to decode or resample an image.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// A configuration file could not be parsed.
    #[error("configuration parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Create a configuration error for the given parameter and value.
    pub fn configuration(parameter: &'static str, value: impl ToString) -> Self {
        Self::Configuration {
            parameter,
            value: value.to_string(),
        }
    }

    /// Create a shape error with the given reason.
    pub fn invalid_shape(reason: impl Into<String>) -> Self {
        Self::InvalidShape { reason: reason.into() }
    }

    /// Whether this error was caused by the caller's configuration
    /// rather than by the pixel data.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::MissingStats { .. } | Self::Json(_)
        )
    }
}

impl From<AboveMaxLen<u16>> for ExtractError {
    fn from(value: AboveMaxLen<u16>) -> Self {
        Self::configuration("n_colors", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = ExtractError::configuration("method", "unknown");
        assert_eq!(err.to_string(), "invalid configuration: method = unknown");
        assert!(err.is_configuration());

        let err = ExtractError::MissingStats { sort_by: SortKey::SpatialX };
        assert_eq!(
            err.to_string(),
            "sorting by spatial-x requires statistics, but return_stats is false"
        );

        let err = ExtractError::InvalidRange { min: 1.0, max: 0.0 };
        assert!(!err.is_configuration());
    }

    #[test]
    fn above_max_len_is_configuration() {
        let err = ExtractError::from(AboveMaxLen(256u16));
        assert!(matches!(
            err,
            ExtractError::Configuration { parameter: "n_colors", .. }
        ));
    }
}
