//! Hex formatting and parsing of colors.

use crate::{ExtractError, Result};
use num_traits::AsPrimitive;
use palette::Srgb;

/// Formats a color as an uppercase `#RRGGBB` string.
///
/// # Examples
/// ```
/// # use color_extractor::rgb_to_hex;
/// # use palette::Srgb;
/// assert_eq!(rgb_to_hex(Srgb::new(255, 128, 0)), "#FF8000");
/// ```
#[must_use]
pub fn rgb_to_hex(color: Srgb<u8>) -> String {
    format!("#{color:X}")
}

/// Formats numeric components as an uppercase `#RRGGBB` string.
///
/// Components are rounded to the nearest integer and clamped to `[0, 255]`.
///
/// # Errors
/// Returns [`ExtractError::InvalidColor`] if a component is not finite
/// or lies outside `[-0.5, 255.5]`.
pub fn try_rgb_to_hex<T>(components: [T; 3]) -> Result<String>
where
    T: AsPrimitive<f64>,
{
    let values = components.map(AsPrimitive::as_);

    if values.iter().any(|&v| !(-0.5..=255.5).contains(&v)) {
        return Err(ExtractError::InvalidColor {
            value: format!("({}, {}, {})", values[0], values[1], values[2]),
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let [r, g, b] = values.map(|v| v.round().clamp(0.0, 255.0) as u8);
    Ok(rgb_to_hex(Srgb::new(r, g, b)))
}

/// Parses a `#RRGGBB` string (either case) into a color.
///
/// # Errors
/// Returns [`ExtractError::InvalidColor`] if the string is not `#` followed by six hex digits.
pub fn hex_to_rgb(hex: &str) -> Result<Srgb<u8>> {
    let invalid = || ExtractError::InvalidColor { value: hex.to_owned() };

    let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    hex.parse::<Srgb<u8>>().map_err(|_| invalid())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        for r in (0..=255u8).step_by(15) {
            for g in (0..=255u8).step_by(17) {
                for b in [0, 1, 127, 128, 254, 255] {
                    let color = Srgb::new(r, g, b);
                    let hex = rgb_to_hex(color);
                    assert_eq!(hex.len(), 7);
                    assert_eq!(hex_to_rgb(&hex).unwrap(), color);
                }
            }
        }
    }

    #[test]
    fn uppercase_and_padded() {
        assert_eq!(rgb_to_hex(Srgb::new(10, 171, 0)), "#0AAB00");
        assert_eq!(hex_to_rgb("#0aab00").unwrap(), Srgb::new(10, 171, 0));
    }

    #[test]
    fn numeric_components() {
        assert_eq!(try_rgb_to_hex([127.5f32, 0.4, 255.0]).unwrap(), "#8000FF");
        assert_eq!(try_rgb_to_hex([255u8, 0, 0]).unwrap(), "#FF0000");
        assert_eq!(try_rgb_to_hex([-0.4, 0.0, 255.4]).unwrap(), "#0000FF");
        assert_eq!(try_rgb_to_hex([1i32, 2, 3]).unwrap(), "#010203");

        assert_eq!(try_rgb_to_hex([255.5, -0.5, 0.0]).unwrap(), "#FF0000");

        for bad in [[256.0, 0.0, 0.0], [-1.0, 0.0, 0.0], [f64::NAN, 0.0, 0.0], [0.0, f64::INFINITY, 0.0]] {
            assert!(matches!(try_rgb_to_hex(bad), Err(ExtractError::InvalidColor { .. })));
        }
    }

    #[test]
    fn rejects_malformed_hex() {
        for bad in ["FF0000", "#FF000", "#FF00000", "#GG0000", "#FF 000", "", "#"] {
            assert!(matches!(hex_to_rgb(bad), Err(ExtractError::InvalidColor { .. })), "{bad}");
        }
    }
}
