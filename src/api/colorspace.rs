//! sRGB <-> CIELAB conversion.
//!
//! Conversions go sRGB (gamma encoded) -> linear sRGB -> XYZ -> L\*a\*b\* with the D65 white point,
//! using `palette`'s standard matrices, so results are reproducible for a given float precision.
//! Out of gamut LAB colors are clamped into sRGB on the way back.

use crate::ColorComponents;
use palette::{cast, FromColor, Hsv, IntoColor, Lab, LinSrgb, Srgb};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// The color space in which distances between colors are measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    /// Euclidean distance on gamma encoded sRGB components in `[0, 1]`.
    #[default]
    Srgb,
    /// Euclidean distance in CIELAB (the CIE76 color difference).
    Lab,
}

impl ColorSpace {
    /// The lowercase name of the color space.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ColorSpace::Srgb => "srgb",
            ColorSpace::Lab => "lab",
        }
    }

    /// Converts a color into a point of this color space.
    #[must_use]
    pub fn point(self, color: Srgb<u8>) -> [f32; 3] {
        match self {
            ColorSpace::Srgb => cast::into_array(srgb_to_f32(color)),
            ColorSpace::Lab => cast::into_array(from_srgb::<_, Lab>(color)),
        }
    }
}

impl Display for ColorSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorSpace {
    type Err = crate::ExtractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "srgb" => Ok(ColorSpace::Srgb),
            "lab" => Ok(ColorSpace::Lab),
            _ => Err(crate::ExtractError::configuration("colorspace", s)),
        }
    }
}

/// Converts an 8-bit sRGB color into `[0, 1]` floating point components.
pub(crate) fn srgb_to_f32(color: Srgb<u8>) -> Srgb<f32> {
    color.into_format()
}

/// Converts `[0, 1]` floating point sRGB back to 8 bits, clamping out of range components.
pub(crate) fn srgb_from_f32(color: Srgb<f32>) -> Srgb<u8> {
    let clamped: [f32; 3] = cast::into_array(color).map(|c| c.clamp(0.0, 1.0));
    Srgb::<f32>::from(clamped).into_format()
}

/// Converts an 8-bit sRGB color into HSV with components in `[0, 1]` (hue in degrees).
pub(crate) fn srgb_to_hsv(color: Srgb<u8>) -> Hsv {
    Hsv::from_color(srgb_to_f32(color))
}

/// Converts an 8-bit sRGB color into a linear-light based color space like [`Lab`].
pub(crate) fn from_srgb<From, To>(color: From) -> To
where
    From: ColorComponents<u8, 3>,
    LinSrgb: IntoColor<To>,
{
    let linear: LinSrgb = Srgb::<u8>::from(cast::into_array(color)).into_linear();
    linear.into_color()
}

/// Converts a floating point sRGB color into a linear-light based color space like [`Lab`].
pub(crate) fn from_srgb_f32<To>(color: Srgb<f32>) -> To
where
    LinSrgb: IntoColor<To>,
{
    let linear: LinSrgb = color.into_linear();
    linear.into_color()
}

/// Converts a linear-light based color back into 8-bit sRGB.
pub(crate) fn to_srgb<From, To>(color: From) -> To
where
    To: ColorComponents<u8, 3>,
    From: IntoColor<LinSrgb>,
{
    let srgb: Srgb<u8> = color.into_color().into_encoding();
    cast::from_array(srgb.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Srgb<u8>, b: Srgb<u8>) {
        let (a, b) = (cast::into_array(a), cast::into_array(b));
        for (x, y) in a.into_iter().zip(b) {
            assert!(x.abs_diff(y) <= 1, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn white_and_black() {
        let white = ColorSpace::Lab.point(Srgb::new(255, 255, 255));
        assert!((white[0] - 100.0).abs() < 0.01, "L* of white is {}", white[0]);
        assert!(white[1].abs() < 0.01 && white[2].abs() < 0.01);

        let black = ColorSpace::Lab.point(Srgb::new(0, 0, 0));
        assert!(black.iter().all(|c| c.abs() < 0.01));
    }

    #[test]
    fn lab_round_trip() {
        for r in (0..=255u8).step_by(51) {
            for g in (0..=255u8).step_by(51) {
                for b in (0..=255u8).step_by(51) {
                    let color = Srgb::new(r, g, b);
                    let point = ColorSpace::Lab.point(color);
                    assert_close(to_srgb(cast::from_array::<Lab>(point)), color);
                }
            }
        }
    }

    #[test]
    fn srgb_round_trip_and_clamp() {
        let color = Srgb::new(12, 200, 99);
        let point = ColorSpace::Srgb.point(color);
        assert_eq!(srgb_from_f32(cast::from_array(point)), color);
        assert_eq!(srgb_from_f32(Srgb::new(1.5, -0.2, 0.5)), Srgb::new(255, 0, 128));
    }

    #[test]
    fn out_of_gamut_lab_is_clamped() {
        // far outside sRGB
        let color: Srgb<u8> = to_srgb(Lab::new(50.0, 200.0, -200.0));
        let back = to_srgb(cast::from_array::<Lab>(ColorSpace::Lab.point(color)));
        assert_close(back, color);
    }

    #[test]
    fn hsv_saturation_and_value() {
        let hsv = srgb_to_hsv(Srgb::new(255, 0, 0));
        assert!((hsv.saturation - 1.0).abs() < 1e-6 && (hsv.value - 1.0).abs() < 1e-6);

        let hsv = srgb_to_hsv(Srgb::new(128, 128, 128));
        assert!(hsv.saturation.abs() < 1e-6);
    }

    #[test]
    fn parse_names() {
        assert_eq!("lab".parse::<ColorSpace>().ok(), Some(ColorSpace::Lab));
        assert_eq!(ColorSpace::Srgb.to_string(), "srgb");
        assert!("oklab".parse::<ColorSpace>().is_err());
    }
}
