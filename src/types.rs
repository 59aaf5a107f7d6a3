//! Contains various types needed across the crate.

use crate::{rgb_to_hex, ColorStat, MAX_COLORS};
use palette::Srgb;
use std::{
    error::Error,
    fmt::{Debug, Display},
};

/// An error type for when a length or count is above the maximum supported value.
///
/// The inner value is the maximum supported value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AboveMaxLen<T>(pub T);

impl<T: Display> Display for AboveMaxLen<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "above the maximum length of {}", self.0)
    }
}

impl<T: Debug + Display> Error for AboveMaxLen<T> {}

/// This type is used to specify the (maximum) number of colors to include in a palette.
///
/// This is a simple new type wrapper around `u16` with the invariant that it must be
/// less than or equal to [`MAX_COLORS`].
///
/// A [`PaletteSize`] of `0` can be constructed, but it is rejected by
/// [`ExtractionConfig::validate`](crate::ExtractionConfig::validate)
/// because a palette must have at least one color.
///
/// # Examples
/// ```
/// # use color_extractor::{PaletteSize, AboveMaxLen};
/// # fn main() -> Result<(), AboveMaxLen<u16>> {
/// let size = PaletteSize::from(6);
/// let size = PaletteSize::try_from(128u16)?;
/// let size = PaletteSize::from_clamped(1024);
/// assert_eq!(size, PaletteSize::MAX);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct PaletteSize(u16);

impl PaletteSize {
    /// The maximum supported palette size (given by [`MAX_COLORS`]).
    pub const MAX: Self = Self(MAX_COLORS);

    /// Gets the inner `u16` value.
    #[must_use]
    pub const fn into_inner(self) -> u16 {
        self.0
    }

    /// Gets the inner value as a `usize` for lengths and indexing.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }

    /// Creates a [`PaletteSize`] by clamping the given `u16` to be less than or equal to [`MAX_COLORS`].
    #[must_use]
    pub const fn from_clamped(value: u16) -> Self {
        if value <= MAX_COLORS {
            Self(value)
        } else {
            Self(MAX_COLORS)
        }
    }
}

impl Default for PaletteSize {
    fn default() -> Self {
        Self(5)
    }
}

impl From<PaletteSize> for u16 {
    fn from(val: PaletteSize) -> Self {
        val.into_inner()
    }
}

impl From<u8> for PaletteSize {
    fn from(value: u8) -> Self {
        Self(value.into())
    }
}

impl TryFrom<u16> for PaletteSize {
    type Error = AboveMaxLen<u16>;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value <= MAX_COLORS {
            Ok(PaletteSize(value))
        } else {
            Err(AboveMaxLen(MAX_COLORS))
        }
    }
}

impl Display for PaletteSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.into_inner())
    }
}

/// The intermediate output of a clustering or binning pass.
///
/// `palette` holds the candidate colors and `counts` the number of pixels
/// (or weighted samples) assigned to each of them.
/// Candidates are not guaranteed to be unique and counts may be zero;
/// extractors clean this up before returning a palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizeOutput<Color> {
    /// The candidate colors.
    pub palette: Vec<Color>,
    /// The number of pixels or samples assigned to each color in `palette`.
    pub counts: Vec<u32>,
}

impl<Color> Default for QuantizeOutput<Color> {
    fn default() -> Self {
        Self {
            palette: Vec::new(),
            counts: Vec::new(),
        }
    }
}

impl<Color> QuantizeOutput<Color> {
    /// Converts every palette color, keeping the counts.
    #[must_use]
    pub fn map_palette<Other>(self, convert: impl Fn(Color) -> Other) -> QuantizeOutput<Other> {
        let Self { palette, counts } = self;
        QuantizeOutput {
            palette: palette.into_iter().map(convert).collect(),
            counts,
        }
    }
}

/// The result of one extraction call.
///
/// `colors` is ordered by the requested [`SortKey`](crate::SortKey) and never contains duplicates.
/// Its length is `min(n_colors, number of distinct colors)`.
/// When statistics were requested, `stats` is aligned index-for-index with `colors`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    /// The extracted palette.
    pub colors: Vec<Srgb<u8>>,
    /// Per-color statistics, if requested.
    pub stats: Option<Vec<ColorStat>>,
}

impl ExtractionResult {
    /// The number of extracted colors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether no colors were extracted (only possible for an empty image).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// The palette formatted as `#RRGGBB` strings.
    #[must_use]
    pub fn hex_colors(&self) -> Vec<String> {
        self.colors.iter().copied().map(rgb_to_hex).collect()
    }

    /// The statistics of the first color, which is the dominant color
    /// when sorting by frequency.
    #[must_use]
    pub fn dominant(&self) -> Option<&ColorStat> {
        self.stats.as_deref().and_then(<[ColorStat]>::first)
    }
}
