//! Reordering a palette (and its statistics) by a [`SortKey`].

use crate::{ColorStat, ExtractError, Result};
use ordered_float::OrderedFloat;
use palette::Srgb;
use serde::{Deserialize, Serialize};
use std::{cmp::Reverse, fmt::Display, str::FromStr};

/// The order in which extracted colors are returned.
///
/// Every key except [`SortKey::None`] needs per-color statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Ascending mean x coordinate (left to right).
    SpatialX,
    /// Ascending mean y coordinate (top to bottom).
    SpatialY,
    /// Descending pixel count.
    Frequency,
    /// The order produced by the extractor.
    #[default]
    None,
}

impl SortKey {
    /// Every sort key.
    pub const ALL: [Self; 4] = [Self::SpatialX, Self::SpatialY, Self::Frequency, Self::None];

    /// The name of the sort key as accepted by [`SortKey::from_str`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            SortKey::SpatialX => "spatial-x",
            SortKey::SpatialY => "spatial-y",
            SortKey::Frequency => "frequency",
            SortKey::None => "none",
        }
    }

    /// Whether sorting by this key needs statistics.
    #[must_use]
    pub const fn needs_stats(self) -> bool {
        !matches!(self, SortKey::None)
    }
}

impl Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SortKey {
    type Err = ExtractError;

    fn from_str(s: &str) -> Result<Self> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.name() == s)
            .ok_or_else(|| ExtractError::configuration("sort_by", s))
    }
}

/// Reorders `colors` and `stats` together by `key`.
///
/// The sort is stable, so colors with equal keys keep their extraction order.
/// [`SortKey::None`] returns the input unchanged.
///
/// # Errors
/// Returns [`ExtractError::MissingStats`] if `key` needs statistics and `stats` is `None`.
pub fn sort(
    colors: Vec<Srgb<u8>>,
    stats: Option<Vec<ColorStat>>,
    key: SortKey,
) -> Result<(Vec<Srgb<u8>>, Option<Vec<ColorStat>>)> {
    if !key.needs_stats() {
        return Ok((colors, stats));
    }

    let Some(stats) = stats else {
        return Err(ExtractError::MissingStats { sort_by: key });
    };

    debug_assert_eq!(colors.len(), stats.len());

    let mut order = (0..colors.len()).collect::<Vec<_>>();
    match key {
        SortKey::SpatialX => order.sort_by_key(|&i| OrderedFloat(stats[i].spatial_x)),
        SortKey::SpatialY => order.sort_by_key(|&i| OrderedFloat(stats[i].spatial_y)),
        SortKey::Frequency => order.sort_by_key(|&i| Reverse(stats[i].pixel_count)),
        SortKey::None => (),
    }

    let colors = order.iter().map(|&i| colors[i]).collect();
    let stats = order.iter().map(|&i| stats[i].clone()).collect();
    Ok((colors, Some(stats)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stat(spatial_x: f64, spatial_y: f64, pixel_count: u32) -> ColorStat {
        ColorStat {
            hex: String::new(),
            percentage: 0.0,
            saturation: 0.0,
            spatial_x,
            spatial_y,
            pixel_count,
        }
    }

    fn fixture() -> (Vec<Srgb<u8>>, Vec<ColorStat>) {
        let colors = vec![Srgb::new(1, 0, 0), Srgb::new(2, 0, 0), Srgb::new(3, 0, 0), Srgb::new(4, 0, 0)];
        let stats = vec![stat(0.9, 0.1, 5), stat(0.2, 0.7, 10), stat(0.9, 0.3, 10), stat(0.1, 0.7, 1)];
        (colors, stats)
    }

    fn reds(colors: &[Srgb<u8>]) -> Vec<u8> {
        colors.iter().map(|c| c.red).collect()
    }

    #[test]
    fn spatial_keys_are_stable() {
        let (colors, stats) = fixture();
        let (sorted, sorted_stats) = sort(colors.clone(), Some(stats.clone()), SortKey::SpatialX).unwrap();
        assert_eq!(reds(&sorted), [4, 2, 1, 3]);
        let sorted_stats = sorted_stats.unwrap();
        assert_eq!(sorted_stats[0], stats[3]);

        let (sorted, _) = sort(colors, Some(stats), SortKey::SpatialY).unwrap();
        assert_eq!(reds(&sorted), [1, 3, 2, 4]);
    }

    #[test]
    fn frequency_is_descending() {
        let (colors, stats) = fixture();
        let (sorted, _) = sort(colors, Some(stats), SortKey::Frequency).unwrap();
        assert_eq!(reds(&sorted), [2, 3, 1, 4]);
    }

    #[test]
    fn none_keeps_order() {
        let (colors, stats) = fixture();
        let (sorted, _) = sort(colors.clone(), Some(stats), SortKey::None).unwrap();
        assert_eq!(sorted, colors);

        let (sorted, stats) = sort(colors.clone(), None, SortKey::None).unwrap();
        assert_eq!(sorted, colors);
        assert!(stats.is_none());
    }

    #[test]
    fn missing_stats() {
        let (colors, _) = fixture();
        for key in [SortKey::SpatialX, SortKey::SpatialY, SortKey::Frequency] {
            assert!(matches!(
                sort(colors.clone(), None, key),
                Err(ExtractError::MissingStats { sort_by }) if sort_by == key
            ));
        }
    }

    #[test]
    fn names() {
        for key in SortKey::ALL {
            assert_eq!(key.to_string().parse::<SortKey>().unwrap(), key);
        }
        assert!("spatial_x".parse::<SortKey>().is_err_and(|e| e.is_configuration()));
    }
}
