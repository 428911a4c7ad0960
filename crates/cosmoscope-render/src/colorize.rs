//! Scalar-to-color mapping.
//!
//! Bounds are resolved in three steps: robust percentiles for missing bounds when
//! requested, then plain min/max for anything still missing, then a tiny widening of an
//! empty range. Values are normalized into `[0, 1]`, clamped, looked up in the color map
//! and quantized to 8 bits per channel with rounding.

use cosmoscope_core::{ColorOptions, CosmoError, Result};
use glam::Vec3;

use crate::color_maps::ColorMapRegistry;

/// An 8-bit RGB color.
pub type Rgb8 = [u8; 3];

/// Widening applied to an empty `[vmin, vmin]` range.
pub const RANGE_EPSILON: f64 = 1e-12;

/// Color emitted for NaN and infinite values.
pub const BAD_COLOR: Rgb8 = [0, 0, 0];

/// Linear-interpolation percentile of ascending `sorted` values, `pct` in `[0, 100]`.
///
/// Matches the default method of common statistics libraries: the rank is
/// `pct / 100 * (n - 1)` and values between ranks are interpolated.
/// Returns `None` for an empty slice.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn percentile(sorted: &[f64], pct: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (pct.clamp(0.0, 100.0) / 100.0) * last as f64;
    let lo = rank.floor() as usize;
    let hi = (lo + 1).min(last);
    let frac = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Resolves the normalization bounds for `values` under `options`.
///
/// Non-finite values are ignored. If nothing finite remains and a bound is missing, the
/// unit range is used; every value then maps to [`BAD_COLOR`] anyway.
///
/// # Errors
/// Returns [`CosmoError::InvalidOption`] when the resolved lower bound exceeds the upper
/// one, which can only happen when exactly one bound is given explicitly.
#[allow(clippy::float_cmp)]
pub fn resolve_range(values: &[f64], options: &ColorOptions) -> Result<(f64, f64)> {
    let mut finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    finite.sort_unstable_by(f64::total_cmp);

    let mut vmin = options.vmin;
    let mut vmax = options.vmax;

    if options.robust && (vmin.is_none() || vmax.is_none()) {
        vmin = vmin.or_else(|| percentile(&finite, options.robust_pct));
        vmax = vmax.or_else(|| percentile(&finite, 100.0 - options.robust_pct));
    }

    let vmin = vmin.or_else(|| finite.first().copied()).unwrap_or(0.0);
    let mut vmax = vmax.or_else(|| finite.last().copied()).unwrap_or(1.0);

    if vmin > vmax {
        return Err(CosmoError::invalid_option(
            "vmin",
            format!("resolved lower bound {vmin} exceeds upper bound {vmax}"),
        ));
    }
    if vmin == vmax {
        vmax = vmin + RANGE_EPSILON;
    }
    log::debug!("color range: [{vmin}, {vmax}]");
    Ok((vmin, vmax))
}

/// Normalizes `value` into `[0, 1]`, or `None` for non-finite input.
#[inline]
pub fn normalize(value: f64, vmin: f64, vmax: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    let span = vmax - vmin;
    // vmin + RANGE_EPSILON can round back to vmin for large magnitudes.
    if span <= 0.0 {
        return Some(0.0);
    }
    Some(((value - vmin) / span).clamp(0.0, 1.0))
}

/// Quantizes a `[0, 1]` color to 8 bits per channel, rounding to nearest.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn quantize(color: Vec3) -> Rgb8 {
    let c = (color.clamp(Vec3::ZERO, Vec3::ONE) * 255.0).round();
    [c.x as u8, c.y as u8, c.z as u8]
}

impl ColorMapRegistry {
    /// Maps each value to a color; the output has the same length and order as `values`.
    ///
    /// # Errors
    /// Fails before any computation if the color map is unknown, and when the resolved
    /// bounds are inverted.
    #[allow(clippy::cast_possible_truncation)]
    pub fn map_colors(&self, values: &[f64], options: &ColorOptions) -> Result<Vec<Rgb8>> {
        let color_map = self.resolve(&options.cmap)?;
        if values.is_empty() {
            return Ok(Vec::new());
        }
        let (vmin, vmax) = resolve_range(values, options)?;
        Ok(values
            .iter()
            .map(|&v| match normalize(v, vmin, vmax) {
                Some(t) => quantize(color_map.sample(t as f32)),
                None => BAD_COLOR,
            })
            .collect())
    }
}

/// Maps each value to a color using the default color maps.
///
/// See [`ColorMapRegistry::map_colors`].
pub fn map_colors(values: &[f64], options: &ColorOptions) -> Result<Vec<Rgb8>> {
    ColorMapRegistry::new().map_colors(values, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn cmap(name: &str) -> ColorOptions {
        ColorOptions {
            cmap: name.to_string(),
            ..ColorOptions::default()
        }
    }

    fn channel_distance(a: Rgb8, b: Rgb8) -> i32 {
        (0..3)
            .map(|c| (i32::from(a[c]) - i32::from(b[c])).abs())
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn test_percentile_linear() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 100.0), Some(4.0));
        assert_eq!(percentile(&sorted, 50.0), Some(2.5));
        assert!((percentile(&sorted, 10.0).unwrap() - 1.3).abs() < 1e-12);
        assert_eq!(percentile(&[], 50.0), None);
        assert_eq!(percentile(&[7.0], 99.0), Some(7.0));
    }

    #[test]
    fn test_viridis_extremes_and_midpoint() {
        let registry = ColorMapRegistry::new();
        let viridis = registry.resolve("viridis").unwrap();
        let colors = registry
            .map_colors(&[-1.0, 0.0, 1.0], &cmap("viridis"))
            .unwrap();
        assert_eq!(colors.len(), 3);
        assert_eq!(colors[0], quantize(viridis.sample(0.0)));
        assert_eq!(colors[2], quantize(viridis.sample(1.0)));
        assert!(channel_distance(colors[1], quantize(viridis.sample(0.5))) <= 1);
    }

    #[test]
    fn test_empty_values() {
        assert!(map_colors(&[], &cmap("jet")).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_cmap_fails_even_for_empty_input() {
        let err = map_colors(&[], &cmap("nope")).unwrap_err();
        assert!(matches!(err, CosmoError::UnknownColorMap(_)));
    }

    #[test]
    fn test_constant_values_map_to_start() {
        let registry = ColorMapRegistry::new();
        let jet = registry.resolve("jet").unwrap();
        let colors = registry.map_colors(&[3.5; 4], &cmap("jet")).unwrap();
        assert!(colors.iter().all(|&c| c == quantize(jet.sample(0.0))));

        let big = registry.map_colors(&[1.0e9; 2], &cmap("jet")).unwrap();
        assert_eq!(big[0], quantize(jet.sample(0.0)));
    }

    #[test]
    fn test_explicit_bounds_clamp() {
        let registry = ColorMapRegistry::new();
        let gray = ColorOptions {
            vmin: Some(0.0),
            vmax: Some(10.0),
            ..cmap("gray")
        };
        let colors = registry.map_colors(&[-5.0, 5.0, 20.0], &gray).unwrap();
        assert_eq!(colors[0], [0, 0, 0]);
        assert_eq!(colors[1], [128, 128, 128]);
        assert_eq!(colors[2], [255, 255, 255]);
    }

    #[test]
    fn test_rounding_not_truncation() {
        // 0.999 * 255 = 254.745 rounds up.
        assert_eq!(quantize(Vec3::splat(0.999)), [255, 255, 255]);
        assert_eq!(quantize(Vec3::splat(0.001)), [0, 0, 0]);
    }

    #[test]
    fn test_single_bound_inverted() {
        let options = ColorOptions {
            vmin: Some(5.0),
            ..cmap("jet")
        };
        assert!(map_colors(&[1.0, 2.0], &options).is_err());
    }

    #[test]
    fn test_non_finite_values() {
        let colors = map_colors(&[0.0, f64::NAN, 1.0, f64::INFINITY], &cmap("gray")).unwrap();
        assert_eq!(colors, vec![[0, 0, 0], BAD_COLOR, [255, 255, 255], BAD_COLOR]);
    }

    #[test]
    fn test_robust_clipping() {
        let mut values: Vec<f64> = (0..100).map(f64::from).collect();
        values.push(-1.0e6);
        values.push(1.0e6);
        let low_outlier = values.len() - 2;
        let high_outlier = values.len() - 1;

        let robust = ColorOptions {
            robust: true,
            robust_pct: 1.0,
            ..cmap("jet")
        };
        let clipped = map_colors(&values, &robust).unwrap();
        assert_eq!(clipped[low_outlier], clipped[0]);
        assert_eq!(clipped[high_outlier], clipped[99]);
        assert!(channel_distance(clipped[0], clipped[99]) > 100);

        let stretched = map_colors(&values, &cmap("jet")).unwrap();
        assert!(channel_distance(stretched[0], stretched[99]) <= 1);
        assert!(channel_distance(stretched[low_outlier], stretched[0]) > 100);
    }

    #[test]
    fn test_robust_respects_explicit_bound() {
        let values: Vec<f64> = (0..=100).map(f64::from).collect();
        let options = ColorOptions {
            vmax: Some(200.0),
            robust: true,
            robust_pct: 5.0,
            ..ColorOptions::default()
        };
        let (lo, hi) = resolve_range(&values, &options).unwrap();
        assert!((lo - 5.0).abs() < 1e-12);
        assert_eq!(hi, 200.0);
    }

    proptest! {
        #[test]
        fn prop_one_color_per_value(
            values in prop::collection::vec(-1.0e3f64..1.0e3, 0..200),
            robust in any::<bool>(),
        ) {
            let options = ColorOptions { robust, ..cmap("viridis") };
            let colors = map_colors(&values, &options).unwrap();
            prop_assert_eq!(colors.len(), values.len());
        }
    }
}
