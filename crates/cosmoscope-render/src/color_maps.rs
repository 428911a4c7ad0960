//! Color map system.
//!
//! Every map is stored as evenly spaced samples on `[0, 1]` and sampled with linear
//! interpolation. Maps defined by breakpoints (`jet`) or by a formula (`turbo`) are
//! tabulated at [`TABLE_SIZE`] points when registered.

use std::collections::HashMap;

use cosmoscope_core::{CosmoError, Result};
use glam::Vec3;

/// Number of samples used to tabulate segment and procedural maps.
pub const TABLE_SIZE: usize = 256;

/// Suffix that selects the reversed version of any registered map.
const REVERSED_SUFFIX: &str = "_r";

/// A color map for mapping scalar values to colors.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    /// Color map name.
    pub name: String,
    /// Color samples (evenly spaced from 0 to 1).
    pub colors: Vec<Vec3>,
}

impl ColorMap {
    /// Creates a new color map.
    pub fn new(name: impl Into<String>, colors: Vec<Vec3>) -> Self {
        Self {
            name: name.into(),
            colors,
        }
    }

    /// Creates a color map from per-channel breakpoints.
    ///
    /// Each channel is a list of `(x, value)` pairs with `x` ascending from 0 to 1; the
    /// channel is piecewise linear between breakpoints.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_segments(
        name: impl Into<String>,
        red: &[(f32, f32)],
        green: &[(f32, f32)],
        blue: &[(f32, f32)],
    ) -> Self {
        let colors = (0..TABLE_SIZE)
            .map(|i| {
                let x = i as f32 / (TABLE_SIZE - 1) as f32;
                Vec3::new(
                    eval_segments(red, x),
                    eval_segments(green, x),
                    eval_segments(blue, x),
                )
            })
            .collect();
        Self::new(name, colors)
    }

    /// Creates a color map by evaluating `f` on `[0, 1]`.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_fn(name: impl Into<String>, f: impl Fn(f32) -> Vec3) -> Self {
        let colors = (0..TABLE_SIZE)
            .map(|i| f(i as f32 / (TABLE_SIZE - 1) as f32).clamp(Vec3::ZERO, Vec3::ONE))
            .collect();
        Self::new(name, colors)
    }

    /// Returns the same map traversed from 1 to 0.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut colors = self.colors.clone();
        colors.reverse();
        Self::new(format!("{}{REVERSED_SUFFIX}", self.name), colors)
    }

    /// Samples the color map at a given value (0 to 1).
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn sample(&self, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);

        if self.colors.is_empty() {
            return Vec3::ZERO;
        }

        if self.colors.len() == 1 {
            return self.colors[0];
        }

        let n = self.colors.len() - 1;
        let idx = (t * n as f32).floor() as usize;
        let idx = idx.min(n - 1);
        let frac = t * n as f32 - idx as f32;

        self.colors[idx].lerp(self.colors[idx + 1], frac)
    }
}

/// Piecewise linear interpolation through `(x, value)` breakpoints.
fn eval_segments(segments: &[(f32, f32)], x: f32) -> f32 {
    let Some(&(x0, v0)) = segments.first() else {
        return 0.0;
    };
    if x <= x0 {
        return v0;
    }
    for pair in segments.windows(2) {
        let (xa, va) = pair[0];
        let (xb, vb) = pair[1];
        if x <= xb {
            let span = xb - xa;
            if span <= 0.0 {
                return vb;
            }
            return va + (vb - va) * (x - xa) / span;
        }
    }
    segments[segments.len() - 1].1
}

/// Polynomial fit of Google's Turbo map (Ruofei Du, Apache-2.0).
fn turbo(x: f32) -> Vec3 {
    let x2 = x * x;
    let x3 = x2 * x;
    let x4 = x3 * x;
    let x5 = x4 * x;
    let channel = |c: [f32; 6]| c[0] + c[1] * x + c[2] * x2 + c[3] * x3 + c[4] * x4 + c[5] * x5;
    Vec3::new(
        channel([
            0.135_721_38,
            4.615_392_6,
            -42.660_324,
            132.131_08,
            -152.942_4,
            59.286_38,
        ]),
        channel([
            0.091_402_61,
            2.194_188_4,
            4.842_966_6,
            -14.185_033,
            4.277_298_6,
            2.829_566,
        ]),
        channel([
            0.106_673_3,
            12.641_946,
            -60.582_05,
            110.362_77,
            -89.903_11,
            27.348_25,
        ]),
    )
}

/// Registry for managing color maps.
#[derive(Default)]
pub struct ColorMapRegistry {
    color_maps: HashMap<String, ColorMap>,
}

impl ColorMapRegistry {
    /// Creates a new color map registry with default color maps.
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    #[allow(clippy::too_many_lines)]
    fn register_defaults(&mut self) {
        // Jet, from Matplotlib's segment data
        self.register(ColorMap::from_segments(
            "jet",
            &[(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)],
            &[
                (0.0, 0.0),
                (0.125, 0.0),
                (0.375, 1.0),
                (0.64, 1.0),
                (0.91, 0.0),
                (1.0, 0.0),
            ],
            &[(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)],
        ));

        // Viridis color map
        self.register(ColorMap::new(
            "viridis",
            vec![
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.282, 0.140, 0.457),
                Vec3::new(0.253, 0.265, 0.529),
                Vec3::new(0.206, 0.371, 0.553),
                Vec3::new(0.163, 0.471, 0.558),
                Vec3::new(0.127, 0.566, 0.550),
                Vec3::new(0.134, 0.658, 0.517),
                Vec3::new(0.266, 0.749, 0.440),
                Vec3::new(0.477, 0.821, 0.318),
                Vec3::new(0.741, 0.873, 0.150),
                Vec3::new(0.993, 0.906, 0.144),
            ],
        ));

        self.register(ColorMap::from_fn("turbo", turbo));

        // Blues color map
        self.register(ColorMap::new(
            "blues",
            vec![
                Vec3::new(0.969, 0.984, 1.000),
                Vec3::new(0.871, 0.922, 0.969),
                Vec3::new(0.776, 0.859, 0.937),
                Vec3::new(0.620, 0.792, 0.882),
                Vec3::new(0.419, 0.682, 0.839),
                Vec3::new(0.259, 0.573, 0.776),
                Vec3::new(0.129, 0.443, 0.710),
                Vec3::new(0.031, 0.318, 0.612),
                Vec3::new(0.031, 0.188, 0.420),
            ],
        ));

        // Reds color map
        self.register(ColorMap::new(
            "reds",
            vec![
                Vec3::new(1.000, 0.961, 0.941),
                Vec3::new(0.996, 0.878, 0.824),
                Vec3::new(0.988, 0.733, 0.631),
                Vec3::new(0.988, 0.573, 0.447),
                Vec3::new(0.984, 0.416, 0.290),
                Vec3::new(0.937, 0.231, 0.173),
                Vec3::new(0.796, 0.094, 0.114),
                Vec3::new(0.647, 0.059, 0.082),
                Vec3::new(0.404, 0.000, 0.051),
            ],
        ));

        // Coolwarm color map
        self.register(ColorMap::new(
            "coolwarm",
            vec![
                Vec3::new(0.230, 0.299, 0.754),
                Vec3::new(0.552, 0.690, 0.996),
                Vec3::new(0.866, 0.866, 0.866),
                Vec3::new(0.956, 0.604, 0.486),
                Vec3::new(0.706, 0.016, 0.150),
            ],
        ));

        // Rainbow color map
        self.register(ColorMap::new(
            "rainbow",
            vec![
                Vec3::new(0.5, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(0.0, 1.0, 1.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
        ));

        self.register(ColorMap::new("gray", vec![Vec3::ZERO, Vec3::ONE]));
    }

    /// Registers a color map. Names are stored lowercase.
    pub fn register(&mut self, mut color_map: ColorMap) {
        color_map.name = color_map.name.to_lowercase();
        self.color_maps.insert(color_map.name.clone(), color_map);
    }

    /// Gets a color map by its registered (lowercase) name.
    pub fn get(&self, name: &str) -> Option<&ColorMap> {
        self.color_maps.get(name)
    }

    /// Looks up a map by name, ignoring case. A `_r` suffix returns the reversed map.
    pub fn resolve(&self, name: &str) -> Result<ColorMap> {
        let key = name.trim().to_lowercase();
        if let Some(map) = self.color_maps.get(&key) {
            return Ok(map.clone());
        }
        key.strip_suffix(REVERSED_SUFFIX)
            .and_then(|base| self.color_maps.get(base))
            .map(ColorMap::reversed)
            .ok_or_else(|| CosmoError::UnknownColorMap(name.to_string()))
    }

    /// Returns all color map names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.color_maps.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < 1e-3, "{a:?} != {b:?}");
    }

    #[test]
    fn test_sample_interpolates() {
        let map = ColorMap::new("test", vec![Vec3::ZERO, Vec3::ONE]);
        assert_close(map.sample(0.25), Vec3::splat(0.25));
        assert_close(map.sample(-1.0), Vec3::ZERO);
        assert_close(map.sample(2.0), Vec3::ONE);
    }

    #[test]
    fn test_jet_breakpoints() {
        let registry = ColorMapRegistry::new();
        let jet = registry.get("jet").unwrap();
        assert_eq!(jet.colors.len(), TABLE_SIZE);
        assert_close(jet.sample(0.0), Vec3::new(0.0, 0.0, 0.5));
        assert_close(jet.sample(1.0), Vec3::new(0.5, 0.0, 0.0));
        // Green plateau in the middle of the map
        let mid = jet.sample(0.5);
        assert!(mid.y > 0.99, "{mid:?}");
    }

    #[test]
    fn test_turbo_endpoints() {
        let registry = ColorMapRegistry::new();
        let turbo = registry.get("turbo").unwrap();
        let lo = turbo.sample(0.15);
        let hi = turbo.sample(1.0);
        assert!(lo.z > lo.x, "turbo starts blue-ish: {lo:?}");
        assert!(hi.x > hi.z, "turbo ends red-ish: {hi:?}");
        assert!(turbo.colors.iter().all(|c| c.min_element() >= 0.0 && c.max_element() <= 1.0));
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        let registry = ColorMapRegistry::new();
        assert_eq!(registry.resolve("Viridis").unwrap().name, "viridis");
        assert_eq!(registry.resolve("BLUES").unwrap().name, "blues");
    }

    #[test]
    fn test_resolve_reversed() {
        let registry = ColorMapRegistry::new();
        let forward = registry.resolve("viridis").unwrap();
        let reversed = registry.resolve("viridis_r").unwrap();
        assert_eq!(reversed.name, "viridis_r");
        assert_close(reversed.sample(0.0), forward.sample(1.0));
        assert_close(reversed.sample(1.0), forward.sample(0.0));
    }

    #[test]
    fn test_resolve_unknown() {
        let registry = ColorMapRegistry::new();
        let err = registry.resolve("no_such_map").unwrap_err();
        assert!(matches!(err, CosmoError::UnknownColorMap(ref n) if n == "no_such_map"));
    }

    #[test]
    fn test_names_contains_required_maps() {
        let registry = ColorMapRegistry::new();
        let names: Vec<&str> = registry.names().collect();
        for required in ["jet", "viridis", "turbo", "gray"] {
            assert!(names.contains(&required), "missing {required}");
        }
    }
}
