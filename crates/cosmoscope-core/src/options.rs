//! Configuration options for cosmoscope.
//!
//! All knobs of the pipeline live in explicit structs that are passed by value or
//! reference into each stage. Every struct deserializes with `#[serde(default)]`, so a
//! JSON config file only needs to name the values it changes.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CosmoError, Result};

/// Top-level configuration for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Options {
    /// Mesh construction parameters.
    pub mesh: MeshOptions,

    /// Which scalar channel is color mapped.
    pub color_by: ColorBy,

    /// Color normalization and color map selection.
    pub color: ColorOptions,

    /// Image output parameters.
    pub render: RenderSettings,
}

impl Options {
    /// Loads options from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let options: Options = serde_json::from_str(&text)?;
        log::debug!("loaded options from {}", path.as_ref().display());
        Ok(options)
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks every section for out-of-range values.
    pub fn validate(&self) -> Result<()> {
        self.mesh.validate()?;
        self.color.validate()?;
        self.render.validate()
    }
}

/// Parameters of the proximity triangulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshOptions {
    /// Radius of the neighbor query, in the point cloud's length unit.
    pub neighbor_radius: f64,

    /// Maximum number of neighbors kept per vertex (the vertex itself included).
    pub max_neighbors: usize,

    /// Dimensionless multiplier on the sum of two effective patch radii.
    /// Values near 1.0 only connect touching patches; larger values tolerate gaps.
    pub neighbors_threshold: f64,
}

impl Default for MeshOptions {
    fn default() -> Self {
        Self {
            neighbor_radius: 1.0,
            max_neighbors: 15,
            neighbors_threshold: 1.5,
        }
    }
}

impl MeshOptions {
    pub fn validate(&self) -> Result<()> {
        if !(self.neighbor_radius.is_finite() && self.neighbor_radius > 0.0) {
            return Err(CosmoError::invalid_option(
                "neighbor_radius",
                format!("must be a positive number, got {}", self.neighbor_radius),
            ));
        }
        if self.max_neighbors == 0 {
            return Err(CosmoError::invalid_option(
                "max_neighbors",
                "must be at least 1",
            ));
        }
        if !(self.neighbors_threshold.is_finite() && self.neighbors_threshold > 0.0) {
            return Err(CosmoError::invalid_option(
                "neighbors_threshold",
                format!("must be a positive number, got {}", self.neighbors_threshold),
            ));
        }
        Ok(())
    }
}

/// Selects the per-point scalar that drives the colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ColorBy {
    /// Effective (screening) charge of each segment.
    #[default]
    Charge,
    /// Electrostatic potential at each segment.
    Potential,
    /// Charge multiplied by the segment area in bohr².
    SurfaceCharge,
}

impl ColorBy {
    /// Canonical name, as accepted by [`FromStr`].
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ColorBy::Charge => "charge",
            ColorBy::Potential => "potential",
            ColorBy::SurfaceCharge => "surface-charge",
        }
    }
}

impl fmt::Display for ColorBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorBy {
    type Err = CosmoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "charge" | "charges" => Ok(ColorBy::Charge),
            "potential" | "potentials" => Ok(ColorBy::Potential),
            "surface-charge" | "surface_charge" | "sigma" => Ok(ColorBy::SurfaceCharge),
            _ => Err(CosmoError::UnsupportedColorBy(s.to_string())),
        }
    }
}

/// Normalization policy and color map for scalar-to-color mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorOptions {
    /// Explicit lower bound; inferred from the data when `None`.
    pub vmin: Option<f64>,

    /// Explicit upper bound; inferred from the data when `None`.
    pub vmax: Option<f64>,

    /// Color map name (see `ColorMapRegistry`).
    pub cmap: String,

    /// Infer missing bounds from percentiles instead of min/max.
    pub robust: bool,

    /// Percentile used by robust clipping: 1.0 clips at the 1st and 99th percentiles.
    pub robust_pct: f64,
}

impl Default for ColorOptions {
    fn default() -> Self {
        Self {
            vmin: None,
            vmax: None,
            cmap: "jet".to_string(),
            robust: false,
            robust_pct: 1.0,
        }
    }
}

impl ColorOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..50.0).contains(&self.robust_pct) {
            return Err(CosmoError::invalid_option(
                "robust_pct",
                format!("must lie in [0, 50), got {}", self.robust_pct),
            ));
        }
        for (name, bound) in [("vmin", self.vmin), ("vmax", self.vmax)] {
            if bound.is_some_and(|v| !v.is_finite()) {
                return Err(CosmoError::invalid_option(name, "must be finite"));
            }
        }
        if let (Some(lo), Some(hi)) = (self.vmin, self.vmax) {
            if lo > hi {
                return Err(CosmoError::invalid_option(
                    "vmin",
                    format!("lower bound {lo} exceeds upper bound {hi}"),
                ));
            }
        }
        Ok(())
    }
}

/// Parameters of the PNG renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Image width in pixels.
    pub width: u32,

    /// Image height in pixels.
    pub height: u32,

    /// Background color: a color name or `#rgb` / `#rrggbb`.
    pub background: String,

    /// Interpolate vertex normals instead of shading each triangle flat.
    pub smooth_shading: bool,

    /// Supersample the frame to smooth triangle edges.
    pub anti_aliasing: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: 4000,
            height: 3000,
            background: "white".to_string(),
            smooth_shading: false,
            anti_aliasing: true,
        }
    }
}

impl RenderSettings {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CosmoError::invalid_option(
                "window size",
                format!("must be non-zero, got {}x{}", self.width, self.height),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = Options::default();
        assert_eq!(opts.mesh.neighbor_radius, 1.0);
        assert_eq!(opts.mesh.max_neighbors, 15);
        assert_eq!(opts.mesh.neighbors_threshold, 1.5);
        assert_eq!(opts.color_by, ColorBy::Charge);
        assert_eq!(opts.color.cmap, "jet");
        assert!(!opts.color.robust);
        assert_eq!(opts.color.robust_pct, 1.0);
        assert_eq!((opts.render.width, opts.render.height), (4000, 3000));
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn test_color_by_parsing() {
        assert_eq!("charge".parse::<ColorBy>().unwrap(), ColorBy::Charge);
        assert_eq!("Potentials".parse::<ColorBy>().unwrap(), ColorBy::Potential);
        assert_eq!("sigma".parse::<ColorBy>().unwrap(), ColorBy::SurfaceCharge);
        assert_eq!(
            "surface_charge".parse::<ColorBy>().unwrap(),
            ColorBy::SurfaceCharge
        );
        let err = "density".parse::<ColorBy>().unwrap_err();
        assert!(matches!(err, CosmoError::UnsupportedColorBy(ref s) if s == "density"));
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{ "mesh": { "max_neighbors": 8 }, "color_by": "surface-charge",
                        "color": { "cmap": "viridis", "vmin": -0.01 } }"#;
        let opts: Options = serde_json::from_str(json).unwrap();
        assert_eq!(opts.mesh.max_neighbors, 8);
        assert_eq!(opts.mesh.neighbor_radius, 1.0);
        assert_eq!(opts.color_by, ColorBy::SurfaceCharge);
        assert_eq!(opts.color.cmap, "viridis");
        assert_eq!(opts.color.vmin, Some(-0.01));
        assert_eq!(opts.color.vmax, None);
    }

    #[test]
    fn test_json_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("opts.json");
        let mut opts = Options::default();
        opts.color.robust = true;
        opts.render.background = "#202020".into();
        std::fs::write(&path, opts.to_json().unwrap()).unwrap();
        assert_eq!(Options::from_json_file(&path).unwrap(), opts);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut mesh = MeshOptions::default();
        mesh.neighbor_radius = 0.0;
        assert!(mesh.validate().is_err());

        let mut mesh = MeshOptions::default();
        mesh.max_neighbors = 0;
        assert!(mesh.validate().is_err());

        let mut mesh = MeshOptions::default();
        mesh.neighbors_threshold = f64::NAN;
        assert!(mesh.validate().is_err());

        let mut color = ColorOptions::default();
        color.robust_pct = 50.0;
        assert!(color.validate().is_err());

        let mut color = ColorOptions::default();
        color.vmin = Some(1.0);
        color.vmax = Some(0.0);
        assert!(color.validate().is_err());

        let mut color = ColorOptions::default();
        color.vmin = Some(1.0);
        color.vmax = Some(1.0);
        assert!(color.validate().is_ok());

        let mut render = RenderSettings::default();
        render.height = 0;
        assert!(render.validate().is_err());
    }
}
