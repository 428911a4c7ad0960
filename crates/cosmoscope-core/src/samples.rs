//! Surface sample points produced by a COSMO calculation.

use glam::DVec3;

use crate::error::{CosmoError, Result};
use crate::options::ColorBy;

/// Length of one bohr in Ångström.
pub const ANGSTROM_PER_BOHR: f64 = 0.529_177;

/// The segments of a solvation surface, stored as parallel per-point arrays.
///
/// Index `i` in every array refers to the same segment; it is also the vertex id used by
/// the mesh builder and the color table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceSamples {
    /// Segment centers.
    pub points: Vec<DVec3>,
    /// Effective screening charge per segment.
    pub charges: Vec<f64>,
    /// Electrostatic potential per segment.
    pub potentials: Vec<f64>,
    /// Segment area.
    pub areas: Vec<f64>,
    /// Id of the atomic sphere that generated the segment.
    pub owners: Vec<i64>,
}

impl SurfaceSamples {
    /// Creates a sample set, checking that every array has one entry per point.
    pub fn new(
        points: Vec<DVec3>,
        charges: Vec<f64>,
        potentials: Vec<f64>,
        areas: Vec<f64>,
        owners: Vec<i64>,
    ) -> Result<Self> {
        let samples = Self {
            points,
            charges,
            potentials,
            areas,
            owners,
        };
        samples.check_lengths()?;
        Ok(samples)
    }

    /// Returns the number of sample points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no sample points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Verifies that all per-point arrays are parallel to `points`.
    pub fn check_lengths(&self) -> Result<()> {
        let expected = self.points.len();
        for (what, actual) in [
            ("charges", self.charges.len()),
            ("potentials", self.potentials.len()),
            ("areas", self.areas.len()),
            ("owners", self.owners.len()),
        ] {
            if actual != expected {
                return Err(CosmoError::SizeMismatch {
                    what,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Returns the scalar channel selected by `color_by`.
    ///
    /// Surface charge is `charge * area / ANGSTROM_PER_BOHR²`; the unit conversion happens
    /// here so the color mapper only ever sees final values.
    pub fn scalar_field(&self, color_by: ColorBy) -> Vec<f64> {
        match color_by {
            ColorBy::Charge => self.charges.clone(),
            ColorBy::Potential => self.potentials.clone(),
            ColorBy::SurfaceCharge => {
                let scale = ANGSTROM_PER_BOHR * ANGSTROM_PER_BOHR;
                self.charges
                    .iter()
                    .zip(&self.areas)
                    .map(|(q, a)| q * (a / scale))
                    .collect()
            }
        }
    }

    /// Returns the axis-aligned bounding box of the points, or `None` when empty.
    pub fn bounding_box(&self) -> Option<(DVec3, DVec3)> {
        bounding_box(&self.points)
    }
}

/// Effective patch radius: the radius of a disk with the given area.
#[inline]
pub fn patch_radius(area: f64) -> f64 {
    (area / std::f64::consts::PI).sqrt()
}

/// Axis-aligned bounding box of a point set, or `None` when it is empty.
pub fn bounding_box(points: &[DVec3]) -> Option<(DVec3, DVec3)> {
    let first = *points.first()?;
    Some(
        points
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_samples() -> SurfaceSamples {
        SurfaceSamples::new(
            vec![DVec3::ZERO, DVec3::X, DVec3::new(0.0, 2.0, -1.0)],
            vec![0.5, -0.25, 0.0],
            vec![0.2, 0.3, 0.4],
            vec![0.1, 0.2, 0.4],
            vec![1, 1, 2],
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_mismatched_arrays() {
        let err = SurfaceSamples::new(
            vec![DVec3::ZERO, DVec3::X],
            vec![0.0, 0.0],
            vec![0.0, 0.0],
            vec![1.0],
            vec![1, 1],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CosmoError::SizeMismatch {
                what: "areas",
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_scalar_channels() {
        let samples = three_samples();
        assert_eq!(samples.scalar_field(ColorBy::Charge), samples.charges);
        assert_eq!(samples.scalar_field(ColorBy::Potential), samples.potentials);

        let sigma = samples.scalar_field(ColorBy::SurfaceCharge);
        let scale = ANGSTROM_PER_BOHR * ANGSTROM_PER_BOHR;
        assert_eq!(sigma.len(), 3);
        assert!((sigma[0] - 0.5 * 0.1 / scale).abs() < 1e-12);
        assert!((sigma[1] + 0.25 * 0.2 / scale).abs() < 1e-12);
        assert_eq!(sigma[2], 0.0);
    }

    #[test]
    fn test_patch_radius() {
        let r = patch_radius(10.0);
        assert!((r - 1.784_124).abs() < 1e-5);
        assert!((std::f64::consts::PI * r * r - 10.0).abs() < 1e-12);
        assert_eq!(patch_radius(0.0), 0.0);
    }

    #[test]
    fn test_bounding_box() {
        let samples = three_samples();
        let (lo, hi) = samples.bounding_box().unwrap();
        assert_eq!(lo, DVec3::new(0.0, 0.0, -1.0));
        assert_eq!(hi, DVec3::new(1.0, 2.0, 0.0));
        assert!(SurfaceSamples::default().bounding_box().is_none());
    }
}
