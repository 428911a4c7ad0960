//! PQR point export.
//!
//! Each surface point becomes one pseudo-atom record carrying the selected scalar in the
//! charge column, so the surface can be loaded by molecular viewers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use cosmoscope_core::{CosmoError, DVec3, Result};

/// Radius written for every point unless another one is given.
pub const DEFAULT_PQR_RADIUS: f64 = 0.300;

/// Writes one `ATOM` record per point to `path`, creating parent directories.
pub fn write_pqr(
    path: impl AsRef<Path>,
    points: &[DVec3],
    values: &[f64],
    radius: f64,
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_pqr_to(&mut writer, points, values, radius)?;
    writer.flush()?;
    log::info!("wrote PQR {}", path.display());
    Ok(())
}

/// Writes PQR records to any writer. Record numbers start at 1.
pub fn write_pqr_to<W: Write>(
    writer: &mut W,
    points: &[DVec3],
    values: &[f64],
    radius: f64,
) -> Result<()> {
    if values.len() != points.len() {
        return Err(CosmoError::SizeMismatch {
            what: "pqr values",
            expected: points.len(),
            actual: values.len(),
        });
    }
    for (i, (p, value)) in points.iter().zip(values).enumerate() {
        writeln!(
            writer,
            "ATOM {:6} SPH  CSP A    1    {:8.3}{:8.3}{:8.3} {:8.4} {:6.3}",
            i + 1,
            p.x,
            p.y,
            p.z,
            value,
            radius
        )?;
    }
    Ok(())
}
