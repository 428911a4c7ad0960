//! Reader for COSMO `.cpcm` surface files.
//!
//! The header announces the segment count on a line containing
//! `# Number of surface points` (first token). The segment table starts three lines after
//! the line containing `SURFACE POINTS`; each row holds at least ten columns:
//!
//! ```text
//! x y z area potential charge _ _ _ owner
//! ```
//!
//! Coordinates are in bohr and converted to Ångström.

use std::path::Path;

use cosmoscope_core::{CosmoError, DVec3, Result, SurfaceSamples, ANGSTROM_PER_BOHR};

const COUNT_MARKER: &str = "# Number of surface points";
const TABLE_MARKER: &str = "SURFACE POINTS";
/// Lines from the table marker to the first data row.
const TABLE_OFFSET: usize = 3;
const MIN_COLUMNS: usize = 10;
const OWNER_COLUMN: usize = 9;

/// Reads a `.cpcm` file.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn read_cpcm(path: impl AsRef<Path>) -> Result<SurfaceSamples> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let samples = parse_cpcm(&String::from_utf8_lossy(&bytes), path)?;
    log::debug!("read {} surface points from {}", samples.len(), path.display());
    Ok(samples)
}

/// Parses `.cpcm` text; `path` only labels errors.
pub fn parse_cpcm(text: &str, path: &Path) -> Result<SurfaceSamples> {
    let lines: Vec<&str> = text.lines().collect();
    let parse_error = |line: usize, reason: String| CosmoError::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let mut count = None;
    let mut table_line = None;
    for (idx, line) in lines.iter().enumerate() {
        if line.contains(COUNT_MARKER) {
            if let Some(n) = line
                .split_whitespace()
                .next()
                .and_then(|t| t.parse::<usize>().ok())
            {
                count = Some(n);
            }
        }
        if line.contains(TABLE_MARKER) {
            table_line = Some(idx);
            break;
        }
    }

    let table_line = table_line.ok_or_else(|| {
        parse_error(
            lines.len(),
            format!("'{TABLE_MARKER}' section not found"),
        )
    })?;
    let count = count.ok_or_else(|| {
        parse_error(
            table_line + 1,
            format!("no readable '{COUNT_MARKER}' line before the surface table"),
        )
    })?;

    let start = (table_line + TABLE_OFFSET).min(lines.len());
    let end = start.saturating_add(count).min(lines.len());
    if end - start < count {
        log::warn!(
            "{}: header announces {count} surface points but only {} lines follow",
            path.display(),
            end - start
        );
    }

    let mut points = Vec::with_capacity(count);
    let mut charges = Vec::with_capacity(count);
    let mut potentials = Vec::with_capacity(count);
    let mut areas = Vec::with_capacity(count);
    let mut owners = Vec::with_capacity(count);

    for (idx, line) in lines.iter().enumerate().take(end).skip(start) {
        let line_number = idx + 1;
        let columns: Vec<&str> = line.split_whitespace().collect();
        if columns.len() < MIN_COLUMNS {
            log::debug!(
                "{}:{line_number}: skipping row with {} columns",
                path.display(),
                columns.len()
            );
            continue;
        }

        let float = |col: usize| {
            columns[col].parse::<f64>().map_err(|_| {
                parse_error(
                    line_number,
                    format!("invalid number '{}' in column {}", columns[col], col + 1),
                )
            })
        };
        let point = DVec3::new(float(0)?, float(1)?, float(2)?);
        let area = float(3)?;
        let potential = float(4)?;
        let charge = float(5)?;
        let owner = columns[OWNER_COLUMN].parse::<i64>().map_err(|_| {
            parse_error(
                line_number,
                format!("invalid sphere owner '{}'", columns[OWNER_COLUMN]),
            )
        })?;

        points.push(point * ANGSTROM_PER_BOHR);
        areas.push(area);
        potentials.push(potential);
        charges.push(charge);
        owners.push(owner);
    }

    SurfaceSamples::new(points, charges, potentials, areas, owners)
}
