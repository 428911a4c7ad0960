//! Batch processing of a directory of `.cpcm` files.
//!
//! Stage one turns every `<stem>.cpcm` in the input directory into `<stem>.wrl` in the
//! output directory. Stage two renders every `<stem>.wrl` found in the output directory
//! to `<stem>.png`. Existing outputs are kept unless `force` is set.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use cosmoscope_core::{
    build_sample_faces, CosmoError, FaceSet, LogEvents, Options, SurfaceSamples,
};
use cosmoscope_io::{read_cpcm, read_vrml, write_pqr, write_vrml, DEFAULT_PQR_RADIUS};
use cosmoscope_render::{render_mesh, save_image, ColorMapRegistry, RenderMesh};
use glam::Vec3;

use crate::error::{Error, Result};

/// Switches that control which outputs are (re)generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessFlags {
    /// Rebuild meshes and re-render images even if they exist.
    pub force: bool,
    /// Also write `<stem>.pqr` with the color-mapped scalar next to each mesh.
    pub write_pqr: bool,
}

/// Counts of what a batch run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessSummary {
    /// Meshes written.
    pub meshes_built: usize,
    /// Meshes left untouched because they already existed.
    pub meshes_skipped: usize,
    /// Images written.
    pub images_rendered: usize,
    /// Images left untouched because they already existed.
    pub images_skipped: usize,
}

/// What [`build_mesh_file`] produced.
#[derive(Debug, Clone)]
pub struct MeshOutput {
    /// The parsed samples.
    pub samples: SurfaceSamples,
    /// The triangle faces.
    pub faces: FaceSet,
}

/// Lists the files in `dir` with the given extension, sorted by name.
pub fn list_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let dir_error = |source| Error::Dir {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(dir_error)? {
        let path = entry.map_err(dir_error)?.path();
        if path.is_file() && path.extension() == Some(OsStr::new(extension)) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn output_path(output_dir: &Path, input: &Path, extension: &str) -> PathBuf {
    let mut name = input.file_stem().unwrap_or(input.as_os_str()).to_os_string();
    name.push(".");
    name.push(extension);
    output_dir.join(name)
}

/// Parses one `.cpcm` file, builds its faces, colors the selected channel and writes the
/// VRML mesh. When `pqr` is given, the same channel is also written as PQR.
///
/// A file without surface points fails with [`CosmoError::EmptyInput`].
pub fn build_mesh_file(
    cpcm: &Path,
    wrl: &Path,
    pqr: Option<&Path>,
    options: &Options,
    color_maps: &ColorMapRegistry,
) -> Result<MeshOutput> {
    let samples = read_cpcm(cpcm)?;
    if samples.is_empty() {
        return Err(CosmoError::EmptyInput.into());
    }
    let faces = build_sample_faces(&samples, &options.mesh, &mut LogEvents)?;
    let values = samples.scalar_field(options.color_by);
    let colors = color_maps.map_colors(&values, &options.color)?;
    write_vrml(wrl, &samples.points, faces.as_slice(), &colors)?;
    if let Some(pqr) = pqr {
        write_pqr(pqr, &samples.points, &values, DEFAULT_PQR_RADIUS)?;
    }
    Ok(MeshOutput { samples, faces })
}

/// Reads a VRML mesh and renders it to an image file.
#[allow(clippy::cast_possible_truncation)]
pub fn render_file(wrl: &Path, image: &Path, options: &Options) -> Result<()> {
    let mesh = read_vrml(wrl)?;
    let vertices: Vec<Vec3> = mesh.vertices.iter().map(|v| v.as_vec3()).collect();
    let colors: Vec<Vec3> = mesh
        .colors
        .iter()
        .map(|c| Vec3::new(c[0] as f32, c[1] as f32, c[2] as f32))
        .collect();
    let surface = RenderMesh::new(vertices, mesh.faces, &colors);
    let frame = render_mesh(&surface, &options.render)?;
    save_image(image, &frame)?;
    Ok(())
}

/// Runs both stages over `input_dir`, writing into `output_dir`.
///
/// The first failing file aborts the batch.
pub fn process_all(
    input_dir: &Path,
    output_dir: &Path,
    options: &Options,
    flags: &ProcessFlags,
) -> Result<ProcessSummary> {
    options.validate()?;
    let color_maps = ColorMapRegistry::new();
    // Reject unknown color maps before touching any file.
    color_maps.resolve(&options.color.cmap)?;

    std::fs::create_dir_all(output_dir).map_err(|source| Error::Dir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    let mut summary = ProcessSummary::default();

    log::info!(
        "mesh params: neighbor_radius={}, max_neighbors={}, neighbors_threshold={}",
        options.mesh.neighbor_radius,
        options.mesh.max_neighbors,
        options.mesh.neighbors_threshold
    );

    let cpcm_files = list_files(input_dir, "cpcm")?;
    let total = cpcm_files.len();
    log::info!("found {total} .cpcm files in '{}'", input_dir.display());
    for (idx, cpcm) in cpcm_files.iter().enumerate() {
        let name = cpcm.file_name().unwrap_or_default().to_string_lossy();
        let wrl = output_path(output_dir, cpcm, "wrl");
        if wrl.exists() && !flags.force {
            log::info!("[{}/{total}] skipping (exists): {name}", idx + 1);
            summary.meshes_skipped += 1;
            continue;
        }
        log::info!("[{}/{total}] building .wrl from: {name}", idx + 1);
        let pqr = flags
            .write_pqr
            .then(|| output_path(output_dir, cpcm, "pqr"));
        build_mesh_file(cpcm, &wrl, pqr.as_deref(), options, &color_maps)
            .map_err(|e| e.in_file(cpcm))?;
        summary.meshes_built += 1;
    }

    let wrl_files = list_files(output_dir, "wrl")?;
    let total = wrl_files.len();
    log::info!("found {total} .wrl files in '{}'", output_dir.display());
    for (idx, wrl) in wrl_files.iter().enumerate() {
        let name = wrl.file_name().unwrap_or_default().to_string_lossy();
        let png = output_path(output_dir, wrl, "png");
        if png.exists() && !flags.force {
            log::info!("[{}/{total}] skipping render (exists): {name}", idx + 1);
            summary.images_skipped += 1;
            continue;
        }
        log::info!("[{}/{total}] rendering .png from: {name}", idx + 1);
        render_file(wrl, &png, options).map_err(|e| e.in_file(wrl))?;
        summary.images_rendered += 1;
    }

    Ok(summary)
}
