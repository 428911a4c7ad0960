//! CPU rasterization of colored triangle meshes.
//!
//! The mesh is viewed through an orthographic [`Camera`] fitted to its bounding box and
//! drawn with a depth buffer. Per-vertex colors are interpolated barycentrically and lit
//! by a headlight, a weak fill light from `+Z` and a constant ambient term. Lighting is
//! two-sided because proximity meshes carry no consistent winding.

use cosmoscope_core::RenderSettings;
use glam::{Mat4, Vec3};
use image::{imageops, Rgb, RgbImage};

use crate::camera::Camera;
use crate::colorize::Rgb8;
use crate::error::{RenderError, RenderResult};

/// Supersampling factor used when anti-aliasing is enabled.
pub const SSAA_FACTOR: u32 = 2;

/// Color given to vertices when a mesh comes without colors.
pub const DEFAULT_SURFACE_COLOR: Vec3 = Vec3::splat(0.7);

const AMBIENT: f32 = 0.3;
const HEADLIGHT: f32 = 0.7;
const FILL_LIGHT: f32 = 0.2;
const FILL_DIRECTION: Vec3 = Vec3::Z;

/// A triangle mesh with one color per vertex, ready to be drawn.
#[derive(Debug, Clone, Default)]
pub struct RenderMesh {
    /// Vertex positions.
    pub vertices: Vec<Vec3>,
    /// Triangles as vertex indices.
    pub triangles: Vec<[usize; 3]>,
    /// Per-vertex colors in `[0, 1]`.
    pub colors: Vec<Vec3>,
}

impl RenderMesh {
    /// Creates a mesh, fitting `colors` to the vertex count with [`fit_colors`].
    pub fn new(vertices: Vec<Vec3>, triangles: Vec<[usize; 3]>, colors: &[Vec3]) -> Self {
        let colors = fit_colors(colors, vertices.len());
        Self {
            vertices,
            triangles,
            colors,
        }
    }

    /// Checks that every triangle refers to an existing vertex and that there is one
    /// color per vertex.
    pub fn validate(&self) -> RenderResult<()> {
        if self.colors.len() != self.vertices.len() {
            return Err(RenderError::InvalidMesh(format!(
                "{} colors for {} vertices",
                self.colors.len(),
                self.vertices.len()
            )));
        }
        let n = self.vertices.len();
        if let Some((t, tri)) = self
            .triangles
            .iter()
            .enumerate()
            .find(|(_, tri)| tri.iter().any(|&v| v >= n))
        {
            return Err(RenderError::InvalidMesh(format!(
                "triangle {t} {tri:?} refers past {n} vertices"
            )));
        }
        Ok(())
    }

    /// Returns the axis-aligned bounding box of the vertices, or `None` when empty.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Computes unit face normals, oriented away from the vertex centroid.
    pub fn face_normals(&self) -> Vec<Vec3> {
        let centroid = if self.vertices.is_empty() {
            Vec3::ZERO
        } else {
            self.vertices.iter().copied().sum::<Vec3>() / self.vertices.len() as f32
        };
        self.triangles
            .iter()
            .map(|&[a, b, c]| {
                let (v0, v1, v2) = (self.vertices[a], self.vertices[b], self.vertices[c]);
                let normal = (v1 - v0).cross(v2 - v0).normalize_or_zero();
                let face_center = (v0 + v1 + v2) / 3.0;
                if normal.dot(face_center - centroid) < 0.0 {
                    -normal
                } else {
                    normal
                }
            })
            .collect()
    }

    /// Computes vertex normals as area-weighted average of incident face normals.
    pub fn vertex_normals(&self, face_normals: &[Vec3]) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for (tri, &face_normal) in self.triangles.iter().zip(face_normals) {
            let [a, b, c] = *tri;
            let area = (self.vertices[b] - self.vertices[a])
                .cross(self.vertices[c] - self.vertices[a])
                .length()
                * 0.5;
            let weighted_normal = face_normal * area;
            for &vi in tri {
                normals[vi] += weighted_normal;
            }
        }
        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        normals
    }
}

/// Fits a color list to `n` vertices: longer lists are truncated and shorter ones are
/// repeated cyclically. An empty list yields [`DEFAULT_SURFACE_COLOR`] everywhere.
pub fn fit_colors(colors: &[Vec3], n: usize) -> Vec<Vec3> {
    if colors.len() == n {
        return colors.to_vec();
    }
    if colors.is_empty() {
        if n > 0 {
            log::warn!("no vertex colors; using default surface color");
        }
        return vec![DEFAULT_SURFACE_COLOR; n];
    }
    if colors.len() > n {
        log::warn!("{} colors for {n} vertices; truncating", colors.len());
    } else {
        log::warn!("{} colors for {n} vertices; repeating", colors.len());
    }
    colors.iter().copied().cycle().take(n).collect()
}

/// Parses a background color: a common color name, `#rgb` or `#rrggbb`.
pub fn parse_color(text: &str) -> RenderResult<Rgb8> {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    let named = match lower.as_str() {
        "white" | "w" => Some([255, 255, 255]),
        "black" | "k" => Some([0, 0, 0]),
        "gray" | "grey" => Some([128, 128, 128]),
        "lightgray" | "lightgrey" => Some([211, 211, 211]),
        "darkgray" | "darkgrey" => Some([169, 169, 169]),
        "red" | "r" => Some([255, 0, 0]),
        "green" | "g" => Some([0, 128, 0]),
        "blue" | "b" => Some([0, 0, 255]),
        "yellow" | "y" => Some([255, 255, 0]),
        "cyan" | "c" => Some([0, 255, 255]),
        "magenta" | "m" => Some([255, 0, 255]),
        "orange" => Some([255, 165, 0]),
        "purple" => Some([128, 0, 128]),
        "navy" => Some([0, 0, 128]),
        "paraview" => Some([82, 87, 110]),
        _ => None,
    };
    if let Some(rgb) = named {
        return Ok(rgb);
    }

    let invalid = || RenderError::InvalidColor(trimmed.to_string());
    let hex = lower.strip_prefix('#').ok_or_else(invalid)?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.char_indices() {
                let v = channel(&hex[i..i + c.len_utf8()])?;
                rgb[i] = v * 17;
            }
            Ok(rgb)
        }
        6 => Ok([
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        ]),
        _ => Err(invalid()),
    }
}

#[derive(Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
}

fn to_screen(vp: &Mat4, p: Vec3, width: u32, height: u32) -> ScreenVertex {
    let ndc = vp.project_point3(p);
    ScreenVertex {
        x: (ndc.x + 1.0) * 0.5 * width as f32,
        y: (1.0 - ndc.y) * 0.5 * height as f32,
        depth: ndc.z,
    }
}

#[inline]
fn edge(a: ScreenVertex, b: ScreenVertex, px: f32, py: f32) -> f32 {
    (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x)
}

#[inline]
fn shade(color: Vec3, normal: Vec3, view_dir: Vec3) -> Vec3 {
    let headlight = normal.dot(view_dir).abs();
    let fill = normal.dot(FILL_DIRECTION).max(0.0);
    (color * (AMBIENT + HEADLIGHT * headlight + FILL_LIGHT * fill)).clamp(Vec3::ZERO, Vec3::ONE)
}

struct Framebuffer {
    image: RgbImage,
    depth: Vec<f32>,
}

impl Framebuffer {
    fn new(width: u32, height: u32, background: Rgb8) -> Self {
        Self {
            image: RgbImage::from_pixel(width, height, Rgb(background)),
            depth: vec![f32::INFINITY; width as usize * height as usize],
        }
    }

    fn width(&self) -> u32 {
        self.image.width()
    }

    fn height(&self) -> u32 {
        self.image.height()
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn draw_triangle(
    fb: &mut Framebuffer,
    screen: [ScreenVertex; 3],
    colors: [Vec3; 3],
    normals: [Vec3; 3],
    view_dir: Vec3,
) {
    let [a, b, c] = screen;
    let area = edge(a, b, c.x, c.y);
    if area.abs() < f32::EPSILON || !area.is_finite() {
        return;
    }

    let width = fb.width();
    let height = fb.height();
    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as u32;
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as u32;
    let max_x = (a.x.max(b.x).max(c.x).ceil().max(0.0) as u32).min(width);
    let max_y = (a.y.max(b.y).max(c.y).ceil().max(0.0) as u32).min(height);

    for py in min_y..max_y {
        let sy = py as f32 + 0.5;
        for px in min_x..max_x {
            let sx = px as f32 + 0.5;
            let w0 = edge(b, c, sx, sy) / area;
            let w1 = edge(c, a, sx, sy) / area;
            let w2 = edge(a, b, sx, sy) / area;
            if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                continue;
            }
            let depth = w0 * a.depth + w1 * b.depth + w2 * c.depth;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }
            let slot = py as usize * width as usize + px as usize;
            if depth >= fb.depth[slot] {
                continue;
            }
            fb.depth[slot] = depth;

            let color = colors[0] * w0 + colors[1] * w1 + colors[2] * w2;
            let normal = (normals[0] * w0 + normals[1] * w1 + normals[2] * w2).normalize_or_zero();
            let lit = shade(color, normal, view_dir);
            fb.image.put_pixel(px, py, Rgb(crate::colorize::quantize(lit)));
        }
    }
}

/// Renders `mesh` to an image of `settings.width` by `settings.height` pixels.
///
/// A mesh with vertices but no triangles renders as a plain background image.
///
/// # Errors
/// Fails on zero dimensions, an unparsable background, an inconsistent mesh, or a mesh
/// without vertices.
pub fn render_mesh(mesh: &RenderMesh, settings: &RenderSettings) -> RenderResult<RgbImage> {
    if settings.width == 0 || settings.height == 0 {
        return Err(RenderError::InvalidSize {
            width: settings.width,
            height: settings.height,
        });
    }
    let background = parse_color(&settings.background)?;
    mesh.validate()?;
    let (min, max) = mesh.bounding_box().ok_or(RenderError::EmptyMesh)?;
    if mesh.triangles.is_empty() {
        log::warn!(
            "mesh with {} vertices has no triangles; rendering background only",
            mesh.vertices.len()
        );
        return Ok(RgbImage::from_pixel(
            settings.width,
            settings.height,
            Rgb(background),
        ));
    }

    let factor = if settings.anti_aliasing { SSAA_FACTOR } else { 1 };
    let width = settings
        .width
        .checked_mul(factor)
        .ok_or(RenderError::InvalidSize {
            width: settings.width,
            height: settings.height,
        })?;
    let height = settings
        .height
        .checked_mul(factor)
        .ok_or(RenderError::InvalidSize {
            width: settings.width,
            height: settings.height,
        })?;

    let mut camera = Camera::new(settings.width as f32 / settings.height as f32);
    camera.look_at_box(min, max);
    let vp = camera.view_projection_matrix();
    let view_dir = -camera.forward();

    let face_normals = mesh.face_normals();
    let vertex_normals = if settings.smooth_shading {
        Some(mesh.vertex_normals(&face_normals))
    } else {
        None
    };
    let screen: Vec<ScreenVertex> = mesh
        .vertices
        .iter()
        .map(|&v| to_screen(&vp, v, width, height))
        .collect();

    log::debug!(
        "rasterizing {} triangles at {width}x{height} ({} shading)",
        mesh.triangles.len(),
        if settings.smooth_shading { "smooth" } else { "flat" }
    );

    let mut fb = Framebuffer::new(width, height, background);
    for (t, &[i, j, k]) in mesh.triangles.iter().enumerate() {
        let normals = match &vertex_normals {
            Some(vn) => [vn[i], vn[j], vn[k]],
            None => [face_normals[t]; 3],
        };
        draw_triangle(
            &mut fb,
            [screen[i], screen[j], screen[k]],
            [mesh.colors[i], mesh.colors[j], mesh.colors[k]],
            normals,
            view_dir,
        );
    }

    if factor == 1 {
        return Ok(fb.image);
    }
    Ok(imageops::thumbnail(
        &fb.image,
        settings.width,
        settings.height,
    ))
}
