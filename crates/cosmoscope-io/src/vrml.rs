//! VRML 2.0 `IndexedFaceSet` output and input.
//!
//! The writer emits a single colored shape. The reader accepts that layout and, more
//! generally, any file whose shapes carry `point`, `color` and `coordIndex` arrays;
//! several shapes are merged into one mesh and polygons are fan-triangulated.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use cosmoscope_core::{CosmoError, DVec3, Face, Result};

/// A mesh read back from a VRML file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VrmlMesh {
    /// Vertex positions.
    pub vertices: Vec<DVec3>,
    /// Triangles as vertex indices.
    pub faces: Vec<[usize; 3]>,
    /// Colors in `[0, 1]`, in file order. Not necessarily one per vertex.
    pub colors: Vec<[f64; 3]>,
}

/// Writes a colored triangle mesh to `path`, creating parent directories.
pub fn write_vrml(
    path: impl AsRef<Path>,
    vertices: &[DVec3],
    faces: &[Face],
    colors: &[[u8; 3]],
) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = BufWriter::new(File::create(path)?);
    write_vrml_to(&mut writer, vertices, faces, colors)?;
    writer.flush()?;
    log::info!("wrote VRML {}", path.display());
    Ok(())
}

/// Writes a colored triangle mesh to any writer.
pub fn write_vrml_to<W: Write>(
    writer: &mut W,
    vertices: &[DVec3],
    faces: &[Face],
    colors: &[[u8; 3]],
) -> Result<()> {
    writeln!(writer, "#VRML V2.0 utf8")?;
    writeln!(writer, "Shape {{")?;
    writeln!(writer, "  geometry IndexedFaceSet {{")?;
    writeln!(writer, "    coord Coordinate {{")?;
    writeln!(writer, "      point [")?;
    for v in vertices {
        writeln!(writer, "        {:.6} {:.6} {:.6},", v.x, v.y, v.z)?;
    }
    writeln!(writer, "      ]")?;
    writeln!(writer, "    }}")?;
    writeln!(writer, "    color Color {{")?;
    writeln!(writer, "      color [")?;
    for c in colors {
        writeln!(
            writer,
            "        {:.3} {:.3} {:.3},",
            f64::from(c[0]) / 255.0,
            f64::from(c[1]) / 255.0,
            f64::from(c[2]) / 255.0
        )?;
    }
    writeln!(writer, "      ]")?;
    writeln!(writer, "    }}")?;
    writeln!(writer, "    coordIndex [")?;
    for face in faces {
        let [a, b, c] = face.indices();
        writeln!(writer, "      {a} {b} {c} -1,")?;
    }
    writeln!(writer, "    ]")?;
    writeln!(writer, "  }}")?;
    writeln!(writer, "}}")?;
    Ok(())
}

/// Reads a mesh from a VRML file.
pub fn read_vrml(path: impl AsRef<Path>) -> Result<VrmlMesh> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let mesh = parse_vrml(&String::from_utf8_lossy(&bytes), path)?;
    log::debug!(
        "read {} vertices, {} triangles, {} colors from {}",
        mesh.vertices.len(),
        mesh.faces.len(),
        mesh.colors.len(),
        path.display()
    );
    Ok(mesh)
}

/// Reads only the colors of a VRML file.
pub fn read_vrml_colors(path: impl AsRef<Path>) -> Result<Vec<[f64; 3]>> {
    Ok(read_vrml(path)?.colors)
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    line: usize,
    text: &'a str,
}

/// Splits VRML text into tokens, dropping comments and treating commas as whitespace.
/// Brackets and braces are always tokens of their own.
fn tokenize(text: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    for (idx, raw_line) in text.lines().enumerate() {
        let line = raw_line.split('#').next().unwrap_or("");
        let mut start = None;
        for (pos, ch) in line.char_indices() {
            let is_delim = matches!(ch, '[' | ']' | '{' | '}');
            if ch.is_whitespace() || ch == ',' || is_delim {
                if let Some(s) = start.take() {
                    tokens.push(Token {
                        line: idx + 1,
                        text: &line[s..pos],
                    });
                }
                if is_delim {
                    tokens.push(Token {
                        line: idx + 1,
                        text: &line[pos..pos + 1],
                    });
                }
            } else if start.is_none() {
                start = Some(pos);
            }
        }
        if let Some(s) = start {
            tokens.push(Token {
                line: idx + 1,
                text: &line[s..],
            });
        }
    }
    tokens
}

/// Parses VRML text; `path` only labels errors.
pub fn parse_vrml(text: &str, path: &Path) -> Result<VrmlMesh> {
    let parse_error = |line: usize, reason: String| CosmoError::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    };

    let tokens = tokenize(text);
    let mut mesh = VrmlMesh::default();
    let mut raw_colors: Vec<f64> = Vec::new();
    // Vertex offset and count of the most recent `point` block.
    let mut block_offset = 0;
    let mut block_len = 0;

    let mut i = 0;
    while i < tokens.len() {
        let keyword = tokens[i];
        let opens_array = tokens.get(i + 1).is_some_and(|t| t.text == "[");
        if !opens_array || !matches!(keyword.text, "point" | "color" | "coordIndex") {
            i += 1;
            continue;
        }

        let body_start = i + 2;
        let body_len = tokens[body_start..]
            .iter()
            .position(|t| t.text == "]")
            .ok_or_else(|| {
                parse_error(keyword.line, format!("unterminated '{}' array", keyword.text))
            })?;
        let body = &tokens[body_start..body_start + body_len];
        i = body_start + body_len + 1;

        match keyword.text {
            "point" => {
                let values = parse_floats(body, &parse_error)?;
                if values.len() % 3 != 0 {
                    return Err(parse_error(
                        keyword.line,
                        format!("{} coordinates is not a multiple of 3", values.len()),
                    ));
                }
                block_offset = mesh.vertices.len();
                block_len = values.len() / 3;
                mesh.vertices.extend(
                    values
                        .chunks_exact(3)
                        .map(|c| DVec3::new(c[0], c[1], c[2])),
                );
            }
            "color" => raw_colors.extend(parse_floats(body, &parse_error)?),
            _ => {
                let faces = parse_coord_index(body, block_len, &parse_error)?;
                mesh.faces.extend(
                    faces
                        .into_iter()
                        .map(|f| f.map(|v| v + block_offset)),
                );
            }
        }
    }

    if raw_colors.len() % 3 != 0 {
        log::warn!(
            "{}: {} color values is not a multiple of 3; truncating",
            path.display(),
            raw_colors.len()
        );
    }
    mesh.colors = raw_colors
        .chunks_exact(3)
        .map(|c| [c[0], c[1], c[2]])
        .collect();
    Ok(mesh)
}

fn parse_floats<E>(body: &[Token<'_>], parse_error: &E) -> Result<Vec<f64>>
where
    E: Fn(usize, String) -> CosmoError,
{
    body.iter()
        .map(|t| {
            t.text
                .parse::<f64>()
                .map_err(|_| parse_error(t.line, format!("invalid number '{}'", t.text)))
        })
        .collect()
}

/// Turns a `coordIndex` body into triangles, fan-triangulating each polygon.
/// Polygons are separated by `-1`; the final separator may be omitted.
fn parse_coord_index<E>(
    body: &[Token<'_>],
    vertex_count: usize,
    parse_error: &E,
) -> Result<Vec<[usize; 3]>>
where
    E: Fn(usize, String) -> CosmoError,
{
    let mut triangles = Vec::new();
    let mut polygon: Vec<usize> = Vec::new();
    let mut flush = |polygon: &mut Vec<usize>| {
        for k in 1..polygon.len().saturating_sub(1) {
            triangles.push([polygon[0], polygon[k], polygon[k + 1]]);
        }
        polygon.clear();
    };

    for t in body {
        let value: i64 = t
            .text
            .parse()
            .map_err(|_| parse_error(t.line, format!("invalid index '{}'", t.text)))?;
        if value == -1 {
            flush(&mut polygon);
            continue;
        }
        let index = usize::try_from(value)
            .ok()
            .filter(|&v| v < vertex_count)
            .ok_or_else(|| {
                parse_error(
                    t.line,
                    format!("vertex index {value} out of range for {vertex_count} points"),
                )
            })?;
        polygon.push(index);
    }
    flush(&mut polygon);
    Ok(triangles)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<VrmlMesh> {
        parse_vrml(text, Path::new("test.wrl"))
    }

    #[test]
    fn test_writer_layout() {
        let mut out = Vec::new();
        write_vrml_to(
            &mut out,
            &[DVec3::new(0.0, 1.5, -2.0), DVec3::X, DVec3::Y],
            &[Face::new(2, 0, 1)],
            &[[255, 0, 0], [0, 128, 0], [0, 0, 255]],
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("#VRML V2.0 utf8\nShape {\n  geometry IndexedFaceSet {\n"));
        assert!(text.contains("        0.000000 1.500000 -2.000000,\n"));
        assert!(text.contains("        1.000 0.000 0.000,\n"));
        assert!(text.contains("        0.000 0.502 0.000,\n"));
        assert!(text.contains("      0 1 2 -1,\n"));
        assert!(text.ends_with("    ]\n  }\n}\n"));
    }

    #[test]
    fn test_read_back_written_mesh() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("mesh.wrl");
        let vertices = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z];
        let faces = [Face::new(0, 1, 2), Face::new(1, 2, 3)];
        let colors = [[0, 0, 0], [255, 255, 255], [51, 102, 153], [10, 20, 30]];
        write_vrml(&path, &vertices, &faces, &colors).unwrap();

        let mesh = read_vrml(&path).unwrap();
        assert_eq!(mesh.vertices, vertices.to_vec());
        assert_eq!(mesh.faces, vec![[0, 1, 2], [1, 2, 3]]);
        assert_eq!(mesh.colors.len(), 4);
        assert_eq!(mesh.colors[2], [0.2, 0.4, 0.6]);
    }

    #[test]
    fn test_polygons_are_fan_triangulated() {
        let text = "Shape { geometry IndexedFaceSet {
            coord Coordinate { point [0 0 0, 1 0 0, 1 1 0, 0 1 0] }
            coordIndex [0 1 2 3 -1 0 1]
        } }";
        let mesh = parse(text).unwrap();
        assert_eq!(mesh.faces, vec![[0, 1, 2], [0, 2, 3]]);
        assert!(mesh.colors.is_empty());
    }

    #[test]
    fn test_multiple_shapes_are_merged() {
        let text = "
            Shape { geometry IndexedFaceSet { coord Coordinate { point [0 0 0 1 0 0 0 1 0] }
                coordIndex [0 1 2 -1] } }
            Shape { geometry IndexedFaceSet { coord Coordinate { point [5 5 5 6 5 5 5 6 5] }
                coordIndex [2 1 0 -1] } }";
        let mesh = parse(text).unwrap();
        assert_eq!(mesh.vertices.len(), 6);
        assert_eq!(mesh.faces, vec![[0, 1, 2], [5, 4, 3]]);
    }

    #[test]
    fn test_color_count_not_multiple_of_three_truncates() {
        let text = "color Color { color [ 0.1 0.2 0.3, 0.4 0.5 ] }";
        let mesh = parse(text).unwrap();
        assert_eq!(mesh.colors, vec![[0.1, 0.2, 0.3]]);
    }

    #[test]
    fn test_errors_report_line() {
        let text = "point [\n0 0 0,\n1 x 0\n]";
        assert!(matches!(parse(text), Err(CosmoError::Parse { line: 3, .. })));

        let text = "point [ 0 0 0 ]\ncoordIndex [ 0 0 7 -1 ]";
        assert!(matches!(parse(text), Err(CosmoError::Parse { line: 2, .. })));

        let text = "point [ 0 0 0";
        assert!(matches!(parse(text), Err(CosmoError::Parse { line: 1, .. })));
    }
}
