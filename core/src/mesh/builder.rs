//! Column-range to attribute-buffer mapping.
//!
//! Every builder reads one row per vertex. Required ranges fail loudly on a
//! short or non-numeric row; the only tolerated gap is a missing alpha in
//! [`build_vertex_colors`].

use crate::table::{FieldError, Row};

use super::buffer::{LayerElement, UvChannel};
use super::error::{Attribute, MeshError};

/// Largest control point index that fits a polygon vertex index.
const MAX_VERTICES: usize = i32::MAX as usize;

/// Triangle topology derived from a row count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangulation {
    /// Index triples `(3i, 3i+1, 3i+2)`.
    pub triangles: Vec<[u32; 3]>,
    /// Trailing rows that did not complete a triangle.
    pub dropped_rows: usize,
}

/// Name of a UV channel by index.
pub fn uv_channel_name(channel: u32) -> String {
    format!("uv{channel}")
}

/// Read a fixed-width numeric range from every row.
fn read_range<const N: usize>(
    rows: &[Row],
    start: usize,
    attribute: Attribute,
) -> Result<Vec<[f64; N]>, MeshError> {
    rows.iter()
        .enumerate()
        .map(|(row, r)| {
            r.numbers::<N>(start)
                .map_err(|source| field_error(row, r, attribute, source))
        })
        .collect()
}

fn field_error(row: usize, r: &Row, attribute: Attribute, source: FieldError) -> MeshError {
    MeshError::Field {
        row,
        line: r.line(),
        attribute,
        source,
    }
}

/// Read X, Y, Z from `start..start + 3` of every row.
pub fn build_positions(rows: &[Row], start: usize) -> Result<Vec<[f64; 3]>, MeshError> {
    read_range::<3>(rows, start, Attribute::Position)
}

/// Group rows into consecutive triangles.
///
/// Uses floor division: `row_count % 3` trailing rows are reported in
/// [`Triangulation::dropped_rows`] and left out of the topology.
pub fn build_triangles(row_count: usize) -> Result<Triangulation, MeshError> {
    if row_count > MAX_VERTICES {
        return Err(MeshError::TooManyVertices {
            rows: row_count,
            max: MAX_VERTICES,
        });
    }

    let triangles = (0..(row_count / 3) as u32)
        .map(|i| [i * 3, i * 3 + 1, i * 3 + 2])
        .collect();

    Ok(Triangulation {
        triangles,
        dropped_rows: row_count % 3,
    })
}

/// Read U, V from `start..start + 2` of every row into a named channel.
///
/// The channel maps by polygon vertex through an identity index array, one
/// entry per row; coordinates are not welded.
pub fn build_uv(
    rows: &[Row],
    start: usize,
    channel: u32,
    name: impl Into<String>,
) -> Result<UvChannel, MeshError> {
    let coords = read_range::<2>(rows, start, Attribute::Uv(channel))?;
    Ok(UvChannel {
        channel,
        element: LayerElement::by_polygon_vertex_identity(name, coords),
    })
}

/// Read per-control-point normals from `start..start + 3`.
pub fn build_normals(rows: &[Row], start: usize) -> Result<LayerElement<[f64; 3]>, MeshError> {
    let normals = read_range::<3>(rows, start, Attribute::Normal)?;
    Ok(LayerElement::by_control_point(normals))
}

/// Read per-control-point tangents from `start..start + 3`.
///
/// The handedness component is always `1.0`.
pub fn build_tangents(rows: &[Row], start: usize) -> Result<LayerElement<[f64; 4]>, MeshError> {
    let tangents = read_range::<3>(rows, start, Attribute::Tangent)?
        .into_iter()
        .map(|[x, y, z]| [x, y, z, 1.0])
        .collect();
    Ok(LayerElement::by_control_point(tangents))
}

/// Read per-control-point RGBA colors from `start..start + 4`.
///
/// R, G, B are required. Rows that end before the alpha column get an alpha
/// of `1.0`; a present but non-numeric alpha is an error.
pub fn build_vertex_colors(
    rows: &[Row],
    start: usize,
) -> Result<LayerElement<[f64; 4]>, MeshError> {
    let colors = rows
        .iter()
        .enumerate()
        .map(|(row, r)| {
            let [red, green, blue] = r
                .numbers::<3>(start)
                .map_err(|source| field_error(row, r, Attribute::Color, source))?;
            let alpha = if r.len() > start + 3 {
                r.number(start + 3)
                    .map_err(|source| field_error(row, r, Attribute::Color, source))?
            } else {
                1.0
            };
            Ok([red, green, blue, alpha])
        })
        .collect::<Result<Vec<_>, MeshError>>()?;
    Ok(LayerElement::by_control_point(colors))
}
