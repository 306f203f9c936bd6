//! CSV to FBX conversion pipeline.
//!
//! [`convert`] runs the whole pipeline once:
//!
//! 1. read the table, skipping the header line
//! 2. reject an empty data section
//! 3. build positions and triangle topology
//! 4. build the optional UV0, normal, tangent, color and UV1 layers
//! 5. serialize the document and write the output file
//!
//! Any failure aborts the conversion before the output file is created.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fbx::{self, ExportError, FbxFormat};
use crate::mesh::{self, MeshBuffer, MeshError};
use crate::table::{Row, TableError, TableReader};
use crate::task::{CancellationToken, Cancelled};

/// Zero-based start columns for each attribute group.
///
/// `None` disables an optional attribute. Position is always read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnOffsets {
    /// Vertex id column; carried as configuration, never read or emitted.
    pub vertex_id: Option<usize>,
    /// X, Y, Z start column.
    pub position: usize,
    /// Normal X, Y, Z start column.
    pub normal: Option<usize>,
    /// First UV channel U, V start column.
    pub uv0: Option<usize>,
    /// Second UV channel U, V start column.
    pub uv1: Option<usize>,
    /// Tangent X, Y, Z start column.
    pub tangent: Option<usize>,
    /// Color R, G, B[, A] start column.
    pub color: Option<usize>,
}

impl Default for ColumnOffsets {
    fn default() -> Self {
        Self {
            vertex_id: Some(0),
            position: 2,
            normal: Some(5),
            uv0: Some(8),
            uv1: None,
            tangent: None,
            color: None,
        }
    }
}

/// What to do when the row count is not a multiple of three.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingRowPolicy {
    /// Drop the trailing rows from topology and log a warning.
    #[default]
    Warn,
    /// Fail the conversion.
    Reject,
}

/// Immutable parameters of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub columns: ColumnOffsets,
    pub format: FbxFormat,
    pub trailing_rows: TrailingRowPolicy,
}

impl ConvertOptions {
    /// Create options with the default column layout and ASCII output.
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            columns: ColumnOffsets::default(),
            format: FbxFormat::default(),
            trailing_rows: TrailingRowPolicy::default(),
        }
    }

    /// Set the column layout.
    pub fn with_columns(mut self, columns: ColumnOffsets) -> Self {
        self.columns = columns;
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: FbxFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the trailing row policy.
    pub fn with_trailing_rows(mut self, policy: TrailingRowPolicy) -> Self {
        self.trailing_rows = policy;
        self
    }
}

/// Output path used when none is given: the input path with an `.fbx`
/// extension.
pub fn default_output_path(input: &Path) -> PathBuf {
    input.with_extension("fbx")
}

/// Mesh name derived from the input file stem.
pub fn mesh_name(input: &Path) -> String {
    input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_owned())
}

/// Summary of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub output: PathBuf,
    pub vertex_count: usize,
    pub triangle_count: usize,
    pub dropped_rows: usize,
    pub uv_channels: usize,
    pub bytes_written: usize,
}

/// Errors that abort a conversion.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input could not be read.
    #[error(transparent)]
    Table(#[from] TableError),
    /// The input has a header but no data rows.
    #[error("{} has no data rows", path.display())]
    EmptyInput { path: PathBuf },
    /// A row does not satisfy the configured column layout.
    #[error(transparent)]
    Mesh(#[from] MeshError),
    /// The output could not be written.
    #[error(transparent)]
    Export(#[from] ExportError),
    /// The conversion was cancelled before completing.
    #[error(transparent)]
    Cancelled(#[from] Cancelled),
    /// The background worker panicked.
    #[error("conversion worker panicked: {0}")]
    WorkerPanicked(String),
}

/// Run one conversion.
pub fn convert(options: &ConvertOptions) -> Result<ConversionReport, ConvertError> {
    convert_with_cancel(options, &CancellationToken::new())
}

/// Run one conversion, checking `token` between stages.
pub fn convert_with_cancel(
    options: &ConvertOptions,
    token: &CancellationToken,
) -> Result<ConversionReport, ConvertError> {
    token.check()?;
    log::info!("Reading CSV file: {}", options.input.display());
    let rows = TableReader::new().read_file(&options.input)?;
    if rows.is_empty() {
        return Err(ConvertError::EmptyInput {
            path: options.input.clone(),
        });
    }

    log::info!("Processing {} vertices", rows.len());
    let mesh = build_mesh(
        &rows,
        mesh_name(&options.input),
        &options.columns,
        options.trailing_rows,
        token,
    )?;
    drop(rows);

    token.check()?;
    log::info!("Saving FBX file: {}", options.output.display());
    let doc = fbx::build_document(&mesh);
    let bytes_written = fbx::save(&options.output, &doc, options.format)?;

    let report = ConversionReport {
        output: options.output.clone(),
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        dropped_rows: mesh.dropped_rows,
        uv_channels: mesh.uv_channels.len(),
        bytes_written,
    };
    log::info!(
        "Conversion completed: {} vertices, {} triangles",
        report.vertex_count,
        report.triangle_count
    );
    Ok(report)
}

/// Map table rows onto a mesh buffer.
pub fn build_mesh(
    rows: &[Row],
    name: impl Into<String>,
    columns: &ColumnOffsets,
    trailing_rows: TrailingRowPolicy,
    token: &CancellationToken,
) -> Result<MeshBuffer, ConvertError> {
    let mut buffer = MeshBuffer::new(name);

    if let Some(column) = columns.vertex_id {
        log::debug!("vertex ids in column {column} are not exported");
    }

    buffer.control_points = mesh::build_positions(rows, columns.position)?;

    let topology = mesh::build_triangles(rows.len())?;
    if topology.dropped_rows > 0 {
        match trailing_rows {
            TrailingRowPolicy::Warn => log::warn!(
                "{} rows is not a multiple of 3; the last {} rows are not part of any triangle",
                rows.len(),
                topology.dropped_rows
            ),
            TrailingRowPolicy::Reject => {
                return Err(MeshError::IncompleteTriangle {
                    rows: rows.len(),
                    remainder: topology.dropped_rows,
                }
                .into());
            }
        }
    }
    buffer.triangles = topology.triangles;
    buffer.dropped_rows = topology.dropped_rows;
    token.check()?;

    if let Some(column) = columns.uv0 {
        buffer.add_uv_channel(mesh::build_uv(rows, column, 0, mesh::uv_channel_name(0))?);
        log::debug!("uv0 from column {column}");
    }
    if let Some(column) = columns.normal {
        buffer.set_normals(mesh::build_normals(rows, column)?);
        log::debug!("normals from column {column}");
    }
    token.check()?;

    if let Some(column) = columns.tangent {
        buffer.tangents = Some(mesh::build_tangents(rows, column)?);
        log::debug!("tangents from column {column}");
    }
    if let Some(column) = columns.color {
        buffer.colors = Some(mesh::build_vertex_colors(rows, column)?);
        log::debug!("vertex colors from column {column}");
    }
    if let Some(column) = columns.uv1 {
        buffer.add_uv_channel(mesh::build_uv(rows, column, 1, mesh::uv_channel_name(1))?);
        log::debug!("uv1 from column {column}");
    }

    Ok(buffer)
}

/// Run one conversion and report only success or failure.
///
/// Failures are logged with their full error chain.
pub fn convert_logged(options: &ConvertOptions) -> bool {
    match convert(options) {
        Ok(_) => true,
        Err(err) => {
            log::error!("Error converting CSV to FBX: {}", error_chain(&err));
            false
        }
    }
}

/// Format an error followed by each of its sources.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
