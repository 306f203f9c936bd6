//! Command line arguments.
//!
//! Column offsets are resolved in three layers: built-in defaults, then an
//! optional `--preset` file, then individual flags.

use std::path::PathBuf;

use clap::Parser;
use csvmesh_core::convert::default_output_path;
use csvmesh_core::fbx::FbxFormat;
use csvmesh_core::preset::{ColumnPreset, load_preset};
use csvmesh_core::{ColumnOffsets, ConvertOptions, TrailingRowPolicy};

use crate::error::AppError;

/// csv2fbx command line arguments.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "csv2fbx",
    about = "Convert a CSV vertex table into an FBX mesh",
    long_about = "Convert a CSV vertex table into an FBX mesh.\n\n\
        The first line of the input is a header and is skipped. Every other line\n\
        is one vertex; each run of three rows forms a triangle.\n\
        \n\
        DEFAULT COLUMNS (zero-based):\n\
          0      vertex id\n\
          2..5   position x, y, z\n\
          5..8   normal x, y, z\n\
          8..10  uv0 u, v\n\
        \n\
        EXAMPLES:\n\
          # ASCII FBX next to the input\n\
          csv2fbx capture.csv\n\
        \n\
          # Binary output with a second UV channel and vertex colors\n\
          csv2fbx capture.csv -o mesh.fbx --binary --uv1-column 10 --color-column 12\n\
        \n\
          # Column layout from a preset, with one override\n\
          csv2fbx capture.csv --preset layout.toml --no-normal",
    version
)]
pub struct CliArgs {
    /// Input CSV file.
    pub input: PathBuf,

    /// Output FBX file. Defaults to the input path with an .fbx extension.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// TOML preset with [columns] and [output] tables.
    #[arg(long, value_name = "FILE")]
    pub preset: Option<PathBuf>,

    /// Column holding the vertex id.
    #[arg(long, value_name = "COL", conflicts_with = "no_vertex_id")]
    pub vertex_id_column: Option<usize>,

    /// Clear the vertex id column.
    #[arg(long)]
    pub no_vertex_id: bool,

    /// First of the three position columns.
    #[arg(long, value_name = "COL")]
    pub position_column: Option<usize>,

    /// First of the three normal columns.
    #[arg(long, value_name = "COL", conflicts_with = "no_normal")]
    pub normal_column: Option<usize>,

    /// Do not export normals.
    #[arg(long)]
    pub no_normal: bool,

    /// First of the two uv0 columns.
    #[arg(long, value_name = "COL", conflicts_with = "no_uv0")]
    pub uv0_column: Option<usize>,

    /// Do not export the first UV channel.
    #[arg(long)]
    pub no_uv0: bool,

    /// First of the two uv1 columns.
    #[arg(long, value_name = "COL", conflicts_with = "no_uv1")]
    pub uv1_column: Option<usize>,

    /// Do not export the second UV channel.
    #[arg(long)]
    pub no_uv1: bool,

    /// First of the three tangent columns.
    #[arg(long, value_name = "COL", conflicts_with = "no_tangent")]
    pub tangent_column: Option<usize>,

    /// Do not export tangents.
    #[arg(long)]
    pub no_tangent: bool,

    /// First of the RGB[A] color columns. Alpha defaults to 1 when absent.
    #[arg(long, value_name = "COL", conflicts_with = "no_color")]
    pub color_column: Option<usize>,

    /// Do not export vertex colors.
    #[arg(long)]
    pub no_color: bool,

    /// Write binary FBX.
    #[arg(long, conflicts_with = "ascii")]
    pub binary: bool,

    /// Write ASCII FBX (the default unless a preset says otherwise).
    #[arg(long)]
    pub ascii: bool,

    /// Fail when the row count is not a multiple of three.
    #[arg(long)]
    pub strict_triangles: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

impl CliArgs {
    /// Default log filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Resolve the conversion options, loading the preset if one was given.
    pub fn into_options(self) -> Result<ConvertOptions, AppError> {
        let preset = match &self.preset {
            Some(path) => Some(load_preset(path)?),
            None => None,
        };
        Ok(self.resolve(preset.as_ref()))
    }

    fn resolve(self, preset: Option<&ColumnPreset>) -> ConvertOptions {
        let mut columns = preset.map_or_else(ColumnOffsets::default, ColumnPreset::columns);
        let mut format = preset.map_or(FbxFormat::default(), ColumnPreset::format);
        let mut trailing_rows = preset.map_or(TrailingRowPolicy::default(), ColumnPreset::trailing_rows);

        override_column(&mut columns.vertex_id, self.vertex_id_column, self.no_vertex_id);
        if let Some(column) = self.position_column {
            columns.position = column;
        }
        override_column(&mut columns.normal, self.normal_column, self.no_normal);
        override_column(&mut columns.uv0, self.uv0_column, self.no_uv0);
        override_column(&mut columns.uv1, self.uv1_column, self.no_uv1);
        override_column(&mut columns.tangent, self.tangent_column, self.no_tangent);
        override_column(&mut columns.color, self.color_column, self.no_color);

        if self.binary {
            format = FbxFormat::Binary;
        } else if self.ascii {
            format = FbxFormat::Ascii;
        }
        if self.strict_triangles {
            trailing_rows = TrailingRowPolicy::Reject;
        }

        let output = self
            .output
            .unwrap_or_else(|| default_output_path(&self.input));
        ConvertOptions::new(self.input, output)
            .with_columns(columns)
            .with_format(format)
            .with_trailing_rows(trailing_rows)
    }
}

fn override_column(slot: &mut Option<usize>, column: Option<usize>, disable: bool) {
    if disable {
        *slot = None;
    } else if column.is_some() {
        *slot = column;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parse(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("csv2fbx").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults() {
        let options = parse(&["data/mesh.csv"]).resolve(None);

        assert_eq!(options.input, PathBuf::from("data/mesh.csv"));
        assert_eq!(options.output, PathBuf::from("data/mesh.fbx"));
        assert_eq!(options.columns, ColumnOffsets::default());
        assert_eq!(options.format, FbxFormat::Ascii);
        assert_eq!(options.trailing_rows, TrailingRowPolicy::Warn);
    }

    #[test]
    fn column_flags() {
        let options = parse(&[
            "in.csv",
            "-o",
            "out.fbx",
            "--position-column",
            "1",
            "--no-normal",
            "--uv1-column",
            "10",
            "--tangent-column",
            "12",
            "--color-column",
            "15",
            "--no-vertex-id",
            "--binary",
            "--strict-triangles",
        ])
        .resolve(None);

        assert_eq!(options.output, PathBuf::from("out.fbx"));
        assert_eq!(
            options.columns,
            ColumnOffsets {
                vertex_id: None,
                position: 1,
                normal: None,
                uv0: Some(8),
                uv1: Some(10),
                tangent: Some(12),
                color: Some(15),
            }
        );
        assert_eq!(options.format, FbxFormat::Binary);
        assert_eq!(options.trailing_rows, TrailingRowPolicy::Reject);
    }

    #[test]
    fn flags_override_preset() {
        let preset = ColumnPreset::from_toml_str(
            "[columns]\nposition = 0\nnormal = 3\nuv0 = 6\n[output]\nascii = false\n",
        )
        .unwrap();

        let from_preset = parse(&["in.csv"]).resolve(Some(&preset));
        assert_eq!(from_preset.columns.position, 0);
        assert_eq!(from_preset.columns.vertex_id, None);
        assert_eq!(from_preset.format, FbxFormat::Binary);

        let overridden = parse(&["in.csv", "--normal-column", "9", "--no-uv0", "--ascii"])
            .resolve(Some(&preset));
        assert_eq!(overridden.columns.normal, Some(9));
        assert_eq!(overridden.columns.uv0, None);
        assert_eq!(overridden.format, FbxFormat::Ascii);
    }

    #[test]
    fn disable_flags_clear_preset_layers() {
        let preset = ColumnPreset::from_toml_str(
            "[columns]\nposition = 0\nuv1 = 3\ntangent = 5\ncolor = 8\n",
        )
        .unwrap();

        let kept = parse(&["in.csv"]).resolve(Some(&preset));
        assert_eq!(kept.columns.uv1, Some(3));
        assert_eq!(kept.columns.tangent, Some(5));
        assert_eq!(kept.columns.color, Some(8));

        let cleared = parse(&["in.csv", "--no-uv1", "--no-tangent", "--no-color"])
            .resolve(Some(&preset));
        assert_eq!(cleared.columns.uv1, None);
        assert_eq!(cleared.columns.tangent, None);
        assert_eq!(cleared.columns.color, None);
        assert_eq!(cleared.columns.position, 0);
    }

    #[rstest]
    #[case(&["--normal-column", "5", "--no-normal"])]
    #[case(&["--uv0-column", "8", "--no-uv0"])]
    #[case(&["--uv1-column", "10", "--no-uv1"])]
    #[case(&["--tangent-column", "12", "--no-tangent"])]
    #[case(&["--color-column", "15", "--no-color"])]
    #[case(&["--binary", "--ascii"])]
    #[case(&["-v", "-q"])]
    fn conflicting_flags_rejected(#[case] flags: &[&str]) {
        let args = std::iter::once("csv2fbx")
            .chain(std::iter::once("in.csv"))
            .chain(flags.iter().copied());
        assert!(CliArgs::try_parse_from(args).is_err());
    }

    #[test]
    fn missing_input_rejected() {
        assert!(CliArgs::try_parse_from(["csv2fbx"]).is_err());
    }

    #[rstest]
    #[case(&[], "info")]
    #[case(&["-v"], "debug")]
    #[case(&["-vv"], "trace")]
    #[case(&["-q"], "error")]
    fn log_filter(#[case] flags: &[&str], #[case] expected: &str) {
        let mut args = vec!["in.csv"];
        args.extend_from_slice(flags);
        assert_eq!(parse(&args).log_filter(), expected);
    }

    #[test]
    fn missing_preset_is_error() {
        let err = parse(&["in.csv", "--preset", "/nonexistent/layout.toml"])
            .into_options()
            .unwrap_err();
        assert!(matches!(err, AppError::Preset(_)));
    }
}
