//! ffa-cell: FFA lattice cell parameters and layout diagram
//!
//! This crate provides:
//! - The default parameter set of one FFA cell (angles, fields, radii),
//!   with JSON read/write
//! - The field-map directory lookup from `settings.json`
//! - A polar diagram of the cell's magnet layout, written as PNG and PDF
//!   (SVG on request)
//!
//! Angles are in degrees, distances in cm and fields in T unless noted.

pub mod cell;
pub mod error;
pub mod figure;
pub mod geometry;
pub mod params;
pub mod pdf;
pub mod render;
pub mod report;
pub mod settings;

pub use cell::{plot_cell, CellLayout, DiagramStyle, MagnetKind, MagnetPlacement};
pub use error::{LatticeError, RenderError};
pub use figure::{Color, Element, Figure, PolarAxes};
pub use geometry::{sample_segment, wedge, PolarPoint};
pub use params::{default_params, CellAngles, LatticeParams, LengthUnit, ParamValue};
pub use pdf::figure_to_pdf;
pub use render::{save_figure, OutputFormat, DEFAULT_FORMATS};
pub use report::layout_report;
pub use settings::{fieldmap_dir, fieldmap_dir_from};

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

/// What to do with the finished diagram
#[derive(Debug, Clone)]
pub struct DiagramConfig {
    pub style: DiagramStyle,
    /// Directory receiving the figure files; never created
    pub output_dir: PathBuf,
    /// Write the figure files
    pub save: bool,
    /// Print the layout report to stdout
    pub show: bool,
    pub formats: Vec<OutputFormat>,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            style: DiagramStyle::default(),
            output_dir: PathBuf::from(render::DEFAULT_OUTPUT_DIR),
            save: true,
            show: true,
            formats: DEFAULT_FORMATS.to_vec(),
        }
    }
}

/// Main entry point: build the cell diagram, then save and/or show it
///
/// Returns the figure and the files written.
pub fn make_diagram(params: &LatticeParams, config: &DiagramConfig) -> Result<(Figure, Vec<PathBuf>)> {
    let figure = plot_cell(params, &config.style);
    info!(
        "Built diagram of '{}' with {} elements",
        params.name,
        figure.elements.len()
    );

    let written = if config.save {
        save_figure(&figure, config.style.size, &config.output_dir, &config.formats)
            .with_context(|| format!("Failed to save figure to {:?}", config.output_dir))?
    } else {
        Vec::new()
    };

    if config.show {
        let layout = CellLayout::new(params.angles());
        let report = layout_report(params, &layout).context("Failed to render layout report")?;
        println!("{}", report);
    }

    Ok((figure, written))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_diagram_without_output() {
        let config = DiagramConfig {
            save: false,
            show: false,
            ..DiagramConfig::default()
        };
        let (figure, written) = make_diagram(&default_params(), &config).unwrap();
        assert_eq!(figure.fill_count(), 3);
        assert!(written.is_empty());
    }

    #[test]
    fn test_make_diagram_saves_into_existing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = DiagramConfig {
            output_dir: dir.path().to_path_buf(),
            show: false,
            formats: vec![OutputFormat::Svg],
            ..DiagramConfig::default()
        };
        let (_, written) = make_diagram(&default_params(), &config).unwrap();
        assert_eq!(written.len(), 1);
        assert!(written[0].exists());
    }

    #[test]
    fn test_make_diagram_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = DiagramConfig {
            output_dir: dir.path().join("figs"),
            show: false,
            formats: vec![OutputFormat::Svg],
            ..DiagramConfig::default()
        };
        let err = make_diagram(&default_params(), &config).unwrap_err();
        assert!(err.to_string().contains("Failed to save figure"));
        assert!(err.downcast_ref::<RenderError>().is_some());
    }

    #[cfg(feature = "bitmap")]
    #[test]
    fn test_default_config_writes_png_and_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let config = DiagramConfig {
            output_dir: dir.path().to_path_buf(),
            show: false,
            ..DiagramConfig::default()
        };
        let (_, written) = make_diagram(&default_params(), &config).unwrap();
        assert_eq!(
            written,
            vec![
                dir.path().join("KURRI_layout.png"),
                dir.path().join("KURRI_layout.pdf"),
            ]
        );
        assert!(written.iter().all(|p| p.exists()));
    }
}
