//! Drawing a [`Figure`] with plotters and writing it to disk
//!
//! The polar axes are drawn by hand on an equal-aspect cartesian chart.
//! PNG needs the `bitmap` feature (on by default) for font rasterisation;
//! PDF pages are drawn by [`crate::pdf`].

use std::fs;
use std::path::{Path, PathBuf};

use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::Color as _;
use tracing::info;

use crate::error::RenderError;
use crate::figure::{Color, Element, Figure, InfoBox};
use crate::geometry::{plot_angle, PolarPoint};

/// Default directory receiving the figure files
pub const DEFAULT_OUTPUT_DIR: &str = "figs";
/// File stem shared by every output format
pub const OUTPUT_STEM: &str = "KURRI_layout";
/// Files written by a plain save: raster then vector
pub const DEFAULT_FORMATS: [OutputFormat; 2] = [OutputFormat::Png, OutputFormat::Pdf];

const FONT: &str = "sans-serif";
const TITLE_SIZE: f64 = 24.0;
const TICK_SIZE: f64 = 13.0;
const BOX_TEXT_SIZE: f64 = 14.0;
/// Fraction of r_max left around the sector for tick labels
pub(crate) const FRAME_PAD: f64 = 0.08;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Png,
    Pdf,
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Svg => "svg",
        }
    }

    /// Whether this build can write the format
    pub fn available(&self) -> bool {
        match self {
            OutputFormat::Png => cfg!(feature = "bitmap"),
            OutputFormat::Pdf | OutputFormat::Svg => true,
        }
    }
}

impl From<Color> for RGBColor {
    fn from(c: Color) -> Self {
        RGBColor(c.r, c.g, c.b)
    }
}

fn backend_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Backend(err.to_string())
}

/// Write `fig` into `dir` once per format; the directory must already exist
///
/// A format this build cannot write is an error, not a skip.
pub fn save_figure(
    fig: &Figure,
    size: (u32, u32),
    dir: &Path,
    formats: &[OutputFormat],
) -> Result<Vec<PathBuf>, RenderError> {
    if !dir.is_dir() {
        return Err(RenderError::MissingOutputDir(dir.to_path_buf()));
    }
    if let Some(format) = formats.iter().find(|f| !f.available()) {
        return Err(RenderError::FormatUnavailable(format.extension()));
    }

    let mut written = Vec::with_capacity(formats.len());
    for format in formats {
        let path = dir.join(format!("{}.{}", OUTPUT_STEM, format.extension()));
        match format {
            OutputFormat::Svg => {
                let root = SVGBackend::new(&path, size).into_drawing_area();
                draw_figure(fig, &root)?;
                root.present().map_err(backend_err)?;
            }
            #[cfg(feature = "bitmap")]
            OutputFormat::Png => {
                let root = BitMapBackend::new(&path, size).into_drawing_area();
                draw_figure(fig, &root)?;
                root.present().map_err(backend_err)?;
            }
            #[cfg(not(feature = "bitmap"))]
            OutputFormat::Png => return Err(RenderError::FormatUnavailable("png")),
            OutputFormat::Pdf => {
                let bytes = crate::pdf::figure_to_pdf(fig, size)?;
                fs::write(&path, bytes).map_err(|source| RenderError::Io {
                    path: path.clone(),
                    source,
                })?;
            }
        }
        info!("Wrote {:?}", path);
        written.push(path);
    }
    Ok(written)
}

/// Render `fig` to an SVG document in memory
pub fn figure_to_svg(fig: &Figure, size: (u32, u32)) -> Result<String, RenderError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_figure(fig, &root)?;
        root.present().map_err(backend_err)?;
    }
    Ok(svg)
}

/// Data ranges matching a target area at equal x/y scale
///
/// Returns (x_range, y_range, data units per target unit).
pub fn fit_aspect(
    bounds: (f64, f64, f64, f64),
    area: (f64, f64),
) -> ((f64, f64), (f64, f64), f64) {
    let (x0, x1, y0, y1) = bounds;
    let (pw, ph) = (area.0.max(1.0), area.1.max(1.0));
    let scale = ((x1 - x0) / pw).max((y1 - y0) / ph);
    let (cx, cy) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);
    let (hw, hh) = (pw * scale / 2.0, ph * scale / 2.0);
    ((cx - hw, cx + hw), (cy - hh, cy + hh), scale)
}

pub(crate) fn xy(p: &PolarPoint) -> (f64, f64) {
    let c = p.to_cartesian();
    (c.x, c.y)
}

/// Draw every part of `fig` onto `root`
pub fn draw_figure<DB: DrawingBackend>(
    fig: &Figure,
    root: &DrawingArea<DB, Shift>,
) -> Result<(), RenderError> {
    root.fill(&WHITE).map_err(backend_err)?;
    let area = root
        .titled(&fig.title, (FONT, TITLE_SIZE))
        .map_err(backend_err)?
        .margin(10, 10, 10, 10);

    let (x0, x1, y0, y1) = fig.axes.cartesian_bounds();
    let pad = fig.axes.r_max * FRAME_PAD;
    let (pw, ph) = area.dim_in_pixel();
    let ((xa, xb), (ya, yb), per_pixel) = fit_aspect(
        (x0 - pad, x1 + pad, y0 - pad, y1 + pad),
        (f64::from(pw), f64::from(ph)),
    );

    let mut chart = ChartBuilder::on(&area)
        .build_cartesian_2d(xa..xb, ya..yb)
        .map_err(backend_err)?;

    // Polar frame: theta gridlines with tick labels, then the sector edge
    let axes = &fig.axes;
    let grid: RGBColor = Color::LIGHT_GREY.into();
    for &tick in &axes.theta_ticks {
        let edge = PolarPoint::from_degrees(axes.r_max, tick);
        chart
            .draw_series(std::iter::once(PathElement::new(
                vec![(0.0, 0.0), xy(&edge)],
                grid.stroke_width(1),
            )))
            .map_err(backend_err)?;
        let at = PolarPoint::new(axes.r_max * (1.0 + FRAME_PAD / 2.0), plot_angle(tick));
        chart
            .draw_series(std::iter::once(Text::new(
                format!("{}°", tick),
                xy(&at),
                (FONT, TICK_SIZE).into_font().color(&BLACK),
            )))
            .map_err(backend_err)?;
    }
    let frame: Vec<(f64, f64)> = std::iter::once((0.0, 0.0))
        .chain((0..=100u32).map(|i| {
            let theta = axes.theta_min + (axes.theta_max - axes.theta_min) * f64::from(i) / 100.0;
            xy(&PolarPoint::new(axes.r_max, theta.to_radians()))
        }))
        .chain(std::iter::once((0.0, 0.0)))
        .collect();
    chart
        .draw_series(std::iter::once(PathElement::new(frame, BLACK.stroke_width(1))))
        .map_err(backend_err)?;

    for element in &fig.elements {
        match element {
            Element::Fill {
                outline,
                color,
                alpha,
            } => {
                let color: RGBColor = (*color).into();
                chart
                    .draw_series(std::iter::once(Polygon::new(
                        outline.iter().map(xy).collect::<Vec<_>>(),
                        color.mix(*alpha).filled(),
                    )))
                    .map_err(backend_err)?;
            }
            Element::Line {
                points,
                style,
                legend,
            } => {
                let color: RGBColor = style.color.into();
                let width = style.width.round().max(1.0) as u32;
                let series = chart
                    .draw_series(std::iter::once(PathElement::new(
                        points.iter().map(xy).collect::<Vec<_>>(),
                        color.stroke_width(width),
                    )))
                    .map_err(backend_err)?;
                if let Some(label) = legend {
                    series.label(label.as_str()).legend(move |(x, y)| {
                        Rectangle::new([(x, y - 5), (x + 20, y + 5)], color.mix(0.5).filled())
                    });
                }
            }
            Element::Label { at, text, size } => {
                chart
                    .draw_series(std::iter::once(Text::new(
                        text.clone(),
                        xy(at),
                        (FONT, *size).into_font().color(&BLACK),
                    )))
                    .map_err(backend_err)?;
            }
        }
    }

    let data = ((xa, xb), (ya, yb));
    for info in &fig.boxes {
        draw_info_box(&mut chart, info, data, per_pixel)?;
    }

    if let Some(legend) = &fig.legend {
        let px = (legend.anchor.0 * f64::from(pw)).round() as i32;
        let py = ((1.0 - legend.anchor.1) * f64::from(ph)).round() as i32;
        let background: RGBColor = legend.background.into();
        let border: RGBColor = legend.border.into();
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::Coordinate(px, py))
            .background_style(background)
            .border_style(border)
            .label_font((FONT, BOX_TEXT_SIZE))
            .draw()
            .map_err(backend_err)?;
    }

    Ok(())
}

type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Boxed symbol/value table sized from its text
fn draw_info_box<DB: DrawingBackend>(
    chart: &mut Chart<'_, DB>,
    info: &InfoBox,
    data: ((f64, f64), (f64, f64)),
    per_pixel: f64,
) -> Result<(), RenderError> {
    let ((xa, xb), (ya, yb)) = data;
    let char_w = BOX_TEXT_SIZE * 0.6 * per_pixel;
    let line_h = BOX_TEXT_SIZE * 1.5 * per_pixel;
    let pad = BOX_TEXT_SIZE * 0.5 * per_pixel;

    let symbol_chars = info.rows.iter().map(|(s, _)| s.chars().count()).max().unwrap_or(0);
    let value_chars = info.rows.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0);
    let symbol_w = (symbol_chars + 1) as f64 * char_w;
    let width = symbol_w + value_chars as f64 * char_w + 2.0 * pad;
    let height = info.rows.len() as f64 * line_h + 2.0 * pad;

    let anchor_x = xa + info.anchor.0 * (xb - xa);
    let anchor_y = ya + info.anchor.1 * (yb - ya);
    let left = anchor_x - info.alignment.0 * width;
    let bottom = anchor_y - info.alignment.1 * height;
    let top = bottom + height;

    let background: RGBColor = info.background.into();
    chart
        .draw_series([
            Rectangle::new([(left, top), (left + width, bottom)], background.filled()),
            Rectangle::new([(left, top), (left + width, bottom)], BLACK.stroke_width(1)),
        ])
        .map_err(backend_err)?;

    let font = (FONT, BOX_TEXT_SIZE).into_font().color(&BLACK);
    let mut texts = Vec::with_capacity(info.rows.len() * 2);
    for (i, (symbol, value)) in info.rows.iter().enumerate() {
        let y = top - pad - i as f64 * line_h;
        texts.push(Text::new(symbol.clone(), (left + pad, y), font.clone()));
        texts.push(Text::new(value.clone(), (left + pad + symbol_w, y), font.clone()));
    }
    chart.draw_series(texts).map_err(backend_err)?;
    Ok(())
}
