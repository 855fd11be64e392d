//! Vector output: a [`Figure`] drawn onto a single PDF page
//!
//! Uses the same equal-aspect frame as the plotters renderer, measured in
//! millimetres instead of pixels. Text uses the built-in Helvetica face,
//! with Greek letters switched to the built-in Symbol face.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Polygon, Rgb,
};

use crate::error::RenderError;
use crate::figure::{Color, Element, Figure, InfoBox};
use crate::geometry::{plot_angle, PolarPoint};
use crate::render::{fit_aspect, xy, FRAME_PAD};

/// Page millimetres per figure pixel (96 dpi)
const MM_PER_PX: f64 = 25.4 / 96.0;
/// Points per figure pixel (96 dpi)
const PT_PER_PX: f64 = 72.0 / 96.0;
const MM_PER_PT: f64 = 25.4 / 72.0;

const MARGIN_PX: f64 = 10.0;
const TITLE_SIZE: f64 = 24.0;
const TICK_SIZE: f64 = 13.0;
const BOX_TEXT_SIZE: f64 = 14.0;
/// Average glyph advance as a fraction of the font size
const CHAR_WIDTH: f64 = 0.6;

fn pdf_err(err: impl std::fmt::Display) -> RenderError {
    RenderError::Backend(err.to_string())
}

/// Split `text` into runs of (uses Symbol face, encoded text)
///
/// Greek letters become their Symbol-face codes; anything outside Latin-1
/// is replaced by `?` since the built-in faces cannot show it.
pub fn pdf_runs(text: &str) -> Vec<(bool, String)> {
    let mut runs: Vec<(bool, String)> = Vec::new();
    for ch in text.chars() {
        let (symbol, mapped) = match ch {
            'θ' => (true, 'q'),
            'π' => (true, 'p'),
            'Δ' => (true, 'D'),
            c if u32::from(c) < 0x100 => (false, c),
            _ => (false, '?'),
        };
        match runs.last_mut() {
            Some((face, run)) if *face == symbol => run.push(mapped),
            _ => runs.push((symbol, mapped.to_string())),
        }
    }
    runs
}

fn rgb(c: Color) -> printpdf::Color {
    printpdf::Color::Rgb(Rgb::new(
        f32::from(c.r) / 255.0,
        f32::from(c.g) / 255.0,
        f32::from(c.b) / 255.0,
        None,
    ))
}

/// Colour seen through `alpha` over a white page
fn over_white(c: Color, alpha: f64) -> Color {
    let blend = |v: u8| (255.0 - (255.0 - f64::from(v)) * alpha.clamp(0.0, 1.0)).round() as u8;
    Color::rgb(blend(c.r), blend(c.g), blend(c.b))
}

fn point(p: (f64, f64)) -> (Point, bool) {
    (Point::new(Mm(p.0 as f32), Mm(p.1 as f32)), false)
}

/// Page drawing state: data-to-page transform plus fonts
struct Page {
    layer: PdfLayerReference,
    text_font: IndirectFontRef,
    symbol_font: IndirectFontRef,
    /// Data range mapped onto the plot area
    data: ((f64, f64), (f64, f64)),
    /// Lower-left corner of the plot area (mm)
    origin: (f64, f64),
    /// Data units per millimetre
    scale: f64,
}

impl Page {
    fn to_page(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let ((xa, _), (ya, _)) = self.data;
        (
            self.origin.0 + (x - xa) / self.scale,
            self.origin.1 + (y - ya) / self.scale,
        )
    }

    fn polyline(&self, points: &[(f64, f64)], color: Color, width_px: f64, closed: bool) {
        self.layer.set_outline_color(rgb(color));
        self.layer.set_outline_thickness((width_px * PT_PER_PX) as f32);
        self.layer.add_line(Line {
            points: points.iter().map(|p| point(self.to_page(*p))).collect(),
            is_closed: closed,
        });
    }

    fn fill(&self, ring_mm: Vec<(f64, f64)>, color: Color) {
        self.layer.set_fill_color(rgb(color));
        self.layer.add_polygon(Polygon {
            rings: vec![ring_mm.into_iter().map(point).collect()],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    /// Text with its baseline-left corner at `at_mm`
    fn text(&self, text: &str, size_px: f64, at_mm: (f64, f64)) {
        let size_pt = size_px * PT_PER_PX;
        let mut x = at_mm.0;
        self.layer.set_fill_color(rgb(Color::BLACK));
        for (symbol, run) in pdf_runs(text) {
            let font = if symbol {
                &self.symbol_font
            } else {
                &self.text_font
            };
            self.layer
                .use_text(run.as_str(), size_pt as f32, Mm(x as f32), Mm(at_mm.1 as f32), font);
            x += run.chars().count() as f64 * size_pt * CHAR_WIDTH * MM_PER_PT;
        }
    }

    /// Text whose top-left corner sits at data point `at`
    fn text_at(&self, text: &str, size_px: f64, at: (f64, f64)) {
        let (x, y) = self.to_page(at);
        self.text(text, size_px, (x, y - size_px * MM_PER_PX * 0.8));
    }
}

/// Render `fig` as a one-page PDF of `size` pixels at 96 dpi
pub fn figure_to_pdf(fig: &Figure, size: (u32, u32)) -> Result<Vec<u8>, RenderError> {
    let page_w = f64::from(size.0) * MM_PER_PX;
    let page_h = f64::from(size.1) * MM_PER_PX;
    let (doc, page, layer) = PdfDocument::new(
        fig.title.as_str(),
        Mm(page_w as f32),
        Mm(page_h as f32),
        "Figure",
    );
    let layer = doc.get_page(page).get_layer(layer);
    let text_font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
    let symbol_font = doc.add_builtin_font(BuiltinFont::Symbol).map_err(pdf_err)?;

    // Title band on top, margin all round, the rest is the plot area
    let margin = MARGIN_PX * MM_PER_PX;
    let title_h = TITLE_SIZE * 1.5 * MM_PER_PX;
    let area_w = page_w - 2.0 * margin;
    let area_h = page_h - 2.0 * margin - title_h;

    let (x0, x1, y0, y1) = fig.axes.cartesian_bounds();
    let pad = fig.axes.r_max * FRAME_PAD;
    let (xr, yr, scale) = fit_aspect((x0 - pad, x1 + pad, y0 - pad, y1 + pad), (area_w, area_h));

    let page = Page {
        layer,
        text_font,
        symbol_font,
        data: (xr, yr),
        origin: (margin, margin),
        scale,
    };

    let title_w = fig.title.chars().count() as f64 * TITLE_SIZE * CHAR_WIDTH * MM_PER_PX;
    page.text(
        &fig.title,
        TITLE_SIZE,
        ((page_w - title_w) / 2.0, page_h - margin - TITLE_SIZE * MM_PER_PX),
    );

    let axes = &fig.axes;
    for &tick in &axes.theta_ticks {
        let edge = PolarPoint::from_degrees(axes.r_max, tick);
        page.polyline(&[(0.0, 0.0), xy(&edge)], Color::LIGHT_GREY, 1.0, false);
        let at = PolarPoint::new(axes.r_max * (1.0 + FRAME_PAD / 2.0), plot_angle(tick));
        page.text_at(&format!("{}°", tick), TICK_SIZE, xy(&at));
    }
    let arc: Vec<(f64, f64)> = (0..=100u32)
        .map(|i| {
            let theta = axes.theta_min + (axes.theta_max - axes.theta_min) * f64::from(i) / 100.0;
            xy(&PolarPoint::new(axes.r_max, theta.to_radians()))
        })
        .collect();
    let frame: Vec<(f64, f64)> = std::iter::once((0.0, 0.0)).chain(arc).collect();
    page.polyline(&frame, Color::BLACK, 1.0, true);

    for element in &fig.elements {
        match element {
            Element::Fill {
                outline,
                color,
                alpha,
            } => {
                let ring = outline.iter().map(|p| page.to_page(xy(p))).collect();
                page.fill(ring, over_white(*color, *alpha));
            }
            Element::Line { points, style, .. } => {
                let points: Vec<(f64, f64)> = points.iter().map(xy).collect();
                page.polyline(&points, style.color, style.width, false);
            }
            Element::Label { at, text, size } => page.text_at(text, *size, xy(at)),
        }
    }

    for info in &fig.boxes {
        draw_info_box(&page, info, (area_w, area_h));
    }

    if let Some(legend) = &fig.legend {
        let entries = fig.legend_entries();
        let line_h = BOX_TEXT_SIZE * 1.5 * MM_PER_PX;
        let pad = BOX_TEXT_SIZE * 0.5 * MM_PER_PX;
        let swatch = BOX_TEXT_SIZE * MM_PER_PX;
        let chars = entries.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
        let width = swatch * 2.0
            + chars as f64 * BOX_TEXT_SIZE * CHAR_WIDTH * MM_PER_PX
            + 2.0 * pad;
        let height = entries.len() as f64 * line_h + 2.0 * pad;
        let left = margin + legend.anchor.0 * area_w;
        let top = margin + legend.anchor.1 * area_h;

        let frame = rect(left, top - height, width, height);
        page.fill(frame.clone(), legend.background);
        outline_mm(&page, &frame, legend.border);
        for (i, (label, color)) in entries.iter().enumerate() {
            let y = top - pad - (i as f64 + 0.5) * line_h;
            page.fill(
                rect(left + pad, y - swatch / 4.0, swatch * 1.5, swatch / 2.0),
                over_white(*color, 0.5),
            );
            page.text(label, BOX_TEXT_SIZE, (left + pad + swatch * 2.0, y - swatch / 3.0));
        }
    }

    doc.save_to_bytes().map_err(pdf_err)
}

fn rect(left: f64, bottom: f64, width: f64, height: f64) -> Vec<(f64, f64)> {
    vec![
        (left, bottom),
        (left + width, bottom),
        (left + width, bottom + height),
        (left, bottom + height),
    ]
}

fn outline_mm(page: &Page, ring_mm: &[(f64, f64)], color: Color) {
    page.layer.set_outline_color(rgb(color));
    page.layer.set_outline_thickness(PT_PER_PX as f32);
    page.layer.add_line(Line {
        points: ring_mm.iter().map(|p| point(*p)).collect(),
        is_closed: true,
    });
}

fn draw_info_box(page: &Page, info: &InfoBox, area: (f64, f64)) {
    let char_w = BOX_TEXT_SIZE * CHAR_WIDTH * MM_PER_PX;
    let line_h = BOX_TEXT_SIZE * 1.5 * MM_PER_PX;
    let pad = BOX_TEXT_SIZE * 0.5 * MM_PER_PX;

    let symbol_chars = info.rows.iter().map(|(s, _)| s.chars().count()).max().unwrap_or(0);
    let value_chars = info.rows.iter().map(|(_, v)| v.chars().count()).max().unwrap_or(0);
    let symbol_w = (symbol_chars + 1) as f64 * char_w;
    let width = symbol_w + value_chars as f64 * char_w + 2.0 * pad;
    let height = info.rows.len() as f64 * line_h + 2.0 * pad;

    let anchor_x = page.origin.0 + info.anchor.0 * area.0;
    let anchor_y = page.origin.1 + info.anchor.1 * area.1;
    let left = anchor_x - info.alignment.0 * width;
    let bottom = anchor_y - info.alignment.1 * height;
    let top = bottom + height;

    let frame = rect(left, bottom, width, height);
    page.fill(frame.clone(), info.background);
    outline_mm(page, &frame, Color::BLACK);

    for (i, (symbol, value)) in info.rows.iter().enumerate() {
        let baseline = top - pad - i as f64 * line_h - BOX_TEXT_SIZE * MM_PER_PX * 0.8;
        page.text(symbol, BOX_TEXT_SIZE, (left + pad, baseline));
        page.text(value, BOX_TEXT_SIZE, (left + pad + symbol_w, baseline));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{plot_cell, DiagramStyle};
    use crate::params::default_params;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_greek_switches_to_symbol_face() {
        assert_eq!(
            pdf_runs("θLD"),
            vec![(true, "q".to_string()), (false, "LD".to_string())]
        );
        assert_eq!(pdf_runs("= 4.75°"), vec![(false, "= 4.75°".to_string())]);
        assert_eq!(pdf_runs("r₀"), vec![(false, "r?".to_string())]);
        assert!(pdf_runs("").is_empty());
    }

    #[test]
    fn test_alpha_blends_towards_white() {
        assert_eq!(over_white(Color::BLACK, 0.0), Color::rgb(255, 255, 255));
        assert_eq!(over_white(Color::ROYAL_BLUE, 1.0), Color::ROYAL_BLUE);
        assert_eq!(over_white(Color::BLACK, 0.25), Color::rgb(191, 191, 191));
    }

    #[test]
    fn test_cell_renders_as_pdf() {
        let style = DiagramStyle::default();
        let fig = plot_cell(&default_params(), &style);
        let bytes = figure_to_pdf(&fig, style.size).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 1000);
    }
}
