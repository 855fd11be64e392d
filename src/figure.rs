//! Figure description: a plain value the drawing steps append to
//!
//! Nothing here touches a plotting backend. A [`Figure`] is built up by
//! the cell assembly and handed to [`crate::render`] afterwards.

use crate::geometry::{plot_angle, sample_segment, wedge, PolarPoint, ANGLE_SCALE};

/// Fill opacity of magnet footprints
pub const WEDGE_ALPHA: f64 = 0.25;
/// Outline width of magnet footprints
pub const WEDGE_LINE_WIDTH: f64 = 2.0;
/// Line width of dimension arrows
pub const ARROW_LINE_WIDTH: f64 = 1.5;
/// Radial labels sit this far past their arrow, as a plot-angle factor
pub const RADIAL_LABEL_SPREAD: f64 = 1.075;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const DARK_GREY: Color = Color::rgb(64, 64, 64);
    pub const LIGHT_GREY: Color = Color::rgb(200, 200, 200);
    pub const ROYAL_BLUE: Color = Color::rgb(65, 105, 225);
    pub const FIREBRICK: Color = Color::rgb(178, 34, 34);
    pub const WHEAT: Color = Color::rgb(245, 222, 179);
    pub const LAVENDER_BLUSH: Color = Color::rgb(255, 240, 245);
}

/// Stroke of a polyline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineStyle {
    pub color: Color,
    pub width: f64,
}

impl LineStyle {
    pub fn arrow(color: Color) -> Self {
        Self {
            color,
            width: ARROW_LINE_WIDTH,
        }
    }
}

/// Something drawn in data (polar) space
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Translucent fill of a closed outline
    Fill {
        outline: Vec<PolarPoint>,
        color: Color,
        alpha: f64,
    },
    /// Open polyline, optionally listed in the legend
    Line {
        points: Vec<PolarPoint>,
        style: LineStyle,
        legend: Option<String>,
    },
    /// Text whose top-left corner sits at `at`
    Label {
        at: PolarPoint,
        text: String,
        size: f64,
    },
}

/// Boxed two-column table (symbol, value) placed in axes fractions
#[derive(Debug, Clone, PartialEq)]
pub struct InfoBox {
    pub rows: Vec<(String, String)>,
    /// Point of the axes the box is pinned to, as (x, y) fractions
    pub anchor: (f64, f64),
    /// Point of the box that lands on the anchor, as fractions of its size
    pub alignment: (f64, f64),
    pub background: Color,
}

/// Legend placement; entries come from labelled lines
#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    /// Top-left corner in axes fractions
    pub anchor: (f64, f64),
    pub background: Color,
    pub border: Color,
}

/// Polar axes: angular range in plot degrees, radius from zero
#[derive(Debug, Clone, PartialEq)]
pub struct PolarAxes {
    pub theta_min: f64,
    pub theta_max: f64,
    pub r_max: f64,
    /// Tick positions in lattice degrees
    pub theta_ticks: Vec<f64>,
}

impl PolarAxes {
    /// Axes spanning `cell_angle` lattice degrees with a tick every `tick_step`
    pub fn for_cell(cell_angle: f64, r_max: f64, tick_step: f64) -> Self {
        let mut theta_ticks = Vec::new();
        if tick_step > 0.0 {
            let mut tick = 0.0;
            while tick <= cell_angle + 1e-9 {
                theta_ticks.push(tick);
                tick += tick_step;
            }
        }
        Self {
            theta_min: 0.0,
            theta_max: cell_angle * ANGLE_SCALE,
            r_max,
            theta_ticks,
        }
    }

    /// Cartesian bounding box of the sector: (x_min, x_max, y_min, y_max)
    pub fn cartesian_bounds(&self) -> (f64, f64, f64, f64) {
        let t0 = self.theta_min.to_radians();
        let t1 = self.theta_max.to_radians();
        let mut xs = vec![0.0, self.r_max * t0.cos(), self.r_max * t1.cos()];
        let mut ys = vec![0.0, self.r_max * t0.sin(), self.r_max * t1.sin()];
        // Axis crossings inside the sector extend the box
        for quarter in 0..8u32 {
            let angle = f64::from(quarter) * std::f64::consts::FRAC_PI_2;
            if angle > t0 && angle < t1 {
                xs.push(self.r_max * angle.cos());
                ys.push(self.r_max * angle.sin());
            }
        }
        let min = |v: &[f64]| v.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = |v: &[f64]| v.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        (min(&xs), max(&xs), min(&ys), max(&ys))
    }
}

/// One diagram: axes, drawn elements, annotation boxes, legend
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub title: String,
    pub axes: PolarAxes,
    pub elements: Vec<Element>,
    pub boxes: Vec<InfoBox>,
    pub legend: Option<Legend>,
}

impl Figure {
    pub fn new(title: impl Into<String>, axes: PolarAxes) -> Self {
        Self {
            title: title.into(),
            axes,
            elements: Vec::new(),
            boxes: Vec::new(),
            legend: None,
        }
    }

    /// Polyline from (r0, theta_0) to (r1, theta_1), angles in lattice degrees
    pub fn plot_segment(&mut self, r0: f64, r1: f64, theta_0: f64, theta_1: f64, style: LineStyle) {
        self.elements.push(Element::Line {
            points: sample_segment(r0, r1, theta_0, theta_1),
            style,
            legend: None,
        });
    }

    /// Shaded region r0..r1, theta_0..theta_1 with its outline
    pub fn plot_wedge(
        &mut self,
        r0: f64,
        r1: f64,
        theta_0: f64,
        theta_1: f64,
        color: Color,
        label: Option<&str>,
    ) {
        let outline = wedge(r0, r1, theta_0, theta_1);
        self.elements.push(Element::Fill {
            outline: outline.clone(),
            color,
            alpha: WEDGE_ALPHA,
        });
        self.elements.push(Element::Line {
            points: outline,
            style: LineStyle {
                color,
                width: WEDGE_LINE_WIDTH,
            },
            legend: label.map(str::to_string),
        });
    }

    /// Angular dimension: arc at radius `r` with radial whiskers of length `head`
    ///
    /// A zero or negative `head` leaves the arc uncapped.
    pub fn ang_arrow(&mut self, r: f64, theta_0: f64, theta_1: f64, text: &str, head: f64) {
        let style = LineStyle::arrow(Color::BLACK);
        self.plot_segment(r, r, theta_0, theta_1, style);
        if head > 0.0 {
            self.plot_segment(r - head / 2.0, r + head / 2.0, theta_0, theta_0, style);
            self.plot_segment(r - head / 2.0, r + head / 2.0, theta_1, theta_1, style);
        }
        self.label(
            PolarPoint::from_degrees(r + head / 2.0, (theta_0 + theta_1) / 2.0),
            text,
            14.0,
        );
    }

    /// Radial dimension: line r0..r1 at `theta`, whisker at r1 spanning `head` degrees
    pub fn rad_arrow(&mut self, r0: f64, r1: f64, theta: f64, text: &str, head: f64) {
        let style = LineStyle::arrow(Color::DARK_GREY);
        self.plot_segment(r0, r1, theta, theta, style);
        if head > 0.0 {
            self.plot_segment(r1, r1, theta, theta + head, style);
        }
        self.label(
            PolarPoint::new(r1, plot_angle(theta) * RADIAL_LABEL_SPREAD),
            text,
            16.0,
        );
    }

    pub fn label(&mut self, at: PolarPoint, text: &str, size: f64) {
        self.elements.push(Element::Label {
            at,
            text: text.to_string(),
            size,
        });
    }

    pub fn info_box(&mut self, rows: Vec<(String, String)>, anchor: (f64, f64), alignment: (f64, f64)) {
        self.boxes.push(InfoBox {
            rows,
            anchor,
            alignment,
            background: Color::WHEAT,
        });
    }

    pub fn legend(&mut self, anchor: (f64, f64)) {
        self.legend = Some(Legend {
            anchor,
            background: Color::LAVENDER_BLUSH,
            border: Color::BLACK,
        });
    }

    /// Legend entries in drawing order
    pub fn legend_entries(&self) -> Vec<(&str, Color)> {
        self.elements
            .iter()
            .filter_map(|e| match e {
                Element::Line {
                    legend: Some(label),
                    style,
                    ..
                } => Some((label.as_str(), style.color)),
                _ => None,
            })
            .collect()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().filter_map(|e| match e {
            Element::Label { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn fill_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Fill { .. }))
            .count()
    }

    pub fn line_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| matches!(e, Element::Line { .. }))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn blank() -> Figure {
        Figure::new("test", PolarAxes::for_cell(30.0, 0.6, 5.0))
    }

    #[test]
    fn test_axes_for_cell() {
        let axes = PolarAxes::for_cell(30.0, 0.6, 5.0);
        assert_eq!(axes.theta_max, 60.0);
        assert_eq!(axes.theta_ticks, vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
    }

    #[test]
    fn test_sector_bounds() {
        let (x0, x1, y0, y1) = PolarAxes::for_cell(30.0, 1.0, 5.0).cartesian_bounds();
        assert!(x0.abs() < 1e-12);
        assert!((x1 - 1.0).abs() < 1e-12);
        assert!(y0.abs() < 1e-12);
        assert!((y1 - 3f64.sqrt() / 2.0).abs() < 1e-12);

        // 120 deg of plot crosses the y axis
        let (x0, _, _, y1) = PolarAxes::for_cell(60.0, 1.0, 5.0).cartesian_bounds();
        assert!((x0 + 0.5).abs() < 1e-12);
        assert!((y1 - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wedge_adds_fill_and_outline() {
        let mut fig = blank();
        fig.plot_wedge(0.3, 0.5, 4.75, 8.18, Color::ROYAL_BLUE, Some("D Magnet"));
        assert_eq!(fig.fill_count(), 1);
        assert_eq!(fig.line_count(), 1);
        assert_eq!(fig.legend_entries(), vec![("D Magnet", Color::ROYAL_BLUE)]);
    }

    #[test]
    fn test_ang_arrow_has_caps() {
        let mut fig = blank();
        fig.ang_arrow(0.525, 0.0, 4.75, "θLD", 0.03);
        assert_eq!(fig.line_count(), 3);
        assert_eq!(fig.labels().collect::<Vec<_>>(), vec!["θLD"]);

        match &fig.elements[1] {
            Element::Line { points, .. } => {
                assert!((points[0].r - 0.51).abs() < 1e-12);
                assert!((points[99].r - 0.54).abs() < 1e-12);
                assert!(points.iter().all(|p| p.theta == 0.0));
            }
            other => panic!("Expected whisker line, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_head_draws_plain_line() {
        let mut fig = blank();
        fig.ang_arrow(0.1, 0.0, 30.0, "θC", 0.0);
        fig.rad_arrow(0.0, 0.3, 25.25, "r_min", -1.0);
        assert_eq!(fig.line_count(), 2);
        assert_eq!(fig.labels().count(), 2);
    }

    #[test]
    fn test_rad_arrow_label_position() {
        let mut fig = blank();
        fig.rad_arrow(0.0, 0.5, 20.0, "r_max", 0.75);
        assert_eq!(fig.line_count(), 2);
        let label = fig.elements.iter().find_map(|e| match e {
            Element::Label { at, .. } => Some(*at),
            _ => None,
        });
        let at = label.unwrap();
        assert!((at.r - 0.5).abs() < 1e-12);
        assert!((at.theta - plot_angle(20.0) * RADIAL_LABEL_SPREAD).abs() < 1e-12);
    }
}
