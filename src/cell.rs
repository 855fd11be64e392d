//! Layout of one lattice cell and assembly of its diagram

use tracing::{debug, warn};

use crate::figure::{Color, Figure, PolarAxes};
use crate::params::{CellAngles, LatticeParams, LengthUnit};

/// Cosmetic settings of the cell diagram
#[derive(Debug, Clone)]
pub struct DiagramStyle {
    pub title: String,
    /// Plot radius of the magnets' inner edge
    pub inner_radius: f64,
    /// Plot radius of the magnets' outer edge
    pub outer_radius: f64,
    /// Radius of the total-cell arrow
    pub total_arrow_radius: f64,
    /// Gap between the outer edge and the element arrows
    pub arrow_gap: f64,
    /// Whisker length of angular arrows (plot radius)
    pub angular_head: f64,
    /// Whisker span of radial arrows (lattice degrees)
    pub radial_head: f64,
    /// Theta tick spacing in lattice degrees
    pub tick_step: f64,
    pub d_color: Color,
    pub f_color: Color,
    /// Canvas size in pixels
    pub size: (u32, u32),
}

impl Default for DiagramStyle {
    fn default() -> Self {
        Self {
            title: "Layout of KURRI Main Ring".to_string(),
            inner_radius: 0.3,
            outer_radius: 0.5,
            total_arrow_radius: 0.1,
            arrow_gap: 0.025,
            angular_head: 0.03,
            radial_head: 0.75,
            tick_step: 5.0,
            d_color: Color::ROYAL_BLUE,
            f_color: Color::FIREBRICK,
            size: (800, 640),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagnetKind {
    D,
    F,
}

impl MagnetKind {
    pub fn label(&self) -> &'static str {
        match self {
            MagnetKind::D => "D Magnet",
            MagnetKind::F => "F Magnet",
        }
    }
}

/// A magnet's angular footprint, lattice degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MagnetPlacement {
    pub kind: MagnetKind,
    pub start: f64,
    pub end: f64,
}

/// Magnet start angles, accumulated along `LD, D, SD, F, SD, D`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellLayout {
    pub angles: CellAngles,
    pub d1_start: f64,
    pub f_start: f64,
    pub d2_start: f64,
}

impl CellLayout {
    pub fn new(angles: CellAngles) -> Self {
        let d1_start = angles.theta_ld;
        let f_start = d1_start + angles.theta_d + angles.theta_sd;
        let d2_start = f_start + angles.theta_f + angles.theta_sd;
        Self {
            angles,
            d1_start,
            f_start,
            d2_start,
        }
    }

    pub fn magnets(&self) -> [MagnetPlacement; 3] {
        let a = &self.angles;
        [
            MagnetPlacement {
                kind: MagnetKind::D,
                start: self.d1_start,
                end: self.d1_start + a.theta_d,
            },
            MagnetPlacement {
                kind: MagnetKind::F,
                start: self.f_start,
                end: self.f_start + a.theta_f,
            },
            MagnetPlacement {
                kind: MagnetKind::D,
                start: self.d2_start,
                end: self.d2_start + a.theta_d,
            },
        ]
    }

    /// Angle where the second D magnet ends
    pub fn d2_end(&self) -> f64 {
        self.d2_start + self.angles.theta_d
    }
}

/// Degrees as shown in the angle box: whole values keep one decimal
fn fmt_degrees(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("= {:.1}°", value)
    } else {
        format!("= {}°", value)
    }
}

/// Rows of the angle box: symbol and value in degrees
pub fn angle_rows(angles: &CellAngles) -> Vec<(String, String)> {
    [
        ("θC", angles.theta_c),
        ("θLD", angles.theta_ld),
        ("θD", angles.theta_d),
        ("θSD", angles.theta_sd),
        ("θF", angles.theta_f),
    ]
    .into_iter()
    .map(|(symbol, value)| (symbol.to_string(), fmt_degrees(value)))
    .collect()
}

/// Rows of the radius box: display radii in metres
pub fn radius_rows(params: &LatticeParams) -> Vec<(String, String)> {
    let unit = LengthUnit::Meter;
    let to_unit = |cm: f64| LengthUnit::Centimeter.scale_to(&unit) * cm;
    vec![
        (
            "r_min".to_string(),
            format!("= {:.2} {}", to_unit(params.r_min), unit.symbol()),
        ),
        (
            "r_max".to_string(),
            format!("= {:.2} {}", to_unit(params.r_max), unit.symbol()),
        ),
    ]
}

/// Build the full cell diagram for `params`
pub fn plot_cell(params: &LatticeParams, style: &DiagramStyle) -> Figure {
    let angles = params.angles();
    if let Err(e) = angles.check() {
        warn!("Cell '{}' does not close: {}", params.name, e);
    }
    let layout = CellLayout::new(angles);
    debug!(
        "Magnet starts: D1 {:.2}, F {:.2}, D2 {:.2}",
        layout.d1_start, layout.f_start, layout.d2_start
    );

    let r0 = style.inner_radius;
    let r1 = style.outer_radius;
    let axes = PolarAxes::for_cell(angles.theta_c, r1 + 0.1, style.tick_step);
    let mut fig = Figure::new(style.title.clone(), axes);

    // Magnets; only the first of each kind goes in the legend
    let mut listed = Vec::new();
    for magnet in layout.magnets() {
        let color = match magnet.kind {
            MagnetKind::D => style.d_color,
            MagnetKind::F => style.f_color,
        };
        let label = if listed.contains(&magnet.kind) {
            None
        } else {
            listed.push(magnet.kind);
            Some(magnet.kind.label())
        };
        fig.plot_wedge(r0, r1, magnet.start, magnet.end, color, label);
    }

    // Dimensions
    fig.ang_arrow(style.total_arrow_radius, 0.0, angles.theta_c, "θC", 0.0);
    let r_arr = r1 + style.arrow_gap;
    let head = style.angular_head;
    let d1_end = layout.d1_start + angles.theta_d;
    fig.ang_arrow(r_arr, 0.0, angles.theta_ld, "θLD", head);
    fig.ang_arrow(r_arr, layout.d1_start, d1_end, "θD", head);
    fig.ang_arrow(r_arr, d1_end, d1_end + angles.theta_sd, "θSD", head);
    fig.ang_arrow(
        r_arr,
        layout.f_start,
        layout.f_start + angles.theta_f / 2.0,
        "θF/2",
        head,
    );

    fig.rad_arrow(0.0, r0, layout.d2_end(), "r_min", style.radial_head);
    fig.rad_arrow(0.0, r1, layout.d2_end(), "r_max", style.radial_head);

    fig.info_box(angle_rows(&angles), (0.05, 0.8), (0.05, 0.8));
    fig.info_box(radius_rows(params), (0.05, 0.5), (0.05, 0.5));
    fig.legend((0.75, 0.8));

    fig
}
