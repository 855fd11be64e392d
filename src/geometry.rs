//! Polar arc sampling and wedge outlines
//!
//! Angles come in as lattice degrees and leave as plot radians, scaled by
//! [`ANGLE_SCALE`] so that a 30 deg cell opens up over 60 deg of the plot.

use nalgebra::{Point2, Rotation2, Vector2};

/// Plot angle per lattice angle
pub const ANGLE_SCALE: f64 = 2.0;

/// Points per sampled segment
pub const SEGMENT_SAMPLES: usize = 100;

/// A sampled point: radius and plot angle (radians)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarPoint {
    pub r: f64,
    pub theta: f64,
}

impl PolarPoint {
    pub fn new(r: f64, theta: f64) -> Self {
        Self { r, theta }
    }

    /// Point at radius `r` and lattice angle `deg`
    pub fn from_degrees(r: f64, deg: f64) -> Self {
        Self::new(r, plot_angle(deg))
    }

    pub fn to_cartesian(&self) -> Point2<f64> {
        Point2::from(Rotation2::new(self.theta) * Vector2::new(self.r, 0.0))
    }
}

/// Lattice degrees to plot radians
pub fn plot_angle(deg: f64) -> f64 {
    deg.to_radians() * ANGLE_SCALE
}

fn linspace(start: f64, stop: f64, n: usize) -> impl Iterator<Item = f64> {
    let steps = n.saturating_sub(1).max(1) as f64;
    (0..n).map(move |i| {
        let t = i as f64 / steps;
        start * (1.0 - t) + stop * t
    })
}

/// Sample a segment running from (r0, theta_0) to (r1, theta_1)
///
/// Radius and angle are interpolated together, so equal radii give an arc
/// and equal angles give a radial line.
pub fn sample_segment(r0: f64, r1: f64, theta_0: f64, theta_1: f64) -> Vec<PolarPoint> {
    linspace(r0, r1, SEGMENT_SAMPLES)
        .zip(linspace(theta_0, theta_1, SEGMENT_SAMPLES))
        .map(|(r, deg)| PolarPoint::from_degrees(r, deg))
        .collect()
}

/// Closed outline of the region r0..r1, theta_0..theta_1
///
/// Inner edge, left radial edge, outer edge, right radial edge; the last
/// point lands back on the first.
pub fn wedge(r0: f64, r1: f64, theta_0: f64, theta_1: f64) -> Vec<PolarPoint> {
    let mut outline = Vec::with_capacity(4 * SEGMENT_SAMPLES);
    outline.extend(sample_segment(r0, r0, theta_0, theta_1));
    outline.extend(sample_segment(r0, r1, theta_1, theta_1));
    outline.extend(sample_segment(r1, r1, theta_1, theta_0));
    outline.extend(sample_segment(r1, r0, theta_0, theta_0));
    outline
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: PolarPoint, b: PolarPoint) -> bool {
        (a.r - b.r).abs() < 1e-12 && (a.theta - b.theta).abs() < 1e-12
    }

    #[test]
    fn test_segment_endpoints() {
        let seg = sample_segment(0.3, 0.5, 4.75, 8.18);
        assert_eq!(seg.len(), SEGMENT_SAMPLES);
        assert!(close(seg[0], PolarPoint::from_degrees(0.3, 4.75)));
        assert!(close(seg[99], PolarPoint::from_degrees(0.5, 8.18)));
    }

    #[test]
    fn test_segment_is_linear() {
        let seg = sample_segment(0.0, 0.99, 0.0, 9.9);
        for (i, p) in seg.iter().enumerate() {
            assert!((p.r - 0.01 * i as f64).abs() < 1e-12);
            assert!((p.theta - plot_angle(0.1 * i as f64)).abs() < 1e-12);
        }
    }

    #[test]
    fn test_angle_scale() {
        assert!((plot_angle(30.0) - std::f64::consts::FRAC_PI_3).abs() < 1e-12);
    }

    #[test]
    fn test_wedge_is_closed() {
        for &(r0, r1, t0, t1) in &[
            (0.3, 0.5, 4.75, 8.18),
            (0.0, 1.0, 0.0, 30.0),
            (2.0, 2.5, 21.82, 25.25),
        ] {
            let outline = wedge(r0, r1, t0, t1);
            assert_eq!(outline.len(), 4 * SEGMENT_SAMPLES);
            assert!(close(outline[0], *outline.last().unwrap()));
        }
    }

    #[test]
    fn test_wedge_edge_order() {
        let outline = wedge(0.3, 0.5, 10.0, 20.0);
        // inner edge ends at theta_1, outer edge starts there
        assert!(close(outline[99], PolarPoint::from_degrees(0.3, 20.0)));
        assert!(close(outline[100], PolarPoint::from_degrees(0.3, 20.0)));
        assert!(close(outline[199], PolarPoint::from_degrees(0.5, 20.0)));
        assert!(close(outline[299], PolarPoint::from_degrees(0.5, 10.0)));
    }

    #[test]
    fn test_zero_width_wedge_is_radial_line() {
        let outline = wedge(0.3, 0.5, 12.0, 12.0);
        let theta = plot_angle(12.0);
        assert!(outline.iter().all(|p| (p.theta - theta).abs() < 1e-12));
        assert!(outline.iter().all(|p| p.r >= 0.3 - 1e-12 && p.r <= 0.5 + 1e-12));
    }

    #[test]
    fn test_zero_depth_wedge_is_arc() {
        let outline = wedge(0.4, 0.4, 0.0, 10.0);
        assert!(outline.iter().all(|p| (p.r - 0.4).abs() < 1e-12));
        assert!(close(outline[0], *outline.last().unwrap()));
    }

    #[test]
    fn test_point_wedge() {
        let outline = wedge(0.4, 0.4, 5.0, 5.0);
        assert!(outline.iter().all(|p| close(*p, outline[0])));
    }

    #[test]
    fn test_to_cartesian() {
        let p = PolarPoint::new(2.0, std::f64::consts::FRAC_PI_2).to_cartesian();
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 2.0).abs() < 1e-12);
    }
}
