//! Monotone cubic interpolation along x
//!
//! Produces an SVG path through the given points that never overshoots
//! between neighbouring values (same construction as d3 `curveMonotoneX`).

use std::fmt::Write;

use super::surface::num;

/// `-1` for negative values, `1` otherwise (zero counts as positive)
fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Tangent at the middle of three points
fn interior_slope(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let h0 = p1.0 - p0.0;
    let h1 = p2.0 - p1.0;
    if h0 == 0.0 || h1 == 0.0 {
        return 0.0;
    }

    let s0 = (p1.1 - p0.1) / h0;
    let s1 = (p2.1 - p1.1) / h1;
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    let slope = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if slope.is_finite() {
        slope
    } else {
        0.0
    }
}

/// One-sided tangent at an end point, given the neighbouring tangent
fn end_slope(p0: (f64, f64), p1: (f64, f64), neighbour: f64) -> f64 {
    let h = p1.0 - p0.0;
    if h == 0.0 {
        neighbour
    } else {
        (3.0 * (p1.1 - p0.1) / h - neighbour) / 2.0
    }
}

/// SVG path data for a monotone curve through `points`
pub fn monotone_x(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    match points {
        [] => {}
        [(x, y)] => {
            let _ = write!(d, "M{},{}Z", num(*x), num(*y));
        }
        [(x0, y0), (x1, y1)] => {
            let _ = write!(d, "M{},{}L{},{}", num(*x0), num(*y0), num(*x1), num(*y1));
        }
        _ => {
            let n = points.len();
            let mut tangents = vec![0.0; n];
            for i in 1..n - 1 {
                tangents[i] = interior_slope(points[i - 1], points[i], points[i + 1]);
            }
            tangents[0] = end_slope(points[0], points[1], tangents[1]);
            tangents[n - 1] = end_slope(points[n - 2], points[n - 1], tangents[n - 2]);

            let _ = write!(d, "M{},{}", num(points[0].0), num(points[0].1));
            for i in 0..n - 1 {
                let (x0, y0) = points[i];
                let (x1, y1) = points[i + 1];
                let dx = (x1 - x0) / 3.0;
                let _ = write!(
                    d,
                    "C{},{},{},{},{},{}",
                    num(x0 + dx),
                    num(y0 + dx * tangents[i]),
                    num(x1 - dx),
                    num(y1 - dx * tangents[i + 1]),
                    num(x1),
                    num(y1)
                );
            }
        }
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    fn control_points(path: &str) -> Vec<Vec<f64>> {
        path.split('C')
            .skip(1)
            .map(|seg| seg.split(',').map(|v| v.parse().unwrap()).collect())
            .collect()
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(monotone_x(&[]), "");
        assert_eq!(monotone_x(&[(5.0, 10.0)]), "M5,10Z");
        assert_eq!(monotone_x(&[(0.0, 0.0), (10.0, 20.0)]), "M0,0L10,20");
    }

    #[test]
    fn test_one_segment_per_gap() {
        let points: Vec<(f64, f64)> = (0..12).map(|i| (i as f64 * 40.0, 100.0)).collect();
        let path = monotone_x(&points);
        assert!(path.starts_with("M0,100"));
        assert_eq!(path.matches('C').count(), 11);
    }

    #[test]
    fn test_no_overshoot_on_monotone_data() {
        let points = [(0.0, 10.0), (10.0, 20.0), (20.0, 60.0), (30.0, 61.0)];
        for (i, seg) in control_points(&monotone_x(&points)).iter().enumerate() {
            let lo = points[i].1.min(points[i + 1].1);
            let hi = points[i].1.max(points[i + 1].1);
            assert!(seg[1] >= lo - 1e-6 && seg[1] <= hi + 1e-6);
            assert!(seg[3] >= lo - 1e-6 && seg[3] <= hi + 1e-6);
        }
    }

    #[test]
    fn test_flat_at_local_extremum() {
        // Peak at the middle point gets a horizontal tangent
        assert_eq!(interior_slope((0.0, 0.0), (1.0, 5.0), (2.0, 0.0)), 0.0);
    }
}
