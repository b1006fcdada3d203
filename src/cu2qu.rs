//! Cubic to quadratic Bézier conversion.
//!
//! A cubic is split into `n` equal parts, each approximated by a single
//! quadratic, and the result is accepted once every part stays within
//! the requested distance from the original curve.
//! Neighbouring quadratics share an implied on-curve point.

use crate::outline::Point;

/// Maximum number of segments a cubic can be split into.
pub const MAX_SEGMENTS: usize = 100;

// Limits the recursion of the error check.
const MAX_FIT_DEPTH: u8 = 32;

/// Approximates a cubic segment with a quadratic spline.
///
/// Returns the spline points: the start point, one or more off-curve points
/// and the end point. Neighbouring off-curve points have an implied
/// on-curve point in the middle.
///
/// Returns `None` when no spline with up to `MAX_SEGMENTS` segments
/// is within `max_err`.
pub fn curve_to_quadratic(cubic: [Point; 4], max_err: f64) -> Option<Vec<Point>> {
    if !max_err.is_finite() || cubic.iter().any(|p| !p.is_finite()) {
        return None;
    }

    (1..=MAX_SEGMENTS).find_map(|n| cubic_approx_spline(cubic, n, max_err))
}

fn cubic_approx_spline(cubic: [Point; 4], n: usize, tolerance: f64) -> Option<Vec<Point>> {
    if n == 1 {
        return cubic_approx_quadratic(cubic, tolerance);
    }

    let cubics = split_cubic_into_n(cubic, n);

    let mut next_cubic = cubics[0];
    let mut next_q1 = cubic_approx_control(0.0, next_cubic);
    let mut q2 = cubic[0];
    let mut d1 = Point::default();
    let mut spline = Vec::with_capacity(n + 2);
    spline.push(cubic[0]);
    spline.push(next_q1);

    for i in 1..=n {
        let [_, c1, c2, c3] = next_cubic;
        let q0 = q2;
        let q1 = next_q1;
        if i < n {
            next_cubic = cubics[i];
            next_q1 = cubic_approx_control(i as f64 / (n - 1) as f64, next_cubic);
            spline.push(next_q1);
            q2 = (q1 + next_q1) * 0.5;
        } else {
            q2 = c3;
        }

        let d0 = d1;
        d1 = q2 - c3;

        if norm(d1) > tolerance || !cubic_farthest_fit_inside(
            d0,
            q0 + (q1 - q0) * (2.0 / 3.0) - c1,
            q2 + (q1 - q2) * (2.0 / 3.0) - c2,
            d1,
            tolerance,
            0,
        ) {
            return None;
        }
    }

    spline.push(cubic[3]);
    Some(spline)
}

fn cubic_approx_quadratic(cubic: [Point; 4], tolerance: f64) -> Option<Vec<Point>> {
    let q1 = calc_intersect(cubic[0], cubic[1], cubic[2], cubic[3])?;
    let c0 = cubic[0];
    let c3 = cubic[3];
    let c1 = c0 + (q1 - c0) * (2.0 / 3.0);
    let c2 = c3 + (q1 - c3) * (2.0 / 3.0);
    if !cubic_farthest_fit_inside(Point::default(), c1 - cubic[1], c2 - cubic[2], Point::default(), tolerance, 0) {
        return None;
    }

    Some(vec![c0, q1, c3])
}

// A quadratic control point that approximates a part of the cubic at `t`.
fn cubic_approx_control(t: f64, cubic: [Point; 4]) -> Point {
    let [p0, p1, p2, p3] = cubic;
    let p1 = p0 + (p1 - p0) * 1.5;
    let p2 = p3 + (p2 - p3) * 1.5;
    p1 + (p2 - p1) * t
}

// Intersection of the `ab` and `cd` lines.
fn calc_intersect(a: Point, b: Point, c: Point, d: Point) -> Option<Point> {
    let ab = b - a;
    let cd = d - c;
    // `ab` rotated by 90 degrees.
    let p = Point::new(-ab.y, ab.x);
    let denom = dot(p, cd);
    if denom == 0.0 {
        return None;
    }

    let h = dot(p, a - c) / denom;
    let q = c + cd * h;
    if q.is_finite() { Some(q) } else { None }
}

// Checks that a cubic, given as deviations from the approximation,
// stays within `tolerance` from the origin.
fn cubic_farthest_fit_inside(p0: Point, p1: Point, p2: Point, p3: Point, tolerance: f64, depth: u8) -> bool {
    if norm(p2) <= tolerance && norm(p1) <= tolerance {
        return true;
    }

    if depth >= MAX_FIT_DEPTH {
        return false;
    }

    let mid = (p0 + (p1 + p2) * 3.0 + p3) * 0.125;
    if norm(mid) > tolerance {
        return false;
    }

    let deriv3 = (p3 + p2 - p1 - p0) * 0.125;
    cubic_farthest_fit_inside(p0, (p0 + p1) * 0.5, mid - deriv3, mid, tolerance, depth + 1) &&
    cubic_farthest_fit_inside(mid, mid + deriv3, (p2 + p3) * 0.5, p3, tolerance, depth + 1)
}

fn split_cubic_into_n(cubic: [Point; 4], n: usize) -> Vec<[Point; 4]> {
    let [p0, p1, p2, p3] = cubic;

    // Polynomial coefficients.
    let c = (p1 - p0) * 3.0;
    let b = (p2 - p1) * 3.0 - c;
    let d = p0;
    let a = p3 - d - c - b;

    let dt = 1.0 / n as f64;
    let delta_2 = dt * dt;
    let delta_3 = dt * delta_2;
    (0..n).map(|i| {
        let t1 = i as f64 * dt;
        let t1_2 = t1 * t1;
        let a1 = a * delta_3;
        let b1 = (a * (3.0 * t1) + b) * delta_2;
        let c1 = (b * (2.0 * t1) + c + a * (3.0 * t1_2)) * dt;
        let d1 = a * (t1 * t1_2) + b * t1_2 + c * t1 + d;
        calc_cubic_points(a1, b1, c1, d1)
    }).collect()
}

fn calc_cubic_points(a: Point, b: Point, c: Point, d: Point) -> [Point; 4] {
    let p1 = c * (1.0 / 3.0) + d;
    let p2 = (b + c) * (1.0 / 3.0) + p1;
    let p3 = a + d + c + b;
    [d, p1, p2, p3]
}

#[inline]
fn dot(a: Point, b: Point) -> f64 {
    a.x * b.x + a.y * b.y
}

#[inline]
fn norm(p: Point) -> f64 {
    p.x.hypot(p.y)
}
