//! Polygon measures over integer contours: area, arc length, convex hull,
//! Douglas-Peucker simplification and the convexity test.

use crate::Point;

/// Which traversal direction a convex polygon is allowed to have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvexityOrder {
    /// Either winding is accepted
    #[default]
    Any,
    /// Positive cross products in image coordinates (y down)
    Clockwise,
    CounterClockwise,
}

#[inline]
fn cross(o: Point, a: Point, b: Point) -> i64 {
    (a.x as i64 - o.x as i64) * (b.y as i64 - o.y as i64)
        - (a.y as i64 - o.y as i64) * (b.x as i64 - o.x as i64)
}

#[inline]
fn distance(a: Point, b: Point) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    dx.hypot(dy)
}

/// Signed shoelace area. Positive for clockwise traversal in image coordinates.
pub fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let twice: i64 = (0..n)
        .map(|i| {
            let p = points[i];
            let q = points[(i + 1) % n];
            p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64
        })
        .sum();
    twice as f64 / 2.0
}

/// Magnitude of the enclosed area
pub fn contour_area(points: &[Point]) -> f64 {
    signed_area(points).abs()
}

/// Sum of consecutive point distances; `closed` adds the edge from last back to first
pub fn arc_length(points: &[Point], closed: bool) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let open: f64 = points.windows(2).map(|w| distance(w[0], w[1])).sum();
    if closed {
        open + distance(points[points.len() - 1], points[0])
    } else {
        open
    }
}

/// Convex hull by monotone chain. Collinear points are dropped, so the
/// result is strictly convex whenever it has three or more vertices.
pub fn convex_hull(points: &[Point]) -> Vec<Point> {
    let mut pts = points.to_vec();
    pts.sort_unstable();
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(pts.len() * 2);

    // lower chain
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }

    // upper chain
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0 {
            hull.pop();
        }
        hull.push(p);
    }

    // last point repeats the first
    hull.pop();
    hull
}

/// Perpendicular distance from `p` to the line through `a` and `b`
fn line_distance(p: Point, a: Point, b: Point) -> f64 {
    let len = distance(a, b);
    if len == 0.0 {
        return distance(p, a);
    }
    (cross(a, b, p) as f64).abs() / len
}

/// Douglas-Peucker over `points[start..=end]`, pushing kept indices except `end`
fn simplify_chain(points: &[Point], start: usize, end: usize, epsilon: f64, keep: &mut Vec<usize>) {
    let mut stack = vec![(start, end)];
    let mut kept = vec![start];

    while let Some((lo, hi)) = stack.pop() {
        if hi <= lo + 1 {
            continue;
        }
        let (idx, dmax) = (lo + 1..hi)
            .map(|i| (i, line_distance(points[i], points[lo], points[hi])))
            .fold((lo, -1.0f64), |best, cur| if cur.1 > best.1 { cur } else { best });

        if dmax > epsilon {
            kept.push(idx);
            stack.push((lo, idx));
            stack.push((idx, hi));
        }
    }

    kept.sort_unstable();
    keep.extend(kept);
}

/// Douglas-Peucker polygon simplification.
///
/// For closed curves the split point is the vertex farthest from the first
/// one, and both halves are simplified independently.
pub fn approx_polygon(points: &[Point], epsilon: f64, closed: bool) -> Vec<Point> {
    let n = points.len();
    if n < 3 || epsilon <= 0.0 {
        return points.to_vec();
    }

    let mut keep = Vec::new();
    if closed {
        let far = (1..n)
            .max_by(|&a, &b| {
                distance(points[0], points[a]).total_cmp(&distance(points[0], points[b]))
            })
            .unwrap_or(0);
        if far == 0 {
            return vec![points[0]];
        }
        // walk the ring as one open chain 0..=n where index n aliases 0
        let ring: Vec<Point> = points.iter().copied().chain(std::iter::once(points[0])).collect();
        simplify_chain(&ring, 0, far, epsilon, &mut keep);
        simplify_chain(&ring, far, n, epsilon, &mut keep);
        keep.iter().map(|&i| ring[i]).collect()
    } else {
        simplify_chain(points, 0, n - 1, epsilon, &mut keep);
        keep.push(n - 1);
        keep.iter().map(|&i| points[i]).collect()
    }
}

/// Convexity test accepting either winding
pub fn is_convex(points: &[Point]) -> bool {
    is_convex_with(points, ConvexityOrder::Any)
}

/// A polygon is convex when the cross product of consecutive edges never
/// changes sign and the edges turn through exactly one full revolution.
/// Zero cross products (collinear runs, repeated points) are ignored.
pub fn is_convex_with(points: &[Point], order: ConvexityOrder) -> bool {
    let mut points = points.to_vec();
    points.dedup();
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    let n = points.len();
    if n < 3 {
        return false;
    }

    let mut positive = false;
    let mut negative = false;
    let mut turning = 0.0f64;

    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        let c = points[(i + 2) % n];
        let z = cross(a, b, c);
        if z > 0 {
            positive = true;
        } else if z < 0 {
            negative = true;
        }
        if positive && negative {
            return false;
        }

        let e1 = ((b.x - a.x) as f64, (b.y - a.y) as f64);
        let e2 = ((c.x - b.x) as f64, (c.y - b.y) as f64);
        let dot = e1.0 * e2.0 + e1.1 * e2.1;
        turning += (z as f64).atan2(dot);
    }

    if !positive && !negative {
        // every vertex collinear
        return false;
    }

    // star polygons keep a constant turn sign but wind more than once
    if (turning.abs() - std::f64::consts::TAU).abs() > 1e-6 {
        return false;
    }

    match order {
        ConvexityOrder::Any => true,
        ConvexityOrder::Clockwise => positive,
        ConvexityOrder::CounterClockwise => negative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn test_area_and_winding() {
        let cw = pts(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let ccw: Vec<Point> = cw.iter().rev().copied().collect();
        assert_eq!(signed_area(&cw), 100.0);
        assert_eq!(signed_area(&ccw), -100.0);
        assert_eq!(contour_area(&ccw), 100.0);
    }

    #[test]
    fn test_area_degenerate() {
        assert_eq!(contour_area(&pts(&[(0, 0), (4, 4)])), 0.0);
        assert_eq!(contour_area(&pts(&[(0, 0), (2, 2), (4, 4)])), 0.0);
    }

    #[test]
    fn test_arc_length_open_and_closed() {
        let tri = pts(&[(0, 0), (3, 0), (3, 4)]);
        assert_eq!(arc_length(&tri, false), 7.0);
        assert_eq!(arc_length(&tri, true), 12.0);
        assert_eq!(arc_length(&tri[..1], true), 0.0);
    }

    #[test]
    fn test_convex_hull_drops_interior_and_collinear() {
        let cloud = pts(&[(0, 0), (5, 0), (10, 0), (10, 10), (5, 5), (0, 10), (2, 3)]);
        let hull = convex_hull(&cloud);
        assert_eq!(hull.len(), 4);
        for corner in pts(&[(0, 0), (10, 0), (10, 10), (0, 10)]) {
            assert!(hull.contains(&corner));
        }
        assert!(is_convex(&hull));
    }

    #[test]
    fn test_convex_hull_small_inputs() {
        assert!(convex_hull(&[]).is_empty());
        assert_eq!(convex_hull(&pts(&[(1, 1), (1, 1)])), pts(&[(1, 1)]));
    }

    #[test]
    fn test_is_convex_rejects_concave() {
        let arrow = pts(&[(0, 0), (10, 0), (5, 3), (10, 10), (0, 10)]);
        assert!(!is_convex(&arrow));
    }

    #[test]
    fn test_is_convex_rejects_star() {
        // pentagram: every turn has the same sign but it winds twice
        let star = pts(&[(0, -100), (59, 81), (-95, -31), (95, -31), (-59, 81)]);
        assert!(!is_convex(&star));
    }

    #[test]
    fn test_is_convex_order() {
        let cw = pts(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        let ccw: Vec<Point> = cw.iter().rev().copied().collect();
        assert!(is_convex_with(&cw, ConvexityOrder::Clockwise));
        assert!(!is_convex_with(&cw, ConvexityOrder::CounterClockwise));
        assert!(is_convex_with(&ccw, ConvexityOrder::CounterClockwise));
        assert!(is_convex_with(&ccw, ConvexityOrder::Any));
    }

    #[test]
    fn test_is_convex_tolerates_collinear_runs() {
        let square = pts(&[(0, 0), (5, 0), (10, 0), (10, 10), (0, 10)]);
        assert!(is_convex(&square));
    }

    #[test]
    fn test_approx_polygon_square_outline() {
        // dense outline of a 20x20 square
        let mut outline = Vec::new();
        for x in 0..20 {
            outline.push(Point::new(x, 0));
        }
        for y in 0..20 {
            outline.push(Point::new(20, y));
        }
        for x in (1..=20).rev() {
            outline.push(Point::new(x, 20));
        }
        for y in (1..=20).rev() {
            outline.push(Point::new(0, y));
        }
        let approx = approx_polygon(&outline, 1.0, true);
        assert_eq!(approx.len(), 4);
        assert_eq!(contour_area(&approx), 400.0);
    }

    #[test]
    fn test_approx_polygon_open_keeps_endpoints() {
        let line = pts(&[(0, 0), (1, 0), (2, 1), (3, 0), (4, 0)]);
        let approx = approx_polygon(&line, 5.0, false);
        assert_eq!(approx, pts(&[(0, 0), (4, 0)]));
    }

    #[test]
    fn test_approx_polygon_zero_epsilon_is_identity() {
        let tri = pts(&[(0, 0), (3, 0), (3, 4)]);
        assert_eq!(approx_polygon(&tri, 0.0, true), tri);
    }

    proptest! {
        #[test]
        fn prop_hull_perimeter_not_longer(coords in prop::collection::vec((-200i32..200, -200i32..200), 3..40)) {
            let points = pts(&coords);
            let hull = convex_hull(&points);
            prop_assume!(contour_area(&hull) > 0.0);
            prop_assert!(arc_length(&hull, true) <= arc_length(&points, true) + 1e-9);
        }

        #[test]
        fn prop_hull_is_convex(coords in prop::collection::vec((-200i32..200, -200i32..200), 3..40)) {
            let hull = convex_hull(&pts(&coords));
            prop_assume!(contour_area(&hull) > 0.0);
            prop_assert!(is_convex(&hull));
        }

        #[test]
        fn prop_approx_is_subset(coords in prop::collection::vec((-50i32..50, -50i32..50), 3..30), eps in 0.5f64..20.0) {
            let points = pts(&coords);
            let approx = approx_polygon(&points, eps, true);
            prop_assert!(approx.len() <= points.len());
            for p in &approx {
                prop_assert!(points.contains(p));
            }
        }
    }
}
