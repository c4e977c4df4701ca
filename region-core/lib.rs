pub mod geometry;
pub mod moments;

pub use geometry::{
    approx_polygon, arc_length, contour_area, convex_hull, is_convex, is_convex_with,
    signed_area, ConvexityOrder,
};
pub use moments::{CentralMoments, Moments, NormalizedMoments};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Integer pixel position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounds of a point set, both corners inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn of(points: &[Point]) -> Option<Self> {
        let first = *points.first()?;
        Some(points.iter().fold(Self { min: first, max: first }, |b, p| Self {
            min: Point::new(b.min.x.min(p.x), b.min.y.min(p.y)),
            max: Point::new(b.max.x.max(p.x), b.max.y.max(p.y)),
        }))
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{},{}]..[{},{}]", self.min.x, self.min.y, self.max.x, self.max.y)
    }
}

/// Ordered, closed boundary of a region. The last point connects back to the first.
///
/// Winding is whatever the producer emitted; nothing here normalizes it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Contour {
    points: Vec<Point>,
}

impl Contour {
    /// Smallest point count for which area, perimeter and moments are meaningful
    pub const MIN_MEASURABLE_POINTS: usize = 3;

    pub fn new(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn from_coords(coords: &[(i32, i32)]) -> Self {
        Self {
            points: coords.iter().copied().map(Point::from).collect(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn is_measurable(&self) -> bool {
        self.points.len() >= Self::MIN_MEASURABLE_POINTS
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Absolute enclosed area (shoelace)
    pub fn area(&self) -> f64 {
        contour_area(&self.points)
    }

    /// Closed perimeter, including the edge from the last point back to the first
    pub fn perimeter(&self) -> f64 {
        arc_length(&self.points, true)
    }

    pub fn moments(&self) -> Moments {
        Moments::from_points(&self.points)
    }

    /// `None` for an empty contour
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::of(&self.points)
    }

    pub fn convex_hull(&self) -> Contour {
        Contour::new(convex_hull(&self.points))
    }

    pub fn is_convex(&self) -> bool {
        is_convex(&self.points)
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self::new(points)
    }
}

impl<'a> IntoIterator for &'a Contour {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Scale-space keypoint, coordinates in the base image frame
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keypoint {
    pub x: f32,
    pub y: f32,
    /// Diameter of the meaningful neighbourhood
    pub size: f32,
    /// Degrees in [0, 360)
    pub angle: f32,
    pub response: f32,
    /// Pyramid level the keypoint was detected on
    pub octave: i32,
    pub class_id: i32,
}

impl Keypoint {
    /// Class id for keypoints that were never assigned to an object
    pub const NO_CLASS: i32 = -1;
}

/// 256-bit binary descriptor = 32 bytes
pub type Descriptor = [u8; 32];

/// Default worker count for parallel stages
pub fn default_threads() -> usize {
    num_cpus::get().max(1)
}

/// Initialize Rayon thread pool with the specified number of threads
pub fn init_thread_pool(n_threads: usize) -> Result<(), rayon::ThreadPoolBuildError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(n_threads)
        .build_global()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contour_measurability() {
        let line = Contour::from_coords(&[(0, 0), (5, 5)]);
        assert!(!line.is_measurable());

        let tri = Contour::from_coords(&[(0, 0), (5, 0), (0, 5)]);
        assert!(tri.is_measurable());
        assert_eq!(tri.len(), 3);
    }

    #[test]
    fn test_contour_square_measures() {
        let square = Contour::from_coords(&[(0, 0), (10, 0), (10, 10), (0, 10)]);
        assert_eq!(square.area(), 100.0);
        assert_eq!(square.perimeter(), 40.0);
        assert!(square.is_convex());
        assert_eq!(square.moments().m00, 100.0);
    }

    #[test]
    fn test_bounding_box() {
        assert_eq!(Contour::default().bounding_box(), None);

        let tri = Contour::from_coords(&[(3, -2), (10, 4), (-1, 7)]);
        let bounds = tri.bounding_box().unwrap();
        assert_eq!(bounds.min, Point::new(-1, -2));
        assert_eq!(bounds.max, Point::new(10, 7));
        assert_eq!(bounds.to_string(), "[-1,-2]..[10,7]");
    }

    #[test]
    fn test_default_threads_positive() {
        assert!(default_threads() >= 1);
    }
}
