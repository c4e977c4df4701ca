use region_core::{approx_polygon, convex_hull, Contour, Moments};

use crate::types::RegionDescriptor;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Polygon approximation tolerance as a fraction of the raw contour's closed perimeter
pub const APPROX_EPSILON_FACTOR: f64 = 0.1;

/// How a raw traced contour is turned into the region that gets measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DescriptorStrategy {
    /// The traced contour as-is
    Unmodified,
    /// Convex hull of the traced contour
    #[default]
    ConvexHull,
    /// Douglas-Peucker simplification with a perimeter-relative tolerance
    PolygonApproximation,
}

impl DescriptorStrategy {
    pub const ALL: [DescriptorStrategy; 3] = [
        DescriptorStrategy::Unmodified,
        DescriptorStrategy::ConvexHull,
        DescriptorStrategy::PolygonApproximation,
    ];

    /// Region representation for one raw contour
    pub fn produce_region(&self, contour: &Contour) -> Contour {
        match self {
            DescriptorStrategy::Unmodified => contour.clone(),
            DescriptorStrategy::ConvexHull => Contour::new(convex_hull(contour.points())),
            DescriptorStrategy::PolygonApproximation => {
                let epsilon = APPROX_EPSILON_FACTOR * contour.perimeter();
                Contour::new(approx_polygon(contour.points(), epsilon, true))
            }
        }
    }

    /// Representation plus its moments and convexity
    pub fn describe(&self, contour: &Contour) -> RegionDescriptor {
        let region = self.produce_region(contour);
        let moments = Moments::from_points(region.points());
        let is_convex = region.is_convex();
        RegionDescriptor::new(region, moments, is_convex)
    }

    /// Describe every contour, preserving detection order
    pub fn describe_all(&self, contours: &[Contour]) -> Vec<RegionDescriptor> {
        contours.iter().map(|c| self.describe(c)).collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            DescriptorStrategy::Unmodified => "unmodified",
            DescriptorStrategy::ConvexHull => "convex-hull",
            DescriptorStrategy::PolygonApproximation => "polygon-approximation",
        }
    }
}

impl std::fmt::Display for DescriptorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
