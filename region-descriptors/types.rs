use region_core::{Contour, Moments};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A region representation together with its moments and convexity.
/// Built once per detected contour by a [`crate::DescriptorStrategy`].
#[derive(Debug, Clone, PartialEq)]
pub struct RegionDescriptor {
    contour: Contour,
    moments: Moments,
    is_convex: bool,
}

impl RegionDescriptor {
    pub fn new(contour: Contour, moments: Moments, is_convex: bool) -> Self {
        Self { contour, moments, is_convex }
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    pub fn moments(&self) -> &Moments {
        &self.moments
    }

    pub fn is_convex(&self) -> bool {
        self.is_convex
    }
}

/// Measurements of one region, the unit written to CSV
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageDescriptor {
    pub area: f64,
    pub perimeter: f64,
    /// `4 pi area / perimeter^2`, 1.0 for a circle
    pub roundness: f64,
    /// Principal axis angle in degrees, range set by the configured convention
    pub orientation: f64,
    /// Centre of mass, truncated toward zero
    pub centroid: (i32, i32),
    pub is_convex: bool,
    /// Log-scaled Hu invariants when enabled
    pub hu_moments: Option<[f64; 7]>,
}

impl std::fmt::Display for ImageDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", "-".repeat(80))?;
        writeln!(f, "\t\tArea: {}", self.area)?;
        writeln!(f, "\t\tPerimeter: {}", self.perimeter)?;
        writeln!(f, "\t\tRoundness: {}", self.roundness)?;
        writeln!(f, "\t\tOrientation: {}", self.orientation)?;
        writeln!(f, "\t\tCentroid: [{},{}]", self.centroid.0, self.centroid.1)?;
        if let Some(hu) = &self.hu_moments {
            let values: Vec<String> = hu.iter().map(|h| format!("{:.4}", h)).collect();
            writeln!(f, "\t\tHu moments: [{}]", values.join(", "))?;
        }
        let convex = if self.is_convex { "convex" } else { "not convex" };
        writeln!(f, "\t\tThe region is {}", convex)?;
        writeln!(f, "{}", "-".repeat(80))
    }
}
