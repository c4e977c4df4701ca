use region_core::Moments;

use crate::config::AngleConvention;
use crate::error::{DegenerateKind, DescriptorResult};
use crate::types::{ImageDescriptor, RegionDescriptor};

/// Centre of mass truncated toward zero, `None` for a zero-area region
pub fn centroid(moments: &Moments) -> Option<(i32, i32)> {
    moments
        .centroid()
        .map(|(cx, cy)| (cx as i32, cy as i32))
}

/// `4 pi area / perimeter^2`; NaN when the perimeter is zero
pub fn roundness(area: f64, perimeter: f64) -> f64 {
    if perimeter == 0.0 {
        return f64::NAN;
    }
    4.0 * std::f64::consts::PI * area / (perimeter * perimeter)
}

/// Principal axis angle in degrees from the central moments
pub fn orientation(moments: &Moments, convention: AngleConvention) -> f64 {
    let mu = moments.central();
    let num = 2.0 * mu.mu11;
    let den = mu.mu20 - mu.mu02;

    // isotropic region, no principal axis
    if num == 0.0 && den == 0.0 {
        return 0.0;
    }

    let degrees = (0.5 * (num / den).atan()).to_degrees();
    match convention {
        AngleConvention::Signed => degrees,
        AngleConvention::Unsigned if degrees < 0.0 => degrees + 180.0,
        AngleConvention::Unsigned => degrees,
    }
}

/// Raw invariants smaller than this are treated as zero
pub const HU_ZERO_TOLERANCE: f64 = 1e-20;

/// `-sign(h) * log10(|h|)` per invariant; near-zero or non-finite inputs map to 0
pub fn log_scaled_hu(raw: &[f64; 7]) -> [f64; 7] {
    raw.map(|h| {
        if h.abs() < HU_ZERO_TOLERANCE || !h.is_finite() {
            0.0
        } else {
            -h.signum() * h.abs().log10()
        }
    })
}

/// Turns region representations into measured descriptors
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptorCalculator {
    angle_convention: AngleConvention,
    hu_moments: bool,
}

impl DescriptorCalculator {
    pub fn new(angle_convention: AngleConvention, hu_moments: bool) -> Self {
        Self { angle_convention, hu_moments }
    }

    pub fn angle_convention(&self) -> AngleConvention {
        self.angle_convention
    }

    pub fn computes_hu_moments(&self) -> bool {
        self.hu_moments
    }

    /// Measure one region. Degenerate geometry is reported, never papered
    /// over with NaN; pipelines skip such regions.
    pub fn compute_descriptor(&self, region: &RegionDescriptor) -> DescriptorResult<ImageDescriptor> {
        let contour = region.contour();
        if !contour.is_measurable() {
            return Err(DegenerateKind::TooFewPoints(contour.len()).into());
        }

        let area = contour.area();
        if area == 0.0 {
            return Err(DegenerateKind::ZeroArea.into());
        }

        let perimeter = contour.perimeter();
        if perimeter == 0.0 {
            return Err(DegenerateKind::ZeroPerimeter.into());
        }

        let moments = region.moments();
        let centroid = centroid(moments).ok_or(DegenerateKind::ZeroArea)?;

        let hu_moments = self.hu_moments.then(|| log_scaled_hu(&moments.hu()));

        Ok(ImageDescriptor {
            area,
            perimeter,
            roundness: roundness(area, perimeter),
            orientation: orientation(moments, self.angle_convention),
            centroid,
            is_convex: region.is_convex(),
            hu_moments,
        })
    }
}
