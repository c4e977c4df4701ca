use proptest::prelude::*;
use region_descriptors::{AngleConvention, Contour, DescriptorCalculator, DescriptorStrategy};

fn contour_strategy() -> impl Strategy<Value = Contour> {
    prop::collection::vec((0i32..500, 0i32..500), 3..40).prop_map(|coords| Contour::from_coords(&coords))
}

proptest! {
    #[test]
    fn hull_roundness_is_bounded(contour in contour_strategy()) {
        let calculator = DescriptorCalculator::new(AngleConvention::Signed, true);
        let region = DescriptorStrategy::ConvexHull.describe(&contour);
        if let Ok(d) = calculator.compute_descriptor(&region) {
            prop_assert!(d.roundness > 0.0 && d.roundness <= 1.05, "roundness {}", d.roundness);
            prop_assert!(d.is_convex);
        }
    }

    #[test]
    fn hull_perimeter_never_exceeds_contour(contour in contour_strategy()) {
        let hull = DescriptorStrategy::ConvexHull.produce_region(&contour);
        prop_assert!(hull.perimeter() <= contour.perimeter() + 1e-9);
    }

    #[test]
    fn unmodified_descriptor_is_idempotent(contour in contour_strategy()) {
        let calculator = DescriptorCalculator::new(AngleConvention::Unsigned, true);
        let first = calculator.compute_descriptor(&DescriptorStrategy::Unmodified.describe(&contour));
        let second = calculator.compute_descriptor(&DescriptorStrategy::Unmodified.describe(&contour));
        match (first, second) {
            (Ok(a), Ok(b)) => {
                prop_assert_eq!(a.area.to_bits(), b.area.to_bits());
                prop_assert_eq!(a.perimeter.to_bits(), b.perimeter.to_bits());
                prop_assert_eq!(a.roundness.to_bits(), b.roundness.to_bits());
                prop_assert_eq!(a.orientation.to_bits(), b.orientation.to_bits());
                prop_assert_eq!(a.centroid, b.centroid);
                prop_assert_eq!(a.hu_moments.map(|h| h.map(f64::to_bits)), b.hu_moments.map(|h| h.map(f64::to_bits)));
            }
            (Err(_), Err(_)) => {}
            _ => prop_assert!(false, "outcome differs between runs"),
        }
    }

    #[test]
    fn approximation_never_adds_points(contour in contour_strategy()) {
        let approx = DescriptorStrategy::PolygonApproximation.produce_region(&contour);
        prop_assert!(approx.len() <= contour.len());
        prop_assert!(approx.iter().all(|p| contour.points().contains(p)));
    }
}
