use plotkit_toolpath::{BoundingExtent, BoundsCalculator, MachineCodes, ToolpathDocument};
use proptest::prelude::*;

fn render(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("G01 X{} Y{}\n", x, y))
        .collect()
}

proptest! {
    #[test]
    fn extent_is_non_negative_and_monotone(
        points in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..40)
    ) {
        let codes = MachineCodes::default();
        let mut previous = BoundingExtent::new();

        for end in 1..=points.len() {
            let document = ToolpathDocument::parse(&render(&points[..end]), &codes).document;
            let extent = BoundsCalculator::calculate(&document);

            prop_assert!(extent.max_positive_x >= 0.0);
            prop_assert!(extent.max_negative_x >= 0.0);
            prop_assert!(extent.max_positive_y >= 0.0);
            prop_assert!(extent.max_negative_y >= 0.0);
            prop_assert!(extent.max_positive_x >= previous.max_positive_x);
            prop_assert!(extent.max_negative_x >= previous.max_negative_x);
            prop_assert!(extent.max_positive_y >= previous.max_positive_y);
            prop_assert!(extent.max_negative_y >= previous.max_negative_y);
            previous = extent;
        }
    }

    #[test]
    fn span_covers_every_point(
        points in prop::collection::vec((-500.0f64..500.0, -500.0f64..500.0), 1..40)
    ) {
        let document =
            ToolpathDocument::parse(&render(&points), &MachineCodes::default()).document;
        let extent = BoundsCalculator::calculate(&document);

        for (x, y) in points {
            prop_assert!(x <= extent.max_positive_x);
            prop_assert!(-x <= extent.max_negative_x);
            prop_assert!(y <= extent.max_positive_y);
            prop_assert!(-y <= extent.max_negative_y);
        }
    }
}
