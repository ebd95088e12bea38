//! Bounding boxes around groups of elements.

use diorama_core::{
    geometry::{Bounds, Insets},
    model::Element,
};

/// Computes the rectangle enclosing a group of elements.
pub trait BoundsComputer {
    /// Returns the enclosing rectangle of `elements`.
    ///
    /// Callers pass a non-empty slice; an empty one yields default bounds.
    fn compute_bbox(&self, elements: &[&Element]) -> Bounds;
}

/// Encloses shapes and connection waypoints, then pads every side.
///
/// With a positive padding the result strictly contains every input.
#[derive(Debug, Clone, Copy)]
pub struct ChildrenBounds {
    padding: Insets,
}

impl ChildrenBounds {
    pub fn new(padding: f32) -> Self {
        Self {
            padding: Insets::uniform(padding),
        }
    }
}

impl Default for ChildrenBounds {
    fn default() -> Self {
        Self::new(10.0)
    }
}

impl BoundsComputer for ChildrenBounds {
    fn compute_bbox(&self, elements: &[&Element]) -> Bounds {
        elements
            .iter()
            .map(|element| element.bounds())
            .reduce(|acc, bounds| acc.merge(&bounds))
            .map(|bounds| bounds.add_padding(self.padding))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use diorama_core::{geometry::Point, identifier::Id, model::{Connection, Shape}};
    use float_cmp::assert_approx_eq;

    use super::*;

    fn shape(name: &str, bounds: Bounds) -> Element {
        Shape::new(Id::new(name), "task", bounds).into()
    }

    #[test]
    fn test_padded_union_of_shapes() {
        let a = shape("a", Bounds::new(150.0, 110.0, 100.0, 100.0));
        let b = shape("b", Bounds::new(50.0, 50.0, 100.0, 100.0));
        let c = shape("c", Bounds::new(325.0, 425.0, 100.0, 100.0));

        let bbox = ChildrenBounds::default().compute_bbox(&[&a, &b, &c]);

        assert_approx_eq!(f32, bbox.x(), 40.0);
        assert_approx_eq!(f32, bbox.y(), 40.0);
        assert_approx_eq!(f32, bbox.max_x(), 435.0);
        assert_approx_eq!(f32, bbox.max_y(), 535.0);
        for element in [&a, &b, &c] {
            assert!(bbox.strictly_contains(element.bounds()));
        }
    }

    #[test]
    fn test_connections_contribute_waypoints() {
        let a = shape("a", Bounds::new(0.0, 0.0, 10.0, 10.0));
        let flow: Element = Connection::new(
            Id::new("flow"),
            "connection",
            Id::new("a"),
            Id::new("b"),
            vec![Point::new(5.0, 5.0), Point::new(80.0, 5.0)],
        )
        .into();

        let bbox = ChildrenBounds::new(0.0).compute_bbox(&[&a, &flow]);
        assert_approx_eq!(f32, bbox.width(), 80.0);
        assert_approx_eq!(f32, bbox.height(), 10.0);
    }

    #[test]
    fn test_empty_input_yields_default() {
        assert_eq!(ChildrenBounds::default().compute_bbox(&[]), Bounds::default());
    }
}
