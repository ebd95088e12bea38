//! Shapes: positioned nodes of the containment tree.

use indexmap::{IndexMap, IndexSet};

use crate::{
    geometry::{Bounds, Point},
    identifier::Id,
};

/// A node in the containment tree.
///
/// Relation fields (`parent`, `children`, `host`, `attachers`, `incoming`,
/// `outgoing`) are only writable through [`Diagram`](super::Diagram), which
/// keeps both sides of every relation in sync. Visual state (`bounds`,
/// `hidden`, `collapsed`) and custom attributes are freely writable.
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    id: Id,
    kind: String,
    bounds: Bounds,
    hidden: bool,
    collapsed: bool,
    attrs: IndexMap<String, String>,
    pub(super) parent: Option<Id>,
    pub(super) children: IndexSet<Id>,
    pub(super) host: Option<Id>,
    pub(super) attachers: IndexSet<Id>,
    pub(super) incoming: IndexSet<Id>,
    pub(super) outgoing: IndexSet<Id>,
}

impl Shape {
    /// Creates a detached, visible, expanded shape.
    pub fn new(id: Id, kind: impl Into<String>, bounds: Bounds) -> Self {
        Self {
            id,
            kind: kind.into(),
            bounds,
            hidden: false,
            collapsed: false,
            attrs: IndexMap::new(),
            parent: None,
            children: IndexSet::new(),
            host: None,
            attachers: IndexSet::new(),
            incoming: IndexSet::new(),
            outgoing: IndexSet::new(),
        }
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = collapsed;
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Bounds) {
        self.bounds = bounds;
    }

    pub fn x(&self) -> f32 {
        self.bounds.x()
    }

    pub fn y(&self) -> f32 {
        self.bounds.y()
    }

    pub fn width(&self) -> f32 {
        self.bounds.width()
    }

    pub fn height(&self) -> f32 {
        self.bounds.height()
    }

    /// Returns the center of the shape, where connections dock by default.
    pub fn mid(&self) -> Point {
        self.bounds.center()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.collapsed = collapsed;
    }

    /// Returns a custom attribute carried over from the shape's descriptor.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    pub fn attrs(&self) -> &IndexMap<String, String> {
        &self.attrs
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn children(&self) -> &IndexSet<Id> {
        &self.children
    }

    /// Returns the shape this one is visually attached to, if any.
    pub fn host(&self) -> Option<Id> {
        self.host
    }

    /// Returns the shapes attached to this one.
    pub fn attachers(&self) -> &IndexSet<Id> {
        &self.attachers
    }

    pub fn incoming(&self) -> &IndexSet<Id> {
        &self.incoming
    }

    pub fn outgoing(&self) -> &IndexSet<Id> {
        &self.outgoing
    }

    /// Returns true when no relation points at or away from this shape.
    pub fn is_detached(&self) -> bool {
        self.parent.is_none()
            && self.children.is_empty()
            && self.host.is_none()
            && self.attachers.is_empty()
            && self.incoming.is_empty()
            && self.outgoing.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_shape_is_detached_and_visible() {
        let shape = Shape::new(Id::new("task"), "task", Bounds::new(10.0, 20.0, 100.0, 80.0));

        assert!(shape.is_detached());
        assert!(!shape.is_hidden());
        assert!(!shape.is_collapsed());
        assert_eq!(shape.x(), 10.0);
        assert_eq!(shape.height(), 80.0);
        assert_eq!(shape.mid(), Point::new(60.0, 60.0));
    }

    #[test]
    fn test_builders_and_attrs() {
        let shape = Shape::new(Id::new("sub"), "subprocess", Bounds::default())
            .with_hidden(true)
            .with_collapsed(true)
            .with_attr("label", "Review");

        assert!(shape.is_hidden());
        assert!(shape.is_collapsed());
        assert_eq!(shape.attr("label"), Some("Review"));
        assert_eq!(shape.attr("missing"), None);
    }
}
