//! The element sum type stored by the diagram.

use crate::{geometry::Bounds, identifier::Id};

use super::{Connection, Shape};

/// Any element of the diagram: shapes and connections share one id space and
/// can both be children of a shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Shape(Shape),
    Connection(Connection),
}

impl Element {
    pub fn id(&self) -> Id {
        match self {
            Element::Shape(shape) => shape.id(),
            Element::Connection(connection) => connection.id(),
        }
    }

    pub fn parent(&self) -> Option<Id> {
        match self {
            Element::Shape(shape) => shape.parent(),
            Element::Connection(connection) => connection.parent(),
        }
    }

    pub(super) fn set_parent(&mut self, parent: Option<Id>) {
        match self {
            Element::Shape(shape) => shape.parent = parent,
            Element::Connection(connection) => connection.parent = parent,
        }
    }

    pub fn is_hidden(&self) -> bool {
        match self {
            Element::Shape(shape) => shape.is_hidden(),
            Element::Connection(connection) => connection.is_hidden(),
        }
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        match self {
            Element::Shape(shape) => shape.set_hidden(hidden),
            Element::Connection(connection) => connection.set_hidden(hidden),
        }
    }

    /// Returns the shape bounds, or the waypoint bounding box for connections.
    pub fn bounds(&self) -> Bounds {
        match self {
            Element::Shape(shape) => shape.bounds(),
            Element::Connection(connection) => connection.bounds(),
        }
    }

    pub fn as_shape(&self) -> Option<&Shape> {
        match self {
            Element::Shape(shape) => Some(shape),
            Element::Connection(_) => None,
        }
    }

    pub fn as_connection(&self) -> Option<&Connection> {
        match self {
            Element::Connection(connection) => Some(connection),
            Element::Shape(_) => None,
        }
    }

    pub fn is_shape(&self) -> bool {
        matches!(self, Element::Shape(_))
    }
}

impl From<Shape> for Element {
    fn from(shape: Shape) -> Self {
        Element::Shape(shape)
    }
}

impl From<Connection> for Element {
    fn from(connection: Connection) -> Self {
        Element::Connection(connection)
    }
}
