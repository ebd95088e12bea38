//! The graph model: shapes, connections and the diagram that owns them.

mod connection;
mod descriptor;
mod diagram;
mod element;
mod shape;

pub use connection::{Connection, ConnectionEnd};
pub use descriptor::{
    ConnectionDescriptor, DEFAULT_CONNECTION_KIND, DEFAULT_SHAPE_KIND, ShapeDescriptor,
};
pub use diagram::{Diagram, ROOT_KIND};
pub use element::Element;
pub use shape::Shape;
