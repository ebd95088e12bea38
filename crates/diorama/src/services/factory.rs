//! Element construction from descriptors.

use diorama_core::{
    error::ModelError,
    geometry::{Bounds, Point, Size},
    identifier::Id,
    model::{
        Connection, ConnectionDescriptor, DEFAULT_CONNECTION_KIND, DEFAULT_SHAPE_KIND, Diagram,
        Shape, ShapeDescriptor,
    },
};

/// Size given to shapes created without explicit dimensions.
pub const DEFAULT_SHAPE_SIZE: Size = Size::new(100.0, 80.0);

/// Builds detached elements and hands out fresh ids.
///
/// Generated ids follow the `shape_N`/`connection_N` pattern and skip any id
/// already present in the diagram. The counters only grow, so ids handed
/// out but not yet added are never reused.
#[derive(Debug, Default)]
pub struct ElementFactory {
    next_shape: usize,
    next_connection: usize,
}

impl ElementFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an unused shape id.
    pub fn next_shape_id(&mut self, diagram: &Diagram) -> Id {
        next_free(diagram, "shape", &mut self.next_shape)
    }

    /// Returns an unused connection id.
    pub fn next_connection_id(&mut self, diagram: &Diagram) -> Id {
        next_free(diagram, "connection", &mut self.next_connection)
    }

    /// Builds a shape from `descriptor`.
    ///
    /// Geometry missing from the descriptor is taken from `fallback`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::DuplicateId`] if the descriptor names an id that
    /// is in use, and [`ModelError::InvalidGeometry`] if the resolved bounds
    /// are not finite or have a negative size.
    pub fn create_shape(
        &mut self,
        diagram: &Diagram,
        descriptor: &ShapeDescriptor,
        fallback: Bounds,
    ) -> Result<Shape, ModelError> {
        let id = match descriptor.id {
            Some(id) if diagram.contains(id) => return Err(ModelError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_shape_id(diagram),
        };

        let bounds = Bounds::new_from_top_left(
            Point::new(
                descriptor.x.unwrap_or(fallback.x()),
                descriptor.y.unwrap_or(fallback.y()),
            ),
            Size::new(
                descriptor.width.unwrap_or(fallback.width()),
                descriptor.height.unwrap_or(fallback.height()),
            ),
        );
        if !bounds.is_valid() {
            return Err(ModelError::InvalidGeometry {
                id,
                reason: format!(
                    "requested ({}, {}, {}x{}) must be finite with a non-negative size",
                    bounds.x(),
                    bounds.y(),
                    bounds.width(),
                    bounds.height()
                ),
            });
        }

        let kind = descriptor.kind.as_deref().unwrap_or(DEFAULT_SHAPE_KIND);
        let shape = descriptor.attrs.iter().fold(
            Shape::new(id, kind, bounds)
                .with_hidden(descriptor.hidden)
                .with_collapsed(descriptor.resolved_collapsed()),
            |shape, (key, value)| shape.with_attr(key.as_str(), value.as_str()),
        );
        Ok(shape)
    }

    /// Builds a connection from `descriptor`.
    ///
    /// Without waypoints the connection runs between the centers of its
    /// endpoints.
    pub fn create_connection(
        &mut self,
        diagram: &Diagram,
        descriptor: &ConnectionDescriptor,
        source: Id,
        target: Id,
    ) -> Result<Connection, ModelError> {
        let id = match descriptor.id {
            Some(id) if diagram.contains(id) => return Err(ModelError::DuplicateId(id)),
            Some(id) => id,
            None => self.next_connection_id(diagram),
        };

        let waypoints = if descriptor.waypoints.is_empty() {
            vec![diagram.shape(source)?.mid(), diagram.shape(target)?.mid()]
        } else {
            descriptor.waypoints.clone()
        };
        if waypoints.len() < 2 {
            return Err(ModelError::InvalidWaypoints {
                id,
                count: waypoints.len(),
            });
        }

        let kind = descriptor.kind.as_deref().unwrap_or(DEFAULT_CONNECTION_KIND);
        Ok(Connection::new(id, kind, source, target, waypoints))
    }
}

fn next_free(diagram: &Diagram, prefix: &str, counter: &mut usize) -> Id {
    loop {
        *counter += 1;
        let id = Id::with_prefix(prefix, *counter);
        if !diagram.contains(id) {
            return id;
        }
    }
}
