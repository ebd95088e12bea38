//! Connection routing after one of its endpoints moved or changed.

use diorama_core::{
    error::ModelError,
    geometry::Point,
    identifier::Id,
    model::{ConnectionEnd, Diagram},
};

/// Which ends of a connection need to be re-evaluated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutHints {
    pub start_changed: bool,
    pub end_changed: bool,
}

impl LayoutHints {
    pub fn start_changed() -> Self {
        Self {
            start_changed: true,
            end_changed: false,
        }
    }

    pub fn end_changed() -> Self {
        Self {
            start_changed: false,
            end_changed: true,
        }
    }

    pub fn changed(self, end: ConnectionEnd) -> bool {
        match end {
            ConnectionEnd::Start => self.start_changed,
            ConnectionEnd::End => self.end_changed,
        }
    }
}

/// Computes new waypoints for a connection.
///
/// The layouter only reads the diagram; the returned waypoints are applied
/// by a reversible command.
pub trait Layouter {
    fn layout_connection(
        &self,
        diagram: &Diagram,
        connection: Id,
        hints: LayoutHints,
    ) -> Result<Vec<Point>, ModelError>;
}

/// Keeps every waypoint, re-docking a changed end at its shape's center
/// when the current docking point fell outside the shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct DockingLayouter;

impl Layouter for DockingLayouter {
    fn layout_connection(
        &self,
        diagram: &Diagram,
        connection: Id,
        hints: LayoutHints,
    ) -> Result<Vec<Point>, ModelError> {
        let connection = diagram.connection(connection)?;
        let mut waypoints = connection.waypoints().to_vec();

        for end in [ConnectionEnd::Start, ConnectionEnd::End] {
            if !hints.changed(end) {
                continue;
            }
            let shape = diagram.shape(connection.endpoint(end))?;
            let docking = match end {
                ConnectionEnd::Start => waypoints.first_mut(),
                ConnectionEnd::End => waypoints.last_mut(),
            };
            if let Some(point) = docking {
                if !shape.bounds().contains_point(*point) {
                    *point = shape.mid();
                }
            }
        }

        Ok(waypoints)
    }
}
