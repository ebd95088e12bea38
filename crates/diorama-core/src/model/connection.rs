//! Connections: directed wires between two shapes.

use crate::{
    geometry::{Bounds, Point},
    identifier::Id,
};

/// Which end of a connection an operation refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionEnd {
    /// The source side, docked at the first waypoint.
    Start,
    /// The target side, docked at the last waypoint.
    End,
}

/// A directed edge carrying routing waypoints.
///
/// `source` and `target` are referential; the matching `outgoing`/`incoming`
/// entries on the endpoint shapes are maintained by
/// [`Diagram`](super::Diagram).
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    id: Id,
    kind: String,
    waypoints: Vec<Point>,
    hidden: bool,
    pub(super) parent: Option<Id>,
    pub(super) source: Id,
    pub(super) target: Id,
}

impl Connection {
    /// Creates a detached connection between `source` and `target`.
    ///
    /// The endpoints are only registered on the shapes once the connection is
    /// added to a diagram.
    pub fn new(id: Id, kind: impl Into<String>, source: Id, target: Id, waypoints: Vec<Point>) -> Self {
        Self {
            id,
            kind: kind.into(),
            waypoints,
            hidden: false,
            parent: None,
            source,
            target,
        }
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn source(&self) -> Id {
        self.source
    }

    pub fn target(&self) -> Id {
        self.target
    }

    /// Returns the shape docked at the given end.
    pub fn endpoint(&self, end: ConnectionEnd) -> Id {
        match end {
            ConnectionEnd::Start => self.source,
            ConnectionEnd::End => self.target,
        }
    }

    pub fn parent(&self) -> Option<Id> {
        self.parent
    }

    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Returns the waypoint docked at the given end.
    pub fn docking(&self, end: ConnectionEnd) -> Option<Point> {
        match end {
            ConnectionEnd::Start => self.waypoints.first().copied(),
            ConnectionEnd::End => self.waypoints.last().copied(),
        }
    }

    pub(super) fn replace_waypoints(&mut self, waypoints: Vec<Point>) -> Vec<Point> {
        std::mem::replace(&mut self.waypoints, waypoints)
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Returns the bounding box of the waypoints.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_points(self.waypoints.iter().copied()).unwrap_or_default()
    }
}
