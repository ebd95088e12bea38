//! Connection endpoints and routing.

use log::trace;

use diorama_core::{
    geometry::Point,
    identifier::Id,
    model::{ConnectionEnd, Diagram},
};

use crate::{
    DioramaError,
    command::{CommandHandler, Scope},
    services::LayoutHints,
};

/// Docks one end of a connection at another shape.
///
/// With a docking point the matching terminal waypoint is replaced by it.
#[derive(Debug)]
pub struct ReconnectHandler {
    connection: Id,
    end: ConnectionEnd,
    new_shape: Id,
    docking: Option<Point>,
    old_shape: Option<Id>,
    old_waypoints: Vec<Point>,
}

impl ReconnectHandler {
    pub fn new(connection: Id, end: ConnectionEnd, new_shape: Id, docking: Option<Point>) -> Self {
        Self {
            connection,
            end,
            new_shape,
            docking,
            old_shape: None,
            old_waypoints: Vec::new(),
        }
    }

    pub fn start(connection: Id, new_source: Id, docking: Option<Point>) -> Self {
        Self::new(connection, ConnectionEnd::Start, new_source, docking)
    }

    pub fn end(connection: Id, new_target: Id, docking: Option<Point>) -> Self {
        Self::new(connection, ConnectionEnd::End, new_target, docking)
    }
}

impl CommandHandler for ReconnectHandler {
    fn name(&self) -> &'static str {
        match self.end {
            ConnectionEnd::Start => "connection.reconnectStart",
            ConnectionEnd::End => "connection.reconnectEnd",
        }
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.connection, self.new_shape]
    }

    fn pre_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        scope.diagram().connection(self.connection)?;
        scope.diagram().shape(self.new_shape)?;
        if self.docking.is_some_and(|point| !point.is_finite()) {
            return Err(DioramaError::invalid_request("docking point must be finite"));
        }
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let mut waypoints = diagram.connection(self.connection)?.waypoints().to_vec();
        let old_shape = diagram.set_endpoint(self.connection, self.end, self.new_shape)?;
        self.old_shape = Some(old_shape);

        if let Some(docking) = self.docking {
            let terminal = match self.end {
                ConnectionEnd::Start => waypoints.first_mut(),
                ConnectionEnd::End => waypoints.last_mut(),
            };
            if let Some(point) = terminal {
                *point = docking;
            }
        }
        self.old_waypoints = diagram.set_waypoints(self.connection, waypoints)?;

        Ok(vec![self.connection, old_shape, self.new_shape])
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let Some(old_shape) = self.old_shape else {
            return Ok(Vec::new());
        };
        diagram.set_endpoint(self.connection, self.end, old_shape)?;
        diagram.set_waypoints(self.connection, self.old_waypoints.clone())?;
        Ok(vec![self.connection, old_shape, self.new_shape])
    }
}

/// Re-routes a connection through the configured layouter.
///
/// The waypoints are computed in `pre_execute`, so redo re-applies exactly
/// the same route.
#[derive(Debug)]
pub struct LayoutConnectionHandler {
    connection: Id,
    hints: LayoutHints,
    new_waypoints: Vec<Point>,
    old_waypoints: Vec<Point>,
}

impl LayoutConnectionHandler {
    pub fn new(connection: Id, hints: LayoutHints) -> Self {
        Self {
            connection,
            hints,
            new_waypoints: Vec::new(),
            old_waypoints: Vec::new(),
        }
    }
}

impl CommandHandler for LayoutConnectionHandler {
    fn name(&self) -> &'static str {
        "connection.layout"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.connection]
    }

    fn pre_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        self.new_waypoints =
            scope
                .layouter()
                .layout_connection(scope.diagram(), self.connection, self.hints)?;
        trace!(connection:% = self.connection, waypoints = self.new_waypoints.len(); "Connection laid out");
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        self.old_waypoints = diagram.set_waypoints(self.connection, self.new_waypoints.clone())?;
        Ok(vec![self.connection])
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        diagram.set_waypoints(self.connection, self.old_waypoints.clone())?;
        Ok(vec![self.connection])
    }
}
