//! Adding new shapes and connections.

use diorama_core::{
    identifier::Id,
    model::{Connection, Diagram, Shape},
};

use crate::{DioramaError, command::CommandHandler};

/// Adds a detached shape under a parent.
#[derive(Debug)]
pub struct CreateShapeHandler {
    shape: Shape,
    parent: Id,
}

impl CreateShapeHandler {
    pub fn new(shape: Shape, parent: Id) -> Self {
        Self { shape, parent }
    }
}

impl CommandHandler for CreateShapeHandler {
    fn name(&self) -> &'static str {
        "shape.create"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.shape.id()]
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        diagram.add_shape(self.shape.clone(), self.parent, None)?;
        Ok(vec![self.shape.id(), self.parent])
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        diagram.remove_shape(self.shape.id())?;
        Ok(vec![self.shape.id(), self.parent])
    }
}

/// Adds a connection between two existing shapes.
#[derive(Debug)]
pub struct CreateConnectionHandler {
    connection: Connection,
    parent: Id,
}

impl CreateConnectionHandler {
    pub fn new(connection: Connection, parent: Id) -> Self {
        Self { connection, parent }
    }
}

impl CommandHandler for CreateConnectionHandler {
    fn name(&self) -> &'static str {
        "connection.create"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.connection.id()]
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        diagram.add_connection(self.connection.clone(), self.parent, None)?;
        Ok(vec![
            self.connection.id(),
            self.connection.source(),
            self.connection.target(),
        ])
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        diagram.remove_connection(self.connection.id())?;
        Ok(vec![
            self.connection.id(),
            self.connection.source(),
            self.connection.target(),
        ])
    }
}
