//! Removing shapes and connections.
//!
//! Removing a shape first removes, through nested commands, everything that
//! still refers to it: incident connections, children and attached shapes.
//! The shape itself is then detached from its host and taken out of its
//! parent, remembering the sibling index for undo.

use indexmap::IndexSet;
use log::debug;

use diorama_core::{
    error::ModelError,
    identifier::Id,
    model::{Connection, Diagram, Element, Shape},
};

use crate::{
    DioramaError,
    command::{CommandHandler, Scope},
};

#[derive(Debug)]
struct Removed<T> {
    element: T,
    parent: Id,
    index: usize,
}

/// Removes a connection from the diagram.
#[derive(Debug)]
pub struct RemoveConnectionHandler {
    connection: Id,
    removed: Option<Removed<Connection>>,
}

impl RemoveConnectionHandler {
    pub fn new(connection: Id) -> Self {
        Self {
            connection,
            removed: None,
        }
    }
}

impl CommandHandler for RemoveConnectionHandler {
    fn name(&self) -> &'static str {
        "connection.delete"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.connection]
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let connection = diagram.connection(self.connection)?;
        let parent = connection.parent().ok_or_else(|| {
            DioramaError::invalid_request(format!("connection `{}` has no parent", self.connection))
        })?;
        let (element, index) = diagram.remove_connection(self.connection)?;
        let changed = vec![self.connection, element.source(), element.target(), parent];

        self.removed = Some(Removed {
            element,
            parent,
            index,
        });
        Ok(changed)
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let Some(removed) = &self.removed else {
            return Ok(Vec::new());
        };
        diagram.add_connection(removed.element.clone(), removed.parent, Some(removed.index))?;
        Ok(vec![
            self.connection,
            removed.element.source(),
            removed.element.target(),
            removed.parent,
        ])
    }
}

/// Removes a shape together with everything that depends on it.
#[derive(Debug)]
pub struct RemoveShapeHandler {
    shape: Id,
    removed: Option<Removed<Shape>>,
    old_host: Option<Id>,
}

impl RemoveShapeHandler {
    pub fn new(shape: Id) -> Self {
        Self {
            shape,
            removed: None,
            old_host: None,
        }
    }
}

impl CommandHandler for RemoveShapeHandler {
    fn name(&self) -> &'static str {
        "shape.delete"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.shape]
    }

    fn pre_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        let diagram = scope.diagram();
        let root = diagram.root();
        if self.shape == root {
            return Err(ModelError::RootMisuse(root, "removed").into());
        }
        let shape = diagram.shape(self.shape)?;

        let connections: IndexSet<Id> = shape
            .incoming()
            .iter()
            .chain(shape.outgoing())
            .copied()
            .collect();
        let children: Vec<Id> = shape.children().iter().copied().collect();
        let attachers: Vec<Id> = shape.attachers().iter().copied().collect();

        for connection in connections {
            scope.execute(RemoveConnectionHandler::new(connection))?;
        }
        for child in children {
            // Connection children may already be gone as incident connections.
            let is_shape = match scope.diagram().get(child) {
                Some(element) => element.is_shape(),
                None => continue,
            };
            if is_shape {
                scope.execute(RemoveShapeHandler::new(child))?;
            } else {
                scope.execute(RemoveConnectionHandler::new(child))?;
            }
        }
        for attacher in attachers {
            if scope.diagram().get(attacher).is_some_and(Element::is_shape) {
                debug!(attacher:%, host:% = self.shape; "Removing attached shape with its host");
                scope.execute(RemoveShapeHandler::new(attacher))?;
            }
        }
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let parent = diagram.shape(self.shape)?.parent().ok_or_else(|| {
            DioramaError::invalid_request(format!("shape `{}` has no parent", self.shape))
        })?;
        self.old_host = diagram.set_host(self.shape, None)?;
        let (element, index) = diagram.remove_shape(self.shape)?;

        let mut changed = vec![self.shape, parent];
        changed.extend(self.old_host);
        self.removed = Some(Removed {
            element,
            parent,
            index,
        });
        Ok(changed)
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let Some(removed) = &self.removed else {
            return Ok(Vec::new());
        };
        diagram.add_shape(removed.element.clone(), removed.parent, Some(removed.index))?;
        diagram.set_host(self.shape, self.old_host)?;

        let mut changed = vec![self.shape, removed.parent];
        changed.extend(self.old_host);
        Ok(changed)
    }
}
