//! Resizing and attaching shapes.

use diorama_core::{
    geometry::Bounds,
    identifier::Id,
    model::{Diagram, Element},
};
use log::debug;

use crate::{
    DioramaError,
    command::{CommandHandler, Scope},
    services::LayoutHints,
};

use super::LayoutConnectionHandler;

/// Sets new bounds on a shape, then re-routes its connections.
#[derive(Debug)]
pub struct ResizeShapeHandler {
    shape: Id,
    new_bounds: Bounds,
    old_bounds: Option<Bounds>,
}

impl ResizeShapeHandler {
    pub fn new(shape: Id, new_bounds: Bounds) -> Self {
        Self {
            shape,
            new_bounds,
            old_bounds: None,
        }
    }
}

impl CommandHandler for ResizeShapeHandler {
    fn name(&self) -> &'static str {
        "shape.resize"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.shape]
    }

    fn pre_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        scope.diagram().shape(self.shape)?;
        if !self.new_bounds.is_valid() {
            return Err(DioramaError::invalid_request(format!(
                "cannot resize `{}` to ({}, {}, {}x{})",
                self.shape,
                self.new_bounds.x(),
                self.new_bounds.y(),
                self.new_bounds.width(),
                self.new_bounds.height()
            )));
        }
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        self.old_bounds = Some(diagram.set_bounds(self.shape, self.new_bounds)?);
        Ok(vec![self.shape])
    }

    fn post_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        let shape = scope.diagram().shape(self.shape)?;
        let incoming: Vec<Id> = shape.incoming().iter().copied().collect();
        let outgoing: Vec<Id> = shape.outgoing().iter().copied().collect();

        for connection in incoming {
            scope.execute(LayoutConnectionHandler::new(connection, LayoutHints::end_changed()))?;
        }
        for connection in outgoing {
            scope.execute(LayoutConnectionHandler::new(connection, LayoutHints::start_changed()))?;
        }
        Ok(())
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        if let Some(old) = self.old_bounds {
            diagram.set_bounds(self.shape, old)?;
        }
        Ok(vec![self.shape])
    }
}

/// Attaches a shape to a host, or detaches it.
#[derive(Debug)]
pub struct UpdateAttachmentHandler {
    shape: Id,
    new_host: Option<Id>,
    old_host: Option<Id>,
}

impl UpdateAttachmentHandler {
    pub fn new(shape: Id, new_host: Option<Id>) -> Self {
        Self {
            shape,
            new_host,
            old_host: None,
        }
    }
}

impl CommandHandler for UpdateAttachmentHandler {
    fn name(&self) -> &'static str {
        "element.updateAttachment"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.shape]
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        self.old_host = diagram.set_host(self.shape, self.new_host)?;

        let mut changed = vec![self.shape];
        changed.extend(self.old_host);
        changed.extend(self.new_host);
        Ok(changed)
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        diagram.set_host(self.shape, self.old_host)?;

        let mut changed = vec![self.shape];
        changed.extend(self.old_host);
        changed.extend(self.new_host);
        Ok(changed)
    }
}

/// Resizes `shape` to enclose its visible children.
///
/// Does nothing when every child is hidden.
pub(crate) fn resize_to_visible_children(scope: &mut Scope<'_>, shape: Id) -> Result<(), DioramaError> {
    let bounds = {
        let diagram = scope.diagram();
        let visible: Vec<&Element> = diagram
            .shape(shape)?
            .children()
            .iter()
            .filter_map(|child| diagram.get(*child))
            .filter(|child| !child.is_hidden())
            .collect();
        if visible.is_empty() {
            debug!(shape:%; "No visible children, keeping size");
            return Ok(());
        }
        scope.bounds_computer().compute_bbox(&visible)
    };
    scope.execute(ResizeShapeHandler::new(shape, bounds))
}
