//! Replacing a shape with a new one of another kind.
//!
//! The replacement is composed from primitives: the new shape is created
//! next to the old one, takes over its host, its children and every
//! connection the rules allow, and the old shape is removed last. Only the
//! visibility change of the adopted children belongs to the replace command
//! itself; the stack unwinds everything else.

use indexmap::IndexMap;
use log::debug;

use diorama_core::{
    geometry::Point,
    identifier::Id,
    model::{Diagram, Shape},
};

use crate::{
    DioramaError,
    command::{CommandHandler, Scope},
    config::ModelingConfig,
    services::{LayoutHints, RuleAction, RuleContext},
};

use super::{
    CreateShapeHandler, LayoutConnectionHandler, MoveElementsHandler, ReconnectHandler,
    RemoveShapeHandler, UpdateAttachmentHandler, resize_to_visible_children,
};

/// Options for [`ReplaceShapeHandler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Move the old shape's children into the new shape.
    pub move_children: bool,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            move_children: true,
        }
    }
}

impl From<&ModelingConfig> for ReplaceOptions {
    fn from(config: &ModelingConfig) -> Self {
        Self {
            move_children: config.move_children(),
        }
    }
}

/// Replaces `old_shape` with a prepared, detached `new_shape`.
#[derive(Debug)]
pub struct ReplaceShapeHandler {
    old_shape: Id,
    new_shape: Shape,
    options: ReplaceOptions,
    old_collapsed: bool,
    new_collapsed: bool,
    /// Hidden flags of the adopted children, taken in `execute` right before
    /// they are overwritten. The children move in `pre_execute` without
    /// touching their flags, so this equals a snapshot taken before the
    /// move, and redo retakes it from the same state.
    old_hidden: IndexMap<Id, bool>,
}

impl ReplaceShapeHandler {
    pub fn new(old_shape: Id, new_shape: Shape, options: ReplaceOptions) -> Self {
        Self {
            old_shape,
            new_collapsed: new_shape.is_collapsed(),
            new_shape,
            options,
            old_collapsed: false,
            old_hidden: IndexMap::new(),
        }
    }

    fn new_id(&self) -> Id {
        self.new_shape.id()
    }

    fn reconnect_incoming(&self, scope: &mut Scope<'_>, connections: Vec<Id>) -> Result<(), DioramaError> {
        let new_id = self.new_id();
        for connection in connections {
            let (source, docking) = {
                let connection = scope.diagram().connection(connection)?;
                (connection.source(), connection.waypoints().last().copied())
            };
            let context = RuleContext {
                source,
                target: new_id,
                connection,
            };
            if scope.rules().allowed(RuleAction::ReconnectEnd, &context) {
                scope.execute(ReconnectHandler::end(connection, new_id, docking))?;
            } else {
                debug!(connection:%, target:% = new_id; "Reconnect denied, connection stays on the replaced shape");
            }
        }
        Ok(())
    }

    fn reconnect_outgoing(&self, scope: &mut Scope<'_>, connections: Vec<Id>) -> Result<(), DioramaError> {
        let new_id = self.new_id();
        for connection in connections {
            let (target, docking) = {
                let connection = scope.diagram().connection(connection)?;
                (connection.target(), connection.waypoints().first().copied())
            };
            let context = RuleContext {
                source: new_id,
                target,
                connection,
            };
            if scope.rules().allowed(RuleAction::ReconnectStart, &context) {
                scope.execute(ReconnectHandler::start(connection, new_id, docking))?;
            } else {
                debug!(connection:%, source:% = new_id; "Reconnect denied, connection stays on the replaced shape");
            }
        }
        Ok(())
    }

    fn is_expand(&self) -> bool {
        self.old_collapsed && !self.new_collapsed
    }
}

impl CommandHandler for ReplaceShapeHandler {
    fn name(&self) -> &'static str {
        "shape.replace"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.old_shape, self.new_id()]
    }

    fn pre_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        let (parent, host, children, incoming, outgoing) = {
            let old = scope.diagram().shape(self.old_shape)?;
            let parent = old.parent().ok_or_else(|| {
                DioramaError::invalid_request(format!("shape `{}` has no parent", self.old_shape))
            })?;
            self.old_collapsed = old.is_collapsed();
            (
                parent,
                old.host(),
                old.children().iter().copied().collect::<Vec<_>>(),
                old.incoming().iter().copied().collect::<Vec<_>>(),
                old.outgoing().iter().copied().collect::<Vec<_>>(),
            )
        };
        let new_id = self.new_id();
        debug!(old:% = self.old_shape, new:% = new_id, move_children = self.options.move_children; "Replacing shape");

        scope.execute(CreateShapeHandler::new(self.new_shape.clone(), parent))?;

        if host.is_some() {
            scope.execute(UpdateAttachmentHandler::new(new_id, host))?;
        }

        if self.options.move_children && !children.is_empty() {
            scope.execute(MoveElementsHandler::new(children, Point::default(), Some(new_id)))?;
        }

        self.reconnect_incoming(scope, incoming)?;
        self.reconnect_outgoing(scope, outgoing)?;
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let new_id = self.new_id();
        let mut changed = vec![new_id];
        self.old_hidden.clear();

        if self.old_collapsed != self.new_collapsed {
            for child in diagram.children(new_id)? {
                let old = diagram.set_hidden(child, self.new_collapsed)?;
                self.old_hidden.insert(child, old);
                changed.push(child);
            }
        }
        Ok(changed)
    }

    fn post_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        let new_id = self.new_id();
        let (incoming, outgoing) = {
            let shape = scope.diagram().shape(new_id)?;
            (
                shape.incoming().iter().copied().collect::<Vec<_>>(),
                shape.outgoing().iter().copied().collect::<Vec<_>>(),
            )
        };

        for connection in incoming {
            scope.execute(LayoutConnectionHandler::new(connection, LayoutHints::end_changed()))?;
        }
        for connection in outgoing {
            scope.execute(LayoutConnectionHandler::new(connection, LayoutHints::start_changed()))?;
        }

        if self.is_expand() {
            resize_to_visible_children(scope, new_id)?;
        }

        scope.execute(RemoveShapeHandler::new(self.old_shape))
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let new_id = self.new_id();
        let mut changed = vec![new_id];
        for (&child, &hidden) in &self.old_hidden {
            if diagram.contains(child) {
                diagram.set_hidden(child, hidden)?;
                changed.push(child);
            }
        }
        Ok(changed)
    }
}
