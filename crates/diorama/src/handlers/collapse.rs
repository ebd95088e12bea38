//! Collapsing and expanding container shapes.

use indexmap::IndexMap;

use diorama_core::{error::ModelError, identifier::Id, model::Diagram};

use crate::{
    DioramaError,
    command::{CommandHandler, Scope},
};

use super::resize_to_visible_children;

/// Flips a shape between collapsed and expanded.
///
/// Collapsing hides every child. Expanding shows every child and then
/// resizes the shape around the ones still visible. The children's previous
/// `hidden` flags are kept so undo restores them one by one.
#[derive(Debug)]
pub struct ToggleShapeCollapseHandler {
    shape: Id,
    collapsed: bool,
    old_hidden: IndexMap<Id, bool>,
}

impl ToggleShapeCollapseHandler {
    pub fn new(shape: Id) -> Self {
        Self {
            shape,
            collapsed: false,
            old_hidden: IndexMap::new(),
        }
    }
}

impl CommandHandler for ToggleShapeCollapseHandler {
    fn name(&self) -> &'static str {
        "shape.toggleCollapse"
    }

    fn targets(&self) -> Vec<Id> {
        vec![self.shape]
    }

    fn pre_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        let diagram = scope.diagram();
        if self.shape == diagram.root() {
            return Err(ModelError::RootMisuse(self.shape, "collapsed").into());
        }
        diagram.shape(self.shape)?;
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let collapsed = !diagram.shape(self.shape)?.is_collapsed();
        diagram.set_collapsed(self.shape, collapsed)?;
        self.collapsed = collapsed;

        let children = diagram.children(self.shape)?;
        self.old_hidden.clear();
        for &child in &children {
            let old = diagram.set_hidden(child, collapsed)?;
            self.old_hidden.insert(child, old);
        }

        let mut changed = vec![self.shape];
        changed.extend(children);
        Ok(changed)
    }

    fn post_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        if self.collapsed {
            return Ok(());
        }
        resize_to_visible_children(scope, self.shape)
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        diagram.set_collapsed(self.shape, !self.collapsed)?;

        let children = diagram.children(self.shape)?;
        for &child in &children {
            if let Some(&hidden) = self.old_hidden.get(&child) {
                diagram.set_hidden(child, hidden)?;
            }
        }

        let mut changed = vec![self.shape];
        changed.extend(children);
        Ok(changed)
    }
}
