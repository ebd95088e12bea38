//! Ledger entries: one top-level command and the tree it issued.

use std::fmt;

use diorama_core::identifier::Id;

use super::CommandHandler;

/// One command inside a [`Record`].
pub struct Action {
    pub(super) name: &'static str,
    pub(super) targets: Vec<Id>,
    pub(super) parent: Option<usize>,
    pub(super) depth: usize,
    /// `None` only while one of the handler's hooks is running.
    pub(super) handler: Option<Box<dyn CommandHandler>>,
}

impl Action {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn targets(&self) -> &[Id] {
        &self.targets
    }

    /// Nesting depth; the top-level command is at depth 0.
    pub fn depth(&self) -> usize {
        self.depth
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("name", &self.name)
            .field("targets", &self.targets)
            .field("parent", &self.parent)
            .field("depth", &self.depth)
            .finish()
    }
}

/// A top-level command with every command it issued, undone and redone as
/// one unit.
///
/// Actions are stored in the order they were opened; index 0 is the
/// top-level command. The execution order is kept separately because a
/// command executes only after the commands issued by its `pre_execute`.
#[derive(Debug, Default)]
pub struct Record {
    pub(super) actions: Vec<Action>,
    pub(super) executed: Vec<usize>,
}

impl Record {
    /// Name of the top-level command.
    pub fn name(&self) -> &'static str {
        self.actions.first().map_or("", |action| action.name)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Indices of the actions directly issued by the action at `index`.
    pub fn children_of(&self, index: usize) -> Vec<usize> {
        self.actions
            .iter()
            .enumerate()
            .filter(|(_, action)| action.parent == Some(index))
            .map(|(i, _)| i)
            .collect()
    }
}
