//! Notifications emitted while commands run.

use std::fmt;

use diorama_core::{identifier::Id, model::Diagram};

/// The lifecycle point an event was emitted at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    PreExecute,
    Executed,
    PostExecuted,
    Reverted,
    /// Emitted once per top-level execute, undo or redo with every element
    /// changed by the whole command tree.
    ElementsChanged,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::PreExecute => "preExecute",
            Phase::Executed => "executed",
            Phase::PostExecuted => "postExecuted",
            Phase::Reverted => "reverted",
            Phase::ElementsChanged => "elements.changed",
        };
        f.write_str(name)
    }
}

/// An event delivered to command stack listeners.
#[derive(Debug, Clone, Copy)]
pub struct CommandEvent<'a> {
    /// Name of the command the event is about. For
    /// [`Phase::ElementsChanged`] this is the top-level command.
    pub command: &'static str,
    pub phase: Phase,
    /// The elements the command was issued for.
    pub targets: &'a [Id],
    /// The elements changed in this phase.
    pub changed: &'a [Id],
}

impl CommandEvent<'_> {
    /// Returns true if this event is `phase` of the command named `command`.
    pub fn is(&self, command: &str, phase: Phase) -> bool {
        self.command == command && self.phase == phase
    }
}

/// A callback receiving every [`CommandEvent`].
///
/// Listeners get mutable access to the diagram so they can adjust it between
/// phases. Such adjustments are not recorded in the ledger.
pub type Listener = Box<dyn FnMut(&CommandEvent<'_>, &mut Diagram)>;
