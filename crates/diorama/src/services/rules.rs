//! Permission predicate consulted before relation changes.

use std::fmt;

use diorama_core::identifier::Id;

/// A relation change that needs permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleAction {
    /// Dock the start of a connection at another shape.
    ReconnectStart,
    /// Dock the end of a connection at another shape.
    ReconnectEnd,
}

impl RuleAction {
    pub fn name(self) -> &'static str {
        match self {
            RuleAction::ReconnectStart => "connection.reconnectStart",
            RuleAction::ReconnectEnd => "connection.reconnectEnd",
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The elements affected by a [`RuleAction`], as they would be after the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleContext {
    pub source: Id,
    pub target: Id,
    pub connection: Id,
}

/// Decides whether a relation change may happen.
///
/// Denials are not errors: the command asking simply skips the change.
/// Closures `Fn(RuleAction, &RuleContext) -> bool` implement this trait.
pub trait Rules {
    fn allowed(&self, action: RuleAction, context: &RuleContext) -> bool;
}

/// Rules that permit everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Rules for AllowAll {
    fn allowed(&self, _action: RuleAction, _context: &RuleContext) -> bool {
        true
    }
}

impl<F> Rules for F
where
    F: Fn(RuleAction, &RuleContext) -> bool,
{
    fn allowed(&self, action: RuleAction, context: &RuleContext) -> bool {
        self(action, context)
    }
}
