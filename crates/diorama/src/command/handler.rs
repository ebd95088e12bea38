//! The four-hook contract every reversible command implements.

use diorama_core::{identifier::Id, model::Diagram};

use crate::DioramaError;

use super::Scope;

/// A reversible diagram mutation.
///
/// The command stack drives a handler through its lifecycle:
///
/// 1. [`pre_execute`](Self::pre_execute) prepares inputs and may issue nested
///    commands through the [`Scope`]. Each nested command has executed by the
///    time the call returns.
/// 2. [`execute`](Self::execute) applies the handler's own mutation and
///    stores in `self` whatever [`revert`](Self::revert) needs later.
/// 3. [`post_execute`](Self::post_execute) runs once the whole command tree
///    has executed, after the hooks of the commands this handler issued.
///    Its effects must be delegated to nested commands.
///
/// Undo calls `revert` in the reverse of the order `execute` ran. Redo calls
/// `execute` again on the same object; the pre and post hooks are not run a
/// second time because the commands they issued are replayed from the
/// ledger.
///
/// `execute` and `revert` return the ids of the elements they changed.
pub trait CommandHandler {
    /// The command name, as seen by listeners and in the ledger.
    fn name(&self) -> &'static str;

    /// The elements this command was issued for.
    fn targets(&self) -> Vec<Id> {
        Vec::new()
    }

    fn pre_execute(&mut self, _scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError>;

    fn post_execute(&mut self, _scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        Ok(())
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError>;
}
