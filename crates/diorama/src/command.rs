//! Reversible commands and the stack that runs them.
//!
//! A command is a [`CommandHandler`] driven through `pre_execute`,
//! `execute`, `post_execute` and, on undo, `revert`. Hooks issue nested
//! commands through a [`Scope`]; the whole tree is recorded as one
//! [`Record`] on the [`CommandStack`].

mod event;
mod handler;
mod record;
mod scope;
mod stack;

pub use event::{CommandEvent, Listener, Phase};
pub use handler::CommandHandler;
pub use record::{Action, Record};
pub use scope::Scope;
pub use stack::CommandStack;
