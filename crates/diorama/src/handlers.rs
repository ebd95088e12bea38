//! The built-in command handlers.
//!
//! Primitives (create, remove, move, attach, reconnect, layout, resize)
//! each perform one directly invertible mutation. Toggle-collapse and
//! replace are composed from them through nested commands.

mod collapse;
mod connection;
mod create;
mod move_elements;
mod remove;
mod replace;
mod shape;

pub use collapse::ToggleShapeCollapseHandler;
pub use connection::{LayoutConnectionHandler, ReconnectHandler};
pub use create::{CreateConnectionHandler, CreateShapeHandler};
pub use move_elements::MoveElementsHandler;
pub use remove::{RemoveConnectionHandler, RemoveShapeHandler};
pub use replace::{ReplaceOptions, ReplaceShapeHandler};
pub use shape::{ResizeShapeHandler, UpdateAttachmentHandler};

pub(crate) use shape::resize_to_visible_children;
