//! Diorama - Reversible modeling operations for diagram editors.
//!
//! Every edit to a [`model::Diagram`] runs as a command through a
//! [`command::CommandStack`], which records it for undo and redo. Compound
//! edits such as collapsing a container or replacing a shape are composed
//! from nested primitive commands and undone as one unit.
//!
//! Most callers only need [`Modeling`], which bundles a diagram with its
//! command stack and services.

pub mod command;
pub mod config;
pub mod handlers;
pub mod services;

mod error;
mod modeling;

pub use diorama_core::{geometry, identifier, model};

pub use diorama_core::error::ModelError;
pub use error::DioramaError;
pub use handlers::ReplaceOptions;
pub use modeling::Modeling;
