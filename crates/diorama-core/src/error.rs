//! Errors raised by graph model primitives.

use thiserror::Error;

use crate::identifier::Id;

/// Violations of the graph model's structural rules.
///
/// Every primitive on [`Diagram`](crate::model::Diagram) validates its inputs
/// before touching any relation, so an error always leaves the model
/// unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("element `{0}` not found")]
    NotFound(Id),

    #[error("element `{0}` is not a shape")]
    NotAShape(Id),

    #[error("element `{0}` is not a connection")]
    NotAConnection(Id),

    #[error("element id `{0}` is already in use")]
    DuplicateId(Id),

    #[error("invalid geometry for `{id}`: {reason}")]
    InvalidGeometry { id: Id, reason: String },

    #[error("connection `{id}` needs at least two waypoints, got {count}")]
    InvalidWaypoints { id: Id, count: usize },

    #[error("cannot place `{child}` inside `{parent}`: it would contain itself")]
    ContainmentCycle { child: Id, parent: Id },

    #[error("`{0}` is still referenced: {1}")]
    StillReferenced(Id, String),

    #[error("the root shape `{0}` cannot be {1}")]
    RootMisuse(Id, &'static str),

    #[error("relation of `{id}` is out of sync: {reason}")]
    Inconsistent { id: Id, reason: String },
}
