//! Diorama Core Types and Definitions
//!
//! This crate provides the graph model that diagram editing commands operate
//! on. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Points, sizes and bounds ([`geometry`] module)
//! - **Model**: Shapes, connections and the [`model::Diagram`] arena
//! - **Errors**: Structural violations of the model ([`error::ModelError`])

pub mod error;
pub mod geometry;
pub mod identifier;
pub mod model;
