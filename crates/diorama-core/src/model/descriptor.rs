//! Descriptors: the caller-supplied data a new element is created from.
//!
//! Descriptors are the boundary where legacy representations are normalized.
//! A shape record may carry `collapsed` or, on older records, only
//! `is_expanded`; [`ShapeDescriptor::resolved_collapsed`] folds both into the
//! single canonical flag stored on [`Shape`](super::Shape).

use indexmap::IndexMap;
use serde::Deserialize;

use crate::{geometry::Point, identifier::Id};

/// Default kind assigned to shapes created without one.
pub const DEFAULT_SHAPE_KIND: &str = "shape";

/// Default kind assigned to connections created without one.
pub const DEFAULT_CONNECTION_KIND: &str = "connection";

/// Data describing a shape to create or to replace another shape with.
///
/// Geometry fields are optional; what a missing field means depends on the
/// operation consuming the descriptor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ShapeDescriptor {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub collapsed: Option<bool>,
    #[serde(default, alias = "isExpanded")]
    pub is_expanded: Option<bool>,
    #[serde(default)]
    pub attrs: IndexMap<String, String>,
}

impl ShapeDescriptor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the requested top-left position.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn with_collapsed(mut self, collapsed: bool) -> Self {
        self.collapsed = Some(collapsed);
        self
    }

    /// Sets the legacy `is_expanded` flag, consulted only when `collapsed` is absent.
    pub fn with_expanded(mut self, expanded: bool) -> Self {
        self.is_expanded = Some(expanded);
        self
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    /// Returns the position if both coordinates are present.
    pub fn position(&self) -> Option<Point> {
        Some(Point::new(self.x?, self.y?))
    }

    /// Normalizes the collapsed state.
    ///
    /// An explicit `collapsed` wins; otherwise a legacy `is_expanded` is
    /// negated; a record with neither is expanded.
    pub fn resolved_collapsed(&self) -> bool {
        self.collapsed
            .or(self.is_expanded.map(|expanded| !expanded))
            .unwrap_or(false)
    }
}

/// Data describing a connection to create.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConnectionDescriptor {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub waypoints: Vec<Point>,
}

impl ConnectionDescriptor {
    pub fn new(waypoints: Vec<Point>) -> Self {
        Self {
            waypoints,
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<Id>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }
}
