//! The diagram: an arena of elements keyed by id.
//!
//! Relations are stored as ids on both sides (a parent lists its children
//! and every child names its parent). All relation writes go through the
//! primitives below so the two sides never drift apart. Each primitive
//! validates first and mutates second, and returns the value it replaced so
//! a caller can put it back later.

use std::fmt;

use indexmap::IndexMap;
use log::trace;

use crate::{
    error::ModelError,
    geometry::{Bounds, Point},
    identifier::Id,
};

use super::{Connection, ConnectionEnd, Element, Shape};

/// Kind given to the implicit root shape.
pub const ROOT_KIND: &str = "root";

/// A containment tree of shapes plus the connections between them.
#[derive(Debug, Clone)]
pub struct Diagram {
    root: Id,
    elements: IndexMap<Id, Element>,
}

impl Diagram {
    /// Creates a diagram holding only the root shape.
    pub fn new(root: Id) -> Self {
        let mut elements = IndexMap::new();
        elements.insert(
            root,
            Element::Shape(Shape::new(root, ROOT_KIND, Bounds::default())),
        );
        Self { root, elements }
    }

    pub fn root(&self) -> Id {
        self.root
    }

    pub fn contains(&self, id: Id) -> bool {
        self.elements.contains_key(&id)
    }

    /// Number of elements, the root included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.len() <= 1
    }

    pub fn get(&self, id: Id) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn element(&self, id: Id) -> Result<&Element, ModelError> {
        self.elements.get(&id).ok_or(ModelError::NotFound(id))
    }

    fn element_mut(&mut self, id: Id) -> Result<&mut Element, ModelError> {
        self.elements.get_mut(&id).ok_or(ModelError::NotFound(id))
    }

    pub fn shape(&self, id: Id) -> Result<&Shape, ModelError> {
        match self.element(id)? {
            Element::Shape(shape) => Ok(shape),
            Element::Connection(_) => Err(ModelError::NotAShape(id)),
        }
    }

    fn shape_mut(&mut self, id: Id) -> Result<&mut Shape, ModelError> {
        match self.element_mut(id)? {
            Element::Shape(shape) => Ok(shape),
            Element::Connection(_) => Err(ModelError::NotAShape(id)),
        }
    }

    pub fn connection(&self, id: Id) -> Result<&Connection, ModelError> {
        match self.element(id)? {
            Element::Connection(connection) => Ok(connection),
            Element::Shape(_) => Err(ModelError::NotAConnection(id)),
        }
    }

    fn connection_mut(&mut self, id: Id) -> Result<&mut Connection, ModelError> {
        match self.element_mut(id)? {
            Element::Connection(connection) => Ok(connection),
            Element::Shape(_) => Err(ModelError::NotAConnection(id)),
        }
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.elements.values().filter_map(Element::as_shape)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.elements.values().filter_map(Element::as_connection)
    }

    /// Returns the children of a shape in order.
    pub fn children(&self, id: Id) -> Result<Vec<Id>, ModelError> {
        Ok(self.shape(id)?.children().iter().copied().collect())
    }

    /// Returns every element below `id` in the containment tree, pre-order.
    pub fn descendants(&self, id: Id) -> Vec<Id> {
        let mut result = Vec::new();
        let mut stack: Vec<Id> = match self.elements.get(&id).and_then(Element::as_shape) {
            Some(shape) => shape.children().iter().rev().copied().collect(),
            None => return result,
        };

        while let Some(current) = stack.pop() {
            result.push(current);
            if let Some(shape) = self.elements.get(&current).and_then(Element::as_shape) {
                stack.extend(shape.children().iter().rev().copied());
            }
        }
        result
    }

    /// Returns true if `ancestor` is a strict ancestor of `id`.
    fn is_ancestor(&self, ancestor: Id, id: Id) -> bool {
        let mut current = self.elements.get(&id).and_then(Element::parent);
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.elements.len() {
                return false;
            }
            current = self.elements.get(&parent).and_then(Element::parent);
        }
        false
    }

    /// Adds a detached shape under `parent`, at `index` or last.
    ///
    /// # Errors
    ///
    /// Fails if the id is taken, the parent is not a shape, the geometry is
    /// invalid, or the shape already carries relations.
    pub fn add_shape(
        &mut self,
        mut shape: Shape,
        parent: Id,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        let id = shape.id();
        if self.contains(id) {
            return Err(ModelError::DuplicateId(id));
        }
        check_bounds(id, shape.bounds())?;
        self.shape(parent)?;
        if !shape.is_detached() {
            return Err(ModelError::StillReferenced(
                id,
                "a new shape must not carry relations".to_string(),
            ));
        }

        shape.parent = Some(parent);
        self.elements.insert(id, Element::Shape(shape));
        self.insert_child(parent, id, index);
        trace!(id:%, parent:%; "Shape added");
        Ok(())
    }

    /// Removes a shape that has no remaining relations besides its parent.
    ///
    /// Returns the detached shape and the index it held among its siblings.
    pub fn remove_shape(&mut self, id: Id) -> Result<(Shape, usize), ModelError> {
        self.ensure_not_root(id, "removed")?;
        let shape = self.shape(id)?;
        let blocker = if !shape.children.is_empty() {
            Some("it still has children")
        } else if !shape.incoming.is_empty() || !shape.outgoing.is_empty() {
            Some("it still has connections")
        } else if !shape.attachers.is_empty() {
            Some("it still has attached shapes")
        } else if shape.host.is_some() {
            Some("it is still attached to a host")
        } else {
            None
        };
        if let Some(reason) = blocker {
            return Err(ModelError::StillReferenced(id, reason.to_string()));
        }

        let parent = shape.parent;
        let index = parent
            .and_then(|parent| self.remove_child(parent, id))
            .unwrap_or_default();
        match self.elements.shift_remove(&id) {
            Some(Element::Shape(mut shape)) => {
                shape.parent = None;
                trace!(id:%, index; "Shape removed");
                Ok((shape, index))
            }
            _ => Err(ModelError::NotFound(id)),
        }
    }

    /// Adds a connection under `parent` and registers it on both endpoints.
    pub fn add_connection(
        &mut self,
        mut connection: Connection,
        parent: Id,
        index: Option<usize>,
    ) -> Result<(), ModelError> {
        let id = connection.id();
        if self.contains(id) {
            return Err(ModelError::DuplicateId(id));
        }
        check_waypoints(id, connection.waypoints())?;
        self.shape(parent)?;
        let (source, target) = (connection.source, connection.target);
        self.shape(source)?;
        self.shape(target)?;

        connection.parent = Some(parent);
        self.elements.insert(id, Element::Connection(connection));
        self.insert_child(parent, id, index);
        if let Some(shape) = self.shape_entry(source) {
            shape.outgoing.insert(id);
        }
        if let Some(shape) = self.shape_entry(target) {
            shape.incoming.insert(id);
        }
        trace!(id:%, source:%, target:%; "Connection added");
        Ok(())
    }

    /// Removes a connection and unregisters it from its endpoints.
    ///
    /// The returned connection still names its source and target so it can
    /// be added back unchanged.
    pub fn remove_connection(&mut self, id: Id) -> Result<(Connection, usize), ModelError> {
        let connection = self.connection(id)?;
        let (parent, source, target) = (connection.parent, connection.source, connection.target);

        let index = parent
            .and_then(|parent| self.remove_child(parent, id))
            .unwrap_or_default();
        if let Some(shape) = self.shape_entry(source) {
            shape.outgoing.shift_remove(&id);
        }
        if let Some(shape) = self.shape_entry(target) {
            shape.incoming.shift_remove(&id);
        }
        match self.elements.shift_remove(&id) {
            Some(Element::Connection(mut connection)) => {
                connection.parent = None;
                trace!(id:%, index; "Connection removed");
                Ok((connection, index))
            }
            _ => Err(ModelError::NotFound(id)),
        }
    }

    /// Moves an element under a new parent.
    ///
    /// Returns the previous parent and index.
    ///
    /// # Errors
    ///
    /// Fails for the root, for unknown ids, and when a shape would end up
    /// inside itself.
    pub fn set_parent(
        &mut self,
        id: Id,
        parent: Id,
        index: Option<usize>,
    ) -> Result<(Id, usize), ModelError> {
        self.ensure_not_root(id, "re-parented")?;
        let element = self.element(id)?;
        let is_shape = element.is_shape();
        let old_parent = element.parent().ok_or_else(|| ModelError::Inconsistent {
            id,
            reason: "element has no parent".to_string(),
        })?;
        self.shape(parent)?;
        if is_shape && (parent == id || self.is_ancestor(id, parent)) {
            return Err(ModelError::ContainmentCycle { child: id, parent });
        }

        let old_index = self.remove_child(old_parent, id).unwrap_or_default();
        self.insert_child(parent, id, index);
        if let Some(element) = self.elements.get_mut(&id) {
            element.set_parent(Some(parent));
        }
        trace!(id:%, old_parent:%, parent:%; "Parent changed");
        Ok((old_parent, old_index))
    }

    /// Docks one end of a connection at another shape.
    ///
    /// Returns the shape previously docked at that end.
    pub fn set_endpoint(
        &mut self,
        connection: Id,
        end: ConnectionEnd,
        shape: Id,
    ) -> Result<Id, ModelError> {
        self.shape(shape)?;
        let old = self.connection(connection)?.endpoint(end);
        if old == shape {
            return Ok(old);
        }

        match end {
            ConnectionEnd::Start => {
                if let Some(old_shape) = self.shape_entry(old) {
                    old_shape.outgoing.shift_remove(&connection);
                }
                if let Some(new_shape) = self.shape_entry(shape) {
                    new_shape.outgoing.insert(connection);
                }
            }
            ConnectionEnd::End => {
                if let Some(old_shape) = self.shape_entry(old) {
                    old_shape.incoming.shift_remove(&connection);
                }
                if let Some(new_shape) = self.shape_entry(shape) {
                    new_shape.incoming.insert(connection);
                }
            }
        }
        let entry = self.connection_mut(connection)?;
        match end {
            ConnectionEnd::Start => entry.source = shape,
            ConnectionEnd::End => entry.target = shape,
        }
        Ok(old)
    }

    /// Attaches `shape` to `host`, or detaches it with `None`.
    ///
    /// Returns the previous host.
    pub fn set_host(&mut self, shape: Id, host: Option<Id>) -> Result<Option<Id>, ModelError> {
        let old = self.shape(shape)?.host;
        if let Some(host) = host {
            self.shape(host)?;
            if host == shape {
                return Err(ModelError::ContainmentCycle {
                    child: shape,
                    parent: host,
                });
            }
        }
        if old == host {
            return Ok(old);
        }

        if let Some(old_host) = old.and_then(|old| self.shape_entry(old)) {
            old_host.attachers.shift_remove(&shape);
        }
        if let Some(new_host) = host.and_then(|host| self.shape_entry(host)) {
            new_host.attachers.insert(shape);
        }
        self.shape_mut(shape)?.host = host;
        Ok(old)
    }

    /// Replaces the waypoints of a connection, returning the old ones.
    pub fn set_waypoints(
        &mut self,
        connection: Id,
        waypoints: Vec<Point>,
    ) -> Result<Vec<Point>, ModelError> {
        check_waypoints(connection, &waypoints)?;
        Ok(self.connection_mut(connection)?.replace_waypoints(waypoints))
    }

    pub fn set_bounds(&mut self, shape: Id, bounds: Bounds) -> Result<Bounds, ModelError> {
        check_bounds(shape, bounds)?;
        let entry = self.shape_mut(shape)?;
        let old = entry.bounds();
        entry.set_bounds(bounds);
        Ok(old)
    }

    pub fn set_hidden(&mut self, id: Id, hidden: bool) -> Result<bool, ModelError> {
        let element = self.element_mut(id)?;
        let old = element.is_hidden();
        element.set_hidden(hidden);
        Ok(old)
    }

    pub fn set_collapsed(&mut self, shape: Id, collapsed: bool) -> Result<bool, ModelError> {
        let entry = self.shape_mut(shape)?;
        let old = entry.is_collapsed();
        entry.set_collapsed(collapsed);
        Ok(old)
    }

    /// Checks that every relation is recorded on both of its sides and that
    /// containment is a tree rooted at [`Diagram::root`].
    pub fn validate(&self) -> Result<(), ModelError> {
        for element in self.elements.values() {
            let id = element.id();
            match element.parent() {
                None if id != self.root => {
                    return Err(inconsistent(id, "element has no parent"));
                }
                Some(_) if id == self.root => {
                    return Err(inconsistent(id, "root has a parent"));
                }
                Some(parent) => {
                    let listed = self
                        .shape(parent)
                        .map(|shape| shape.children.contains(&id))
                        .unwrap_or(false);
                    if !listed {
                        return Err(inconsistent(id, "parent does not list the element"));
                    }
                    if element.is_shape() && self.is_ancestor(id, id) {
                        return Err(ModelError::ContainmentCycle { child: id, parent });
                    }
                }
                None => {}
            }

            match element {
                Element::Shape(shape) => self.validate_shape(shape)?,
                Element::Connection(connection) => self.validate_connection(connection)?,
            }
        }
        Ok(())
    }

    fn validate_shape(&self, shape: &Shape) -> Result<(), ModelError> {
        let id = shape.id();
        for child in &shape.children {
            if self.get(*child).and_then(Element::parent) != Some(id) {
                return Err(inconsistent(*child, "child does not name its parent"));
            }
        }
        if let Some(host) = shape.host {
            let listed = self
                .shape(host)
                .map(|host| host.attachers.contains(&id))
                .unwrap_or(false);
            if !listed {
                return Err(inconsistent(id, "host does not list the attacher"));
            }
        }
        for attacher in &shape.attachers {
            if self.shape(*attacher).ok().and_then(Shape::host) != Some(id) {
                return Err(inconsistent(*attacher, "attacher does not name its host"));
            }
        }
        for incoming in &shape.incoming {
            if self.connection(*incoming).map(Connection::target).ok() != Some(id) {
                return Err(inconsistent(*incoming, "incoming connection targets another shape"));
            }
        }
        for outgoing in &shape.outgoing {
            if self.connection(*outgoing).map(Connection::source).ok() != Some(id) {
                return Err(inconsistent(*outgoing, "outgoing connection starts at another shape"));
            }
        }
        Ok(())
    }

    fn validate_connection(&self, connection: &Connection) -> Result<(), ModelError> {
        let id = connection.id();
        check_waypoints(id, connection.waypoints())?;
        let registered_out = self
            .shape(connection.source)
            .map(|shape| shape.outgoing.contains(&id))
            .unwrap_or(false);
        let registered_in = self
            .shape(connection.target)
            .map(|shape| shape.incoming.contains(&id))
            .unwrap_or(false);
        if !registered_out || !registered_in {
            return Err(inconsistent(id, "endpoint does not list the connection"));
        }
        Ok(())
    }

    fn ensure_not_root(&self, id: Id, action: &'static str) -> Result<(), ModelError> {
        if id == self.root {
            return Err(ModelError::RootMisuse(id, action));
        }
        Ok(())
    }

    fn shape_entry(&mut self, id: Id) -> Option<&mut Shape> {
        match self.elements.get_mut(&id) {
            Some(Element::Shape(shape)) => Some(shape),
            _ => None,
        }
    }

    fn insert_child(&mut self, parent: Id, child: Id, index: Option<usize>) {
        if let Some(shape) = self.shape_entry(parent) {
            match index {
                Some(index) => {
                    let index = index.min(shape.children.len());
                    shape.children.shift_insert(index, child);
                }
                None => {
                    shape.children.insert(child);
                }
            }
        }
    }

    fn remove_child(&mut self, parent: Id, child: Id) -> Option<usize> {
        self.shape_entry(parent)
            .and_then(|shape| shape.children.shift_remove_full(&child))
            .map(|(index, _)| index)
    }

    fn fmt_subtree(&self, f: &mut fmt::Formatter<'_>, id: Id, depth: usize) -> fmt::Result {
        let Some(element) = self.get(id) else {
            return Ok(());
        };
        write!(f, "{:indent$}", "", indent = depth * 2)?;
        match element {
            Element::Shape(shape) => {
                let bounds = shape.bounds();
                write!(
                    f,
                    "{} [{}] ({}, {}, {}x{})",
                    shape.id(),
                    shape.kind(),
                    bounds.x(),
                    bounds.y(),
                    bounds.width(),
                    bounds.height()
                )?;
                if shape.is_collapsed() {
                    write!(f, " collapsed")?;
                }
                if shape.is_hidden() {
                    write!(f, " hidden")?;
                }
                if let Some(host) = shape.host() {
                    write!(f, " on {host}")?;
                }
                writeln!(f)?;
                for child in shape.children() {
                    self.fmt_subtree(f, *child, depth + 1)?;
                }
            }
            Element::Connection(connection) => {
                write!(
                    f,
                    "{} [{}] {} -> {}",
                    connection.id(),
                    connection.kind(),
                    connection.source(),
                    connection.target()
                )?;
                if connection.is_hidden() {
                    write!(f, " hidden")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Renders the containment tree, one element per line.
impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_subtree(f, self.root, 0)
    }
}

fn inconsistent(id: Id, reason: &str) -> ModelError {
    ModelError::Inconsistent {
        id,
        reason: reason.to_string(),
    }
}

fn check_bounds(id: Id, bounds: Bounds) -> Result<(), ModelError> {
    if !bounds.is_valid() {
        return Err(ModelError::InvalidGeometry {
            id,
            reason: format!(
                "bounds ({}, {}, {}x{}) must be finite with a non-negative size",
                bounds.x(),
                bounds.y(),
                bounds.width(),
                bounds.height()
            ),
        });
    }
    Ok(())
}

fn check_waypoints(id: Id, waypoints: &[Point]) -> Result<(), ModelError> {
    if waypoints.len() < 2 {
        return Err(ModelError::InvalidWaypoints {
            id,
            count: waypoints.len(),
        });
    }
    if !waypoints.iter().all(|point| point.is_finite()) {
        return Err(ModelError::InvalidGeometry {
            id,
            reason: "waypoints must be finite".to_string(),
        });
    }
    Ok(())
}
