//! Moving a batch of elements, optionally into a new parent.

use indexmap::{IndexMap, IndexSet};

use diorama_core::{
    error::ModelError,
    geometry::{Bounds, Point},
    identifier::Id,
    model::{Diagram, Element},
};

use crate::{
    DioramaError,
    command::{CommandHandler, Scope},
    services::LayoutHints,
};

use super::LayoutConnectionHandler;

/// Everything a move touches.
///
/// `shapes` holds the moved shapes and all their descendant shapes.
/// `enclosed` connections have both ends inside `shapes` (or were requested
/// directly) and are translated along. `boundary` connections have exactly
/// one moved end and need a new layout.
#[derive(Debug, Default)]
struct MoveClosure {
    shapes: IndexSet<Id>,
    enclosed: IndexSet<Id>,
    boundary: IndexMap<Id, LayoutHints>,
}

impl MoveClosure {
    fn compute(diagram: &Diagram, elements: &[Id]) -> Self {
        let mut closure = Self::default();
        for &id in elements {
            match diagram.get(id) {
                Some(Element::Shape(_)) => {
                    closure.shapes.insert(id);
                    for descendant in diagram.descendants(id) {
                        if diagram.get(descendant).is_some_and(Element::is_shape) {
                            closure.shapes.insert(descendant);
                        }
                    }
                }
                Some(Element::Connection(_)) => {
                    closure.enclosed.insert(id);
                }
                None => {}
            }
        }

        for &shape in &closure.shapes {
            let Some(Element::Shape(shape)) = diagram.get(shape) else {
                continue;
            };
            for &connection in shape.incoming().iter().chain(shape.outgoing()) {
                let Ok(connection) = diagram.connection(connection) else {
                    continue;
                };
                let start_in = closure.shapes.contains(&connection.source());
                let end_in = closure.shapes.contains(&connection.target());
                if start_in && end_in {
                    closure.enclosed.insert(connection.id());
                } else if !closure.enclosed.contains(&connection.id()) {
                    closure.boundary.insert(
                        connection.id(),
                        LayoutHints {
                            start_changed: start_in,
                            end_changed: end_in,
                        },
                    );
                }
            }
        }
        closure
    }
}

/// Translates a batch of elements by a delta and re-parents the requested
/// ones.
///
/// Descendants move along but keep their parents.
#[derive(Debug)]
pub struct MoveElementsHandler {
    elements: Vec<Id>,
    delta: Point,
    new_parent: Option<Id>,
    closure: MoveClosure,
    old_bounds: Vec<(Id, Bounds)>,
    old_waypoints: Vec<(Id, Vec<Point>)>,
    old_parents: Vec<(Id, Id, usize)>,
}

impl MoveElementsHandler {
    pub fn new(elements: Vec<Id>, delta: Point, new_parent: Option<Id>) -> Self {
        Self {
            elements,
            delta,
            new_parent,
            closure: MoveClosure::default(),
            old_bounds: Vec::new(),
            old_waypoints: Vec::new(),
            old_parents: Vec::new(),
        }
    }
}

impl CommandHandler for MoveElementsHandler {
    fn name(&self) -> &'static str {
        "elements.move"
    }

    fn targets(&self) -> Vec<Id> {
        self.elements.clone()
    }

    fn pre_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        if !self.delta.is_finite() {
            return Err(DioramaError::invalid_request(format!(
                "move delta ({}, {}) must be finite",
                self.delta.x(),
                self.delta.y()
            )));
        }

        let diagram = scope.diagram();
        for &id in &self.elements {
            if id == diagram.root() {
                return Err(ModelError::RootMisuse(id, "moved").into());
            }
            diagram.element(id)?;
        }
        if let Some(parent) = self.new_parent {
            diagram.shape(parent)?;
        }

        self.closure = MoveClosure::compute(diagram, &self.elements);
        Ok(())
    }

    fn execute(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        self.old_bounds.clear();
        self.old_waypoints.clear();
        self.old_parents.clear();

        let mut changed: IndexSet<Id> = self.elements.iter().copied().collect();

        if !self.delta.is_zero() {
            for &shape in &self.closure.shapes {
                let bounds = diagram.shape(shape)?.bounds();
                let old = diagram.set_bounds(shape, bounds.translate(self.delta))?;
                self.old_bounds.push((shape, old));
                changed.insert(shape);
            }
            for &connection in &self.closure.enclosed {
                let moved: Vec<Point> = diagram
                    .connection(connection)?
                    .waypoints()
                    .iter()
                    .map(|point| point.add_point(self.delta))
                    .collect();
                let old = diagram.set_waypoints(connection, moved)?;
                self.old_waypoints.push((connection, old));
                changed.insert(connection);
            }
        }

        if let Some(new_parent) = self.new_parent {
            for &id in &self.elements {
                if diagram.element(id)?.parent() == Some(new_parent) {
                    continue;
                }
                let (old_parent, old_index) = diagram.set_parent(id, new_parent, None)?;
                self.old_parents.push((id, old_parent, old_index));
                changed.insert(old_parent);
            }
            changed.insert(new_parent);
        }

        Ok(changed.into_iter().collect())
    }

    fn post_execute(&mut self, scope: &mut Scope<'_>) -> Result<(), DioramaError> {
        if self.delta.is_zero() {
            return Ok(());
        }
        for (&connection, &hints) in &self.closure.boundary {
            if scope.diagram().contains(connection) {
                scope.execute(LayoutConnectionHandler::new(connection, hints))?;
            }
        }
        Ok(())
    }

    fn revert(&mut self, diagram: &mut Diagram) -> Result<Vec<Id>, DioramaError> {
        let mut changed: IndexSet<Id> = self.elements.iter().copied().collect();

        for &(id, old_parent, old_index) in self.old_parents.iter().rev() {
            diagram.set_parent(id, old_parent, Some(old_index))?;
            changed.insert(old_parent);
        }
        for (connection, waypoints) in &self.old_waypoints {
            diagram.set_waypoints(*connection, waypoints.clone())?;
            changed.insert(*connection);
        }
        for &(shape, bounds) in &self.old_bounds {
            diagram.set_bounds(shape, bounds)?;
            changed.insert(shape);
        }
        changed.extend(self.new_parent);

        Ok(changed.into_iter().collect())
    }
}
