//! The caller-facing modeling API.
//!
//! [`Modeling`] owns a diagram, its command stack and the injected
//! services. Every operation builds a handler, runs it through the stack and
//! returns once the whole command tree has finished.

use log::{debug, info};

use diorama_core::{
    error::ModelError,
    geometry::{Bounds, Point},
    identifier::Id,
    model::{ConnectionDescriptor, ConnectionEnd, Diagram, ShapeDescriptor},
};

use crate::{
    DioramaError,
    command::{CommandEvent, CommandHandler, CommandStack},
    config::AppConfig,
    handlers::{
        CreateConnectionHandler, CreateShapeHandler, LayoutConnectionHandler, MoveElementsHandler,
        ReconnectHandler, RemoveConnectionHandler, RemoveShapeHandler, ReplaceOptions,
        ReplaceShapeHandler, ResizeShapeHandler, ToggleShapeCollapseHandler,
        UpdateAttachmentHandler,
    },
    services::{
        BoundsComputer, DEFAULT_SHAPE_SIZE, ElementFactory, LayoutHints, Layouter, Rules, Services,
    },
};

/// A diagram together with everything needed to edit it reversibly.
///
/// # Examples
///
/// ```rust
/// use diorama::{Modeling, ReplaceOptions, identifier::Id, model::ShapeDescriptor};
///
/// let mut modeling = Modeling::new(Id::new("root"));
/// let root = modeling.diagram().root();
///
/// let task = modeling
///     .create_shape(&ShapeDescriptor::new().with_id("task").at(10.0, 10.0), root)
///     .expect("create task");
/// let process = modeling
///     .replace_element(
///         task,
///         &ShapeDescriptor::new().with_kind("subProcess").with_size(300.0, 200.0),
///         ReplaceOptions::default(),
///     )
///     .expect("replace task");
///
/// assert!(modeling.diagram().contains(process));
/// assert!(!modeling.diagram().contains(task));
///
/// modeling.undo().expect("undo");
/// assert!(modeling.diagram().contains(task));
/// ```
pub struct Modeling {
    diagram: Diagram,
    stack: CommandStack,
    services: Services,
    factory: ElementFactory,
    config: AppConfig,
}

impl Modeling {
    /// Creates an empty diagram with default configuration.
    pub fn new(root: Id) -> Self {
        Self::from_diagram(Diagram::new(root), &AppConfig::default())
    }

    /// Creates an empty diagram with the given configuration.
    pub fn with_config(root: Id, config: &AppConfig) -> Self {
        Self::from_diagram(Diagram::new(root), config)
    }

    /// Takes over an existing diagram. The history starts empty.
    pub fn from_diagram(diagram: Diagram, config: &AppConfig) -> Self {
        Self {
            diagram,
            stack: CommandStack::new(config.history()),
            services: Services::new(config.modeling()),
            factory: ElementFactory::new(),
            config: config.clone(),
        }
    }

    /// Replaces the permission rules.
    pub fn with_rules(mut self, rules: impl Rules + 'static) -> Self {
        self.services.set_rules(rules);
        self
    }

    /// Replaces the connection layouter.
    pub fn with_layouter(mut self, layouter: impl Layouter + 'static) -> Self {
        self.services.set_layouter(layouter);
        self
    }

    /// Replaces the bounding box collaborator.
    pub fn with_bounds_computer(mut self, bounds: impl BoundsComputer + 'static) -> Self {
        self.services.set_bounds_computer(bounds);
        self
    }

    pub fn diagram(&self) -> &Diagram {
        &self.diagram
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn command_stack(&self) -> &CommandStack {
        &self.stack
    }

    /// Registers a listener for command lifecycle events.
    pub fn add_listener(&mut self, listener: impl FnMut(&CommandEvent<'_>, &mut Diagram) + 'static) {
        self.stack.add_listener(listener);
    }

    /// Runs an arbitrary handler through the command stack.
    pub fn execute(&mut self, handler: Box<dyn CommandHandler>) -> Result<Vec<Id>, DioramaError> {
        self.stack.execute(&mut self.diagram, &self.services, handler)
    }

    /// Creates a shape under `parent` and returns its id.
    ///
    /// Missing geometry defaults to the origin and [`DEFAULT_SHAPE_SIZE`].
    pub fn create_shape(&mut self, descriptor: &ShapeDescriptor, parent: Id) -> Result<Id, DioramaError> {
        self.diagram.shape(parent)?;
        let fallback = Bounds::new_from_top_left(Point::default(), DEFAULT_SHAPE_SIZE);
        let shape = self.factory.create_shape(&self.diagram, descriptor, fallback)?;
        let id = shape.id();
        self.execute(Box::new(CreateShapeHandler::new(shape, parent)))?;
        Ok(id)
    }

    /// Creates a connection from `source` to `target` and returns its id.
    ///
    /// Without an explicit `parent` the connection is placed in the source's
    /// parent.
    pub fn create_connection(
        &mut self,
        source: Id,
        target: Id,
        descriptor: &ConnectionDescriptor,
        parent: Option<Id>,
    ) -> Result<Id, DioramaError> {
        let parent = match parent {
            Some(parent) => parent,
            None => self
                .diagram
                .shape(source)?
                .parent()
                .unwrap_or_else(|| self.diagram.root()),
        };
        let connection = self
            .factory
            .create_connection(&self.diagram, descriptor, source, target)?;
        let id = connection.id();
        self.execute(Box::new(CreateConnectionHandler::new(connection, parent)))?;
        Ok(id)
    }

    pub fn move_elements(
        &mut self,
        elements: Vec<Id>,
        delta: Point,
        new_parent: Option<Id>,
    ) -> Result<(), DioramaError> {
        self.execute(Box::new(MoveElementsHandler::new(elements, delta, new_parent)))?;
        Ok(())
    }

    /// Attaches `shape` to `host`, or detaches it with `None`.
    pub fn update_attachment(&mut self, shape: Id, host: Option<Id>) -> Result<(), DioramaError> {
        self.execute(Box::new(UpdateAttachmentHandler::new(shape, host)))?;
        Ok(())
    }

    pub fn reconnect_start(
        &mut self,
        connection: Id,
        new_source: Id,
        docking: Option<Point>,
    ) -> Result<(), DioramaError> {
        self.reconnect(connection, ConnectionEnd::Start, new_source, docking)
    }

    pub fn reconnect_end(
        &mut self,
        connection: Id,
        new_target: Id,
        docking: Option<Point>,
    ) -> Result<(), DioramaError> {
        self.reconnect(connection, ConnectionEnd::End, new_target, docking)
    }

    pub fn layout_connection(&mut self, connection: Id, hints: LayoutHints) -> Result<(), DioramaError> {
        self.execute(Box::new(LayoutConnectionHandler::new(connection, hints)))?;
        Ok(())
    }

    pub fn resize_shape(&mut self, shape: Id, bounds: Bounds) -> Result<(), DioramaError> {
        self.execute(Box::new(ResizeShapeHandler::new(shape, bounds)))?;
        Ok(())
    }

    /// Removes a shape with its connections, children and attached shapes.
    pub fn remove_shape(&mut self, shape: Id) -> Result<(), DioramaError> {
        self.execute(Box::new(RemoveShapeHandler::new(shape)))?;
        Ok(())
    }

    pub fn remove_connection(&mut self, connection: Id) -> Result<(), DioramaError> {
        self.execute(Box::new(RemoveConnectionHandler::new(connection)))?;
        Ok(())
    }

    /// Collapses an expanded shape or expands a collapsed one.
    pub fn toggle_collapse(&mut self, shape: Id) -> Result<(), DioramaError> {
        self.execute(Box::new(ToggleShapeCollapseHandler::new(shape)))?;
        Ok(())
    }

    /// Replaces `old` with a new shape built from `descriptor` and returns
    /// the new shape's id.
    ///
    /// Geometry missing from the descriptor is taken from the old shape.
    ///
    /// # Errors
    ///
    /// Fails without touching the diagram if `old` is not a shape, is the
    /// root, or if the descriptor's id or geometry is invalid.
    pub fn replace_element(
        &mut self,
        old: Id,
        descriptor: &ShapeDescriptor,
        options: ReplaceOptions,
    ) -> Result<Id, DioramaError> {
        if old == self.diagram.root() {
            return Err(ModelError::RootMisuse(old, "replaced").into());
        }
        let fallback = self.diagram.shape(old)?.bounds();
        let shape = self.factory.create_shape(&self.diagram, descriptor, fallback)?;
        let id = shape.id();

        info!(old:%, new:% = id, kind = shape.kind(); "Replacing element");
        self.execute(Box::new(ReplaceShapeHandler::new(old, shape, options)))?;
        Ok(id)
    }

    /// Replace options derived from the modeling configuration.
    pub fn default_replace_options(&self) -> ReplaceOptions {
        ReplaceOptions::from(self.config.modeling())
    }

    /// Reverts the most recent command tree. Returns `false` if there was
    /// nothing to undo.
    pub fn undo(&mut self) -> Result<bool, DioramaError> {
        self.stack.undo(&mut self.diagram)
    }

    /// Re-applies the most recently undone command tree. Returns `false` if
    /// there was nothing to redo.
    pub fn redo(&mut self) -> Result<bool, DioramaError> {
        self.stack.redo(&mut self.diagram)
    }

    pub fn can_undo(&self) -> bool {
        self.stack.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.stack.can_redo()
    }

    fn reconnect(
        &mut self,
        connection: Id,
        end: ConnectionEnd,
        shape: Id,
        docking: Option<Point>,
    ) -> Result<(), DioramaError> {
        debug!(connection:%, shape:%, end:?; "Reconnecting");
        self.execute(Box::new(ReconnectHandler::new(connection, end, shape, docking)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;
    use crate::config::{HistoryConfig, ModelingConfig};

    fn modeling() -> Modeling {
        let mut modeling = Modeling::new(Id::new("root"));
        let root = modeling.diagram().root();
        modeling
            .create_shape(
                &ShapeDescriptor::new().with_id("a").at(0.0, 0.0).with_size(100.0, 100.0),
                root,
            )
            .unwrap();
        modeling
            .create_shape(
                &ShapeDescriptor::new().with_id("b").at(300.0, 0.0).with_size(100.0, 100.0),
                root,
            )
            .unwrap();
        modeling
    }

    #[test]
    fn test_create_shape_defaults() {
        let mut modeling = Modeling::new(Id::new("root"));
        let root = modeling.diagram().root();

        let id = modeling.create_shape(&ShapeDescriptor::new(), root).unwrap();

        let shape = modeling.diagram().shape(id).unwrap();
        assert_eq!(id, "shape_1");
        assert_approx_eq!(f32, shape.width(), DEFAULT_SHAPE_SIZE.width());
        assert_approx_eq!(f32, shape.height(), DEFAULT_SHAPE_SIZE.height());
        assert_eq!(shape.parent(), Some(root));
    }

    #[test]
    fn test_create_connection_in_source_parent() {
        let mut modeling = modeling();

        let id = modeling
            .create_connection(Id::new("a"), Id::new("b"), &ConnectionDescriptor::default(), None)
            .unwrap();

        let connection = modeling.diagram().connection(id).unwrap();
        assert_eq!(connection.parent(), Some(modeling.diagram().root()));
        assert_eq!(connection.waypoints(), &[Point::new(50.0, 50.0), Point::new(350.0, 50.0)]);
    }

    #[test]
    fn test_move_and_undo() {
        let mut modeling = modeling();

        modeling
            .move_elements(vec![Id::new("a")], Point::new(10.0, 20.0), None)
            .unwrap();
        assert_approx_eq!(f32, modeling.diagram().shape(Id::new("a")).unwrap().x(), 10.0);

        assert!(modeling.undo().unwrap());
        assert_approx_eq!(f32, modeling.diagram().shape(Id::new("a")).unwrap().x(), 0.0);
        assert!(modeling.can_redo());
    }

    #[test]
    fn test_replace_rejects_root() {
        let mut modeling = modeling();
        let root = modeling.diagram().root();

        let err = modeling
            .replace_element(root, &ShapeDescriptor::new(), ReplaceOptions::default())
            .unwrap_err();

        assert!(matches!(err, DioramaError::Model(ModelError::RootMisuse(..))));
    }

    #[test]
    fn test_replace_rejects_duplicate_id() {
        let mut modeling = modeling();
        let depth = modeling.command_stack().undo_depth();

        let err = modeling
            .replace_element(
                Id::new("a"),
                &ShapeDescriptor::new().with_id("b"),
                ReplaceOptions::default(),
            )
            .unwrap_err();

        assert!(matches!(err, DioramaError::Model(ModelError::DuplicateId(_))));
        assert_eq!(modeling.command_stack().undo_depth(), depth);
    }

    #[test]
    fn test_default_replace_options_follow_config() {
        let config = AppConfig::new(HistoryConfig::default(), ModelingConfig::new(false, 10.0));
        let modeling = Modeling::with_config(Id::new("root"), &config);

        assert!(!modeling.default_replace_options().move_children);
    }

    #[test]
    fn test_remove_shape_cascades_and_undoes() {
        let mut modeling = modeling();
        let connection = modeling
            .create_connection(Id::new("a"), Id::new("b"), &ConnectionDescriptor::default(), None)
            .unwrap();

        modeling.remove_shape(Id::new("a")).unwrap();
        assert!(!modeling.diagram().contains(connection));
        assert!(!modeling.diagram().contains(Id::new("a")));

        modeling.undo().unwrap();
        assert!(modeling.diagram().contains(connection));
        assert!(modeling.diagram().shape(Id::new("b")).unwrap().incoming().contains(&connection));
        modeling.diagram().validate().unwrap();
    }

    #[test]
    fn test_reconnect_both_ends_and_undo() {
        let mut modeling = modeling();
        let root = modeling.diagram().root();
        modeling
            .create_shape(
                &ShapeDescriptor::new().with_id("c").at(300.0, 200.0).with_size(100.0, 100.0),
                root,
            )
            .unwrap();
        let flow = modeling
            .create_connection(Id::new("a"), Id::new("b"), &ConnectionDescriptor::default(), None)
            .unwrap();

        modeling.reconnect_start(flow, Id::new("c"), None).unwrap();
        modeling
            .reconnect_end(flow, Id::new("a"), Some(Point::new(50.0, 60.0)))
            .unwrap();

        let connection = modeling.diagram().connection(flow).unwrap();
        assert_eq!(connection.source(), Id::new("c"));
        assert_eq!(connection.target(), Id::new("a"));
        assert_eq!(connection.waypoints().last(), Some(&Point::new(50.0, 60.0)));

        modeling.undo().unwrap();
        modeling.undo().unwrap();
        let connection = modeling.diagram().connection(flow).unwrap();
        assert_eq!(connection.source(), Id::new("a"));
        assert_eq!(connection.target(), Id::new("b"));
        modeling.diagram().validate().unwrap();
    }

    #[test]
    fn test_update_attachment_round_trip() {
        let mut modeling = modeling();

        modeling.update_attachment(Id::new("a"), Some(Id::new("b"))).unwrap();
        assert_eq!(modeling.diagram().shape(Id::new("a")).unwrap().host(), Some(Id::new("b")));

        modeling.update_attachment(Id::new("a"), None).unwrap();
        assert!(modeling.diagram().shape(Id::new("b")).unwrap().attachers().is_empty());

        modeling.undo().unwrap();
        assert_eq!(modeling.diagram().shape(Id::new("a")).unwrap().host(), Some(Id::new("b")));
    }

    /// Routes every connection straight between its shapes' centers.
    struct CenterToCenter;

    impl Layouter for CenterToCenter {
        fn layout_connection(
            &self,
            diagram: &Diagram,
            connection: Id,
            _hints: LayoutHints,
        ) -> Result<Vec<Point>, ModelError> {
            let connection = diagram.connection(connection)?;
            Ok(vec![
                diagram.shape(connection.source())?.mid(),
                diagram.shape(connection.target())?.mid(),
            ])
        }
    }

    #[test]
    fn test_resize_uses_injected_layouter() {
        let mut modeling = modeling().with_layouter(CenterToCenter);
        let flow = modeling
            .create_connection(
                Id::new("a"),
                Id::new("b"),
                &ConnectionDescriptor::new(vec![
                    Point::new(50.0, 50.0),
                    Point::new(200.0, 20.0),
                    Point::new(350.0, 50.0),
                ]),
                None,
            )
            .unwrap();

        modeling
            .resize_shape(Id::new("b"), Bounds::new(300.0, 200.0, 100.0, 100.0))
            .unwrap();

        assert_eq!(
            modeling.diagram().connection(flow).unwrap().waypoints(),
            &[Point::new(50.0, 50.0), Point::new(350.0, 250.0)]
        );

        modeling.undo().unwrap();
        assert_eq!(modeling.diagram().connection(flow).unwrap().waypoints().len(), 3);
    }

    struct FixedBounds(Bounds);

    impl BoundsComputer for FixedBounds {
        fn compute_bbox(&self, _elements: &[&diorama_core::model::Element]) -> Bounds {
            self.0
        }
    }

    #[test]
    fn test_expand_uses_injected_bounds_computer() {
        let fixed = Bounds::new(-10.0, -10.0, 500.0, 400.0);
        let mut modeling = modeling().with_bounds_computer(FixedBounds(fixed));
        modeling
            .create_shape(
                &ShapeDescriptor::new().with_id("inner").at(10.0, 10.0).with_size(20.0, 20.0),
                Id::new("a"),
            )
            .unwrap();

        modeling.toggle_collapse(Id::new("a")).unwrap();
        assert_eq!(
            modeling.diagram().shape(Id::new("a")).unwrap().bounds(),
            Bounds::new(0.0, 0.0, 100.0, 100.0)
        );

        modeling.toggle_collapse(Id::new("a")).unwrap();
        assert_eq!(modeling.diagram().shape(Id::new("a")).unwrap().bounds(), fixed);
    }
}
