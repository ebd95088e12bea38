//! Scenario files: an initial diagram plus a list of modeling steps.
//!
//! ```toml
//! root = "root"
//!
//! [[shapes]]
//! id = "sub"
//! type = "subProcess"
//! x = 100.0
//! y = 100.0
//! width = 300.0
//! height = 200.0
//! collapsed = true
//!
//! [[shapes]]
//! id = "task"
//! parent = "sub"
//! hidden = true
//!
//! [[shapes]]
//! id = "timer"
//! parent = "sub"
//! host = "task"
//!
//! [[steps]]
//! action = "toggle"
//! shape = "sub"
//!
//! [[steps]]
//! action = "undo"
//! ```

use log::{debug, info, warn};
use serde::Deserialize;

use diorama::{
    DioramaError, Modeling, ReplaceOptions,
    config::AppConfig,
    geometry::{Bounds, Point},
    identifier::Id,
    model::{ConnectionDescriptor, Diagram, ShapeDescriptor},
    services::{DEFAULT_SHAPE_SIZE, ElementFactory},
};

/// A parsed scenario file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_root")]
    root: Id,
    #[serde(default)]
    shapes: Vec<ShapeEntry>,
    #[serde(default)]
    connections: Vec<ConnectionEntry>,
    #[serde(default)]
    steps: Vec<Step>,
}

/// An initial shape. Without `parent` it is placed under the root.
#[derive(Debug, Clone, Deserialize)]
struct ShapeEntry {
    #[serde(default)]
    parent: Option<Id>,
    /// Shape this one is attached to.
    #[serde(default)]
    host: Option<Id>,
    #[serde(flatten)]
    descriptor: ShapeDescriptor,
}

/// An initial connection. Without `parent` it is placed in the source's
/// parent.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnectionEntry {
    #[serde(default)]
    id: Option<Id>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    source: Id,
    target: Id,
    #[serde(default)]
    waypoints: Vec<Point>,
    #[serde(default)]
    parent: Option<Id>,
}

/// One modeling operation of a scenario.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case", deny_unknown_fields)]
pub enum Step {
    Toggle {
        shape: Id,
    },
    Replace {
        shape: Id,
        with: ShapeDescriptor,
        #[serde(default)]
        move_children: Option<bool>,
    },
    Undo,
    Redo,
}

fn default_root() -> Id {
    Id::new("root")
}

impl Scenario {
    /// Parses a scenario from TOML source.
    ///
    /// # Errors
    ///
    /// Returns [`DioramaError::Scenario`] with the offending span when the
    /// source is not a valid scenario.
    pub fn parse(src: &str) -> Result<Self, DioramaError> {
        toml::from_str(src)
            .map_err(|err| DioramaError::new_scenario_error(err.message(), err.span(), src))
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Builds the initial diagram. Nothing is recorded in the history.
    pub fn build(&self, config: &AppConfig) -> Result<Modeling, DioramaError> {
        let mut diagram = Diagram::new(self.root);
        let mut factory = ElementFactory::new();
        let fallback = Bounds::new_from_top_left(Point::default(), DEFAULT_SHAPE_SIZE);

        let mut attachments = Vec::new();
        for entry in &self.shapes {
            let parent = entry.parent.unwrap_or(self.root);
            let shape = factory.create_shape(&diagram, &entry.descriptor, fallback)?;
            debug!(id:% = shape.id(), parent:%; "Adding scenario shape");
            if let Some(host) = entry.host {
                attachments.push((shape.id(), host));
            }
            diagram.add_shape(shape, parent, None)?;
        }

        // Hosts may be declared after their attachers.
        for (shape, host) in attachments {
            diagram.set_host(shape, Some(host))?;
        }

        for entry in &self.connections {
            let descriptor = ConnectionDescriptor {
                id: entry.id,
                kind: entry.kind.clone(),
                waypoints: entry.waypoints.clone(),
            };
            let parent = match entry.parent {
                Some(parent) => parent,
                None => diagram.shape(entry.source)?.parent().unwrap_or(self.root),
            };
            let connection =
                factory.create_connection(&diagram, &descriptor, entry.source, entry.target)?;
            debug!(id:% = connection.id(), parent:%; "Adding scenario connection");
            diagram.add_connection(connection, parent, None)?;
        }

        diagram.validate()?;
        info!(elements = diagram.len(); "Scenario diagram built");
        Ok(Modeling::from_diagram(diagram, config))
    }

    /// Runs every step against `modeling`.
    pub fn run(&self, modeling: &mut Modeling) -> Result<(), DioramaError> {
        for (index, step) in self.steps.iter().enumerate() {
            debug!(index, step:?; "Running scenario step");
            match step {
                Step::Toggle { shape } => modeling.toggle_collapse(*shape)?,
                Step::Replace {
                    shape,
                    with,
                    move_children,
                } => {
                    let mut options = modeling.default_replace_options();
                    if let Some(move_children) = move_children {
                        options = ReplaceOptions {
                            move_children: *move_children,
                        };
                    }
                    let new = modeling.replace_element(*shape, with, options)?;
                    info!(old:% = shape, new:%; "Replaced shape");
                }
                Step::Undo => {
                    if !modeling.undo()? {
                        warn!(index; "Nothing to undo");
                    }
                }
                Step::Redo => {
                    if !modeling.redo()? {
                        warn!(index; "Nothing to redo");
                    }
                }
            }
        }
        modeling.diagram().validate()?;
        Ok(())
    }
}
