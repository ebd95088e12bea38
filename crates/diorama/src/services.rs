//! Collaborators consulted by command handlers.
//!
//! Handlers never own policy. Permission checks, connection routing and
//! bounding boxes are delegated to the injectable services bundled in
//! [`Services`], each with a default implementation.

mod bounds;
mod factory;
mod layouter;
mod rules;

pub use bounds::{BoundsComputer, ChildrenBounds};
pub use factory::{DEFAULT_SHAPE_SIZE, ElementFactory};
pub use layouter::{DockingLayouter, LayoutHints, Layouter};
pub use rules::{AllowAll, RuleAction, RuleContext, Rules};

use crate::config::ModelingConfig;

/// The collaborators available to handlers through their scope.
pub struct Services {
    rules: Box<dyn Rules>,
    layouter: Box<dyn Layouter>,
    bounds: Box<dyn BoundsComputer>,
}

impl Services {
    /// Creates the default services for `config`.
    pub fn new(config: &ModelingConfig) -> Self {
        Self {
            rules: Box::new(AllowAll),
            layouter: Box::new(DockingLayouter),
            bounds: Box::new(ChildrenBounds::new(config.children_padding())),
        }
    }

    pub fn set_rules(&mut self, rules: impl Rules + 'static) {
        self.rules = Box::new(rules);
    }

    pub fn set_layouter(&mut self, layouter: impl Layouter + 'static) {
        self.layouter = Box::new(layouter);
    }

    pub fn set_bounds_computer(&mut self, bounds: impl BoundsComputer + 'static) {
        self.bounds = Box::new(bounds);
    }

    pub fn rules(&self) -> &dyn Rules {
        self.rules.as_ref()
    }

    pub fn layouter(&self) -> &dyn Layouter {
        self.layouter.as_ref()
    }

    pub fn bounds_computer(&self) -> &dyn BoundsComputer {
        self.bounds.as_ref()
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(&ModelingConfig::default())
    }
}
