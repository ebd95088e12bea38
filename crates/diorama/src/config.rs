//! Configuration types for Diorama modeling.
//!
//! This module provides configuration structures that control the undo
//! history and the defaults of modeling operations. All types implement
//! [`serde::Deserialize`] with every field defaulted, so a partial TOML
//! document is a valid configuration.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining history and modeling settings.
//! - [`HistoryConfig`] - Controls how many records the undo ledger keeps.
//! - [`ModelingConfig`] - Defaults for replacement and auto-resize.
//!
//! # Example
//!
//! ```
//! # use diorama::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.history().max_depth(), 100);
//! assert!(config.modeling().move_children());
//! ```

use serde::Deserialize;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Undo history section.
    #[serde(default)]
    history: HistoryConfig,

    /// Modeling defaults section.
    #[serde(default)]
    modeling: ModelingConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified sections.
    pub fn new(history: HistoryConfig, modeling: ModelingConfig) -> Self {
        Self { history, modeling }
    }

    /// Returns the history configuration.
    pub fn history(&self) -> &HistoryConfig {
        &self.history
    }

    /// Returns the modeling configuration.
    pub fn modeling(&self) -> &ModelingConfig {
        &self.modeling
    }
}

/// Limits of the undo ledger.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of top-level records kept for undo. The oldest record
    /// is evicted first.
    max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_depth: 100 }
    }
}

impl HistoryConfig {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }
}

/// Defaults applied by modeling operations.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelingConfig {
    /// Whether a replacement adopts the children of the replaced shape.
    move_children: bool,

    /// Padding added around visible children when a shape is resized to
    /// fit them.
    children_padding: f32,
}

impl Default for ModelingConfig {
    fn default() -> Self {
        Self {
            move_children: true,
            children_padding: 10.0,
        }
    }
}

impl ModelingConfig {
    pub fn new(move_children: bool, children_padding: f32) -> Self {
        Self {
            move_children,
            children_padding,
        }
    }

    pub fn move_children(&self) -> bool {
        self.move_children
    }

    pub fn children_padding(&self) -> f32 {
        self.children_padding
    }
}
