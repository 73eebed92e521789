//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{Model, Preview, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::editor::Document;
use crate::render::RenderOptions;
use crate::snippets::{Category, SnippetCatalog};

/// Buffer contents when no file is given.
pub const DEFAULT_SEED: &str = "f(x) = \\frac{-b \\pm \\sqrt{b^2-4ac}}{2a} \\\\\n\\ce{H2O -> H+ + OH-} \\\\\n\\smiles{C1=CC=C(C=C1)C(C(C(=O)O)N)O}*{5}";

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    seed: String,
    category: Category,
    catalog: SnippetCatalog,
    preview_enabled: bool,
    trust: bool,
    export_dir: PathBuf,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application editing `seed`.
    pub fn new(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            category: Category::default(),
            catalog: SnippetCatalog::builtin(),
            preview_enabled: true,
            trust: true,
            export_dir: PathBuf::from("."),
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Snippet category active at startup.
    pub const fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_catalog(mut self, catalog: SnippetCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Show or hide the live preview pane.
    pub const fn with_preview(mut self, enabled: bool) -> Self {
        self.preview_enabled = enabled;
        self
    }

    /// Allow macros to emit raw markup such as structure diagrams.
    pub const fn with_trust(mut self, trust: bool) -> Self {
        self.trust = trust;
        self
    }

    /// Directory that receives exported images.
    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Set config paths to show in help.
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }

    /// The initial model for a terminal of `terminal_size`.
    pub fn build_model(&self, terminal_size: (u16, u16)) -> Model {
        let mut model = Model::new(Document::from_text(&self.seed), terminal_size);
        model.category = self.category;
        model.catalog = self.catalog.clone();
        model.preview_enabled = self.preview_enabled;
        model.render_options = RenderOptions::default().with_trust(self.trust);
        model.export_dir.clone_from(&self.export_dir);
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        update::ensure_caret_visible(&mut model);
        model
    }
}
