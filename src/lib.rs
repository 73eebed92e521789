// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderTree)
    clippy::module_name_repetitions
)]

//! # eqpad
//!
//! A terminal equation editor with typing assistance and a live preview.
//!
//! eqpad edits LaTeX-style math and chemistry markup with:
//! - Auto-paired brackets, `^{}` superscripts and `/` fractions
//! - `\left` / `\right` scaling for `\sum`, `\int` and `\frac` groups
//! - Aligned-block toggling and `\\` row continuation
//! - Snippet catalogs for math, chemistry and symbols
//! - A Unicode preview with structure-diagram summaries, exportable as
//!   PNG or SVG
//!
//! ## Architecture
//!
//! eqpad uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`editor`]: Document buffer and the editing-assistance engine
//! - [`snippets`]: Built-in and user snippet catalogs
//! - [`render`]: Markup rendering and structure diagrams
//! - [`export`]: PNG / SVG export
//! - [`config`]: Flag-file configuration
//! - [`ui`]: Terminal UI components

pub mod app;
pub mod config;
pub mod editor;
pub mod export;
pub mod render;
pub mod snippets;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::editor::{Document, Edit, Selection};
    pub use crate::render::{MathRenderer, RenderOptions, RenderTree};
}
