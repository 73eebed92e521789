//! Terminal UI components.
//!
//! The screen is split top to bottom into the editor pane, the live
//! preview pane, the snippet bar and the status bar. Help and the snippet
//! palette are drawn as centered overlays.

mod overlays;
mod render;
mod status;

pub use overlays::palette_rect;
pub use render::{PaneLayout, editor_area_height, render, split_panes};

/// Share of the body given to the editor when the preview is shown.
pub const EDITOR_HEIGHT_PERCENT: u16 = 55;
pub const PREVIEW_HEIGHT_PERCENT: u16 = 45;
