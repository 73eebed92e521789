use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::editor::{AlignDomain, AlignmentMode, Document, PendingCaret, Snippet};
use crate::render::{self, FormulaSummary, RenderOptions, RenderTree, UnicodePreview};
use crate::snippets::{Category, SnippetCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
struct Toast {
    level: ToastLevel,
    message: String,
    expires_at: Instant,
}

/// What the preview pane shows for the current buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Preview {
    #[default]
    Disabled,
    Lines(Vec<render::Line>),
    /// The renderer's diagnostic, shown in place of the preview.
    Error(String),
}

/// The complete application state.
///
/// All state lives here - no global or scattered state.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub document: Document,
    pub alignment: AlignmentMode,
    pub category: Category,
    pub catalog: SnippetCatalog,
    /// Selected row of the snippet palette while it is open.
    pub palette: Option<usize>,
    pub preview: Preview,
    preview_revision: Option<u64>,
    pub preview_enabled: bool,
    pub render_options: RenderOptions,
    pending_caret: Option<PendingCaret>,
    pub editor_scroll_offset: usize,
    pub terminal_size: (u16, u16),
    pub help_visible: bool,
    pub help_scroll: usize,
    toast: Option<Toast>,
    pub config_global_path: Option<PathBuf>,
    pub config_local_path: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub should_quit: bool,
}

impl Model {
    /// Create a model editing `document`, caret at the end of the text.
    pub fn new(document: Document, terminal_size: (u16, u16)) -> Self {
        let end = document.len_chars();
        Self {
            document: document.with_selection(crate::editor::Selection::caret(end)),
            preview_enabled: true,
            terminal_size,
            export_dir: PathBuf::from("."),
            ..Self::default()
        }
    }

    pub const fn align_domain(&self) -> AlignDomain {
        self.category.align_domain()
    }

    pub fn active_snippets(&self) -> &[Snippet] {
        self.catalog.snippets(self.category)
    }

    pub const fn has_pending_caret(&self) -> bool {
        self.pending_caret.is_some()
    }

    pub(super) const fn set_pending_caret(&mut self, pending: PendingCaret) {
        self.pending_caret = Some(pending);
    }

    /// Place the caret requested by the last edit, if any. Returns whether
    /// one was pending.
    pub(super) fn commit_pending_caret(&mut self) -> bool {
        let Some(pending) = self.pending_caret.take() else {
            return false;
        };
        self.document.place_caret(pending);
        true
    }

    /// Rows available to the editor pane.
    pub fn editor_height(&self) -> usize {
        let area = ratatui::layout::Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1);
        usize::from(crate::ui::editor_area_height(area, self.preview_enabled))
    }

    pub(super) fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(Toast {
            level,
            message: message.into(),
            expires_at: Instant::now() + Duration::from_secs(4),
        });
    }

    pub(super) fn expire_toast(&mut self, now: Instant) -> bool {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= now)
        {
            self.toast = None;
            return true;
        }
        false
    }

    pub fn active_toast(&self) -> Option<(&str, ToastLevel)> {
        self.toast
            .as_ref()
            .map(|toast| (toast.message.as_str(), toast.level))
    }

    /// Render the buffer to a tree for the preview pane or an export.
    ///
    /// # Errors
    ///
    /// Returns the renderer's diagnostic for malformed markup.
    pub fn render_tree(&self) -> Result<RenderTree, render::RenderError> {
        render::render_source(
            &UnicodePreview,
            &FormulaSummary,
            &self.document.text(),
            &self.render_options,
        )
    }

    /// Re-render the preview if the text changed since the last call.
    pub fn refresh_preview(&mut self) {
        if !self.preview_enabled {
            self.preview = Preview::Disabled;
            self.preview_revision = None;
            return;
        }
        let revision = self.document.revision();
        if self.preview_revision == Some(revision) {
            return;
        }
        self.preview = match self.render_tree() {
            Ok(tree) => Preview::Lines(tree.lines()),
            Err(err) => Preview::Error(err.to_string()),
        };
        self.preview_revision = Some(revision);
    }
}
