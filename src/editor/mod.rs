//! The editing-assistance engine.
//!
//! Every assisted transformation is a pure function from the current
//! [`Document`] to an [`Edit`]. The host commits the edit with
//! [`Document::apply_edit`], draws the new text, and only then places the
//! requested caret with [`Document::place_caret`].

mod align;
mod buffer;
mod intercept;
mod matcher;
mod snippet;

pub use align::{
    AlignDomain, AlignmentMode, BLOCK_BEGIN, BLOCK_END, LINE_BREAK, disable, disable_text, enable,
    enable_text, toggle,
};
pub use buffer::{Direction, Document, Edit, EditError, PendingCaret, Selection};
pub use intercept::{
    Intercept, LINE_CONTINUATION, SCALED_SUFFIX, SCALING_TRIGGERS, auto_pair, bare_newline,
    fraction, intercept, line_continuation, scale_delimiters, superscript,
};
pub use matcher::{BracketPair, OpenMatch, SCALED_PREFIX, find_matching_open, match_open};
pub use snippet::{Snippet, insert};
