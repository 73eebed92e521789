//! Image export of the rendered preview.
//!
//! Builds an SVG with one `<text>` row per preview line and, for PNG,
//! rasterizes it with `resvg` at [`OVERSAMPLE`]x onto a transparent pixmap.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use resvg::usvg::fontdb;

use crate::render::RenderTree;

/// Pixel-ratio of PNG exports relative to the SVG's own size.
pub const OVERSAMPLE: f32 = 4.0;

const FONT_SIZE: u32 = 24;
const PADDING: u32 = 16;
const FONT_FAMILY: &str = "DejaVu Sans, Noto Sans, sans-serif";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Png,
    Svg,
}

impl ExportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    pub fn file_name(self) -> String {
        format!("equation.{}", self.extension())
    }
}

/// Width and height in SVG user units.
pub fn svg_size(tree: &RenderTree) -> (u32, u32) {
    let lines = tree.lines();
    let widest = lines
        .iter()
        .map(|line| unicode_width::UnicodeWidthStr::width(line.text.as_str()))
        .max()
        .unwrap_or(0);
    let rows: u32 = lines.iter().map(|line| line.height).sum();
    #[allow(clippy::cast_possible_truncation)]
    let width = PADDING * 2 + widest as u32 * FONT_SIZE * 3 / 5;
    let height = PADDING * 2 + rows.max(1) * line_advance();
    (width.max(1), height)
}

const fn line_advance() -> u32 {
    FONT_SIZE * 3 / 2
}

/// Render the preview lines as a standalone SVG document with no
/// background.
pub fn tree_to_svg(tree: &RenderTree) -> String {
    let (width, height) = svg_size(tree);
    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">\n"
    );
    let mut top = PADDING;
    for line in tree.lines() {
        let size = FONT_SIZE * line.height;
        top += line_advance() * line.height;
        let _ = writeln!(
            svg,
            "  <text x=\"{PADDING}\" y=\"{}\" font-family=\"{FONT_FAMILY}\" font-size=\"{size}\">{}</text>",
            top - line_advance() / 3,
            escape_xml(&line.text)
        );
    }
    svg.push_str("</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// Rasterize an SVG string at `scale`, keeping transparency.
///
/// # Errors
///
/// Returns an error if the SVG cannot be parsed or the pixmap cannot be
/// allocated.
pub fn rasterize_svg(svg: &str, scale: f32) -> Result<image::RgbaImage> {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();

    let opts = resvg::usvg::Options {
        fontdb: Arc::new(db),
        ..Default::default()
    };

    let tree = resvg::usvg::Tree::from_str(svg, &opts).context("Failed to parse generated SVG")?;
    let size = tree.size();

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let width = (size.width() * scale).ceil() as u32;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let height = (size.height() * scale).ceil() as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| anyhow::anyhow!("failed to create pixmap {width}x{height}"))?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    // tiny-skia stores premultiplied alpha; PNG wants straight alpha.
    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow::anyhow!("failed to create image from pixmap data"))
}

/// Write the rendered tree to `dir` and return the file path.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, rasterization
/// fails, or the file cannot be written.
pub fn export_tree(tree: &RenderTree, format: ExportFormat, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export dir {}", dir.display()))?;
    let path = dir.join(format.file_name());
    let svg = tree_to_svg(tree);
    match format {
        ExportFormat::Svg => std::fs::write(&path, svg)
            .with_context(|| format!("Failed to write {}", path.display()))?,
        ExportFormat::Png => rasterize_svg(&svg, OVERSAMPLE)?
            .save(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?,
    }
    tracing::debug!(path = %path.display(), "exported preview");
    Ok(path)
}
