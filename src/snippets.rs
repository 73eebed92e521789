//! Built-in snippet catalogs and user snippet files.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::editor::{AlignDomain, Snippet};

/// A tab of the snippet bar.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Math,
    #[serde(rename = "chem")]
    #[value(name = "chem")]
    Chemistry,
    Symbols,
}

impl Category {
    pub const ALL: [Self; 3] = [Self::Math, Self::Chemistry, Self::Symbols];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Math => "Math",
            Self::Chemistry => "Chemistry",
            Self::Symbols => "Symbols",
        }
    }

    /// Name used on the command line and in config files.
    pub const fn flag_value(self) -> &'static str {
        match self {
            Self::Math => "math",
            Self::Chemistry => "chem",
            Self::Symbols => "symbols",
        }
    }

    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::Math => Self::Chemistry,
            Self::Chemistry => Self::Symbols,
            Self::Symbols => Self::Math,
        }
    }

    /// Reactions align at the arrow; everything else at `=`.
    pub const fn align_domain(self) -> AlignDomain {
        match self {
            Self::Chemistry => AlignDomain::Chemistry,
            Self::Math | Self::Symbols => AlignDomain::Math,
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Math => 0,
            Self::Chemistry => 1,
            Self::Symbols => 2,
        }
    }
}

/// `(id, label, insert_text, description)`
type Entry = (&'static str, &'static str, &'static str, &'static str);

const MATH: &[Entry] = &[
    ("frac", "a⁄b", "\\frac{a}{b}", "Fraction"),
    ("cdot", "·", "\\cdot ", "Multiplication Dot"),
    ("times", "×", "\\times ", "Multiplication Sign"),
    ("pm", "±", "\\pm ", "Plus-Minus"),
    ("approx", "≈", "\\approx ", "Approximately Equal"),
    ("geq", "⩾", "\\geqslant ", "Greater Than or Equal To"),
    ("leq", "⩽", "\\leqslant ", "Less Than or Equal To"),
    ("sup", "x²", "x^{2}", "Superscript"),
    ("sub", "xᵢ", "x_{i}", "Subscript"),
    ("sqrt", "√x", "\\sqrt{x}", "Square Root"),
    ("rarrow", "→", "\\rightarrow ", "Right Arrow"),
    ("harpoon", "⇀", "\\overrightharpoon{text}", "Over Right Harpoon"),
    ("vec", "F⃗", "\\vec{F}", "Vector F"),
    ("sin", "sin θ", "\\text{sin}\\ \\theta", "Sine"),
    ("cos", "cos θ", "\\text{cos}\\ \\theta", "Cosine"),
    ("tan", "tan θ", "\\text{tan}\\ \\theta", "Tangent"),
    ("asin", "sin⁻¹ θ", "\\text{sin}^{-1}\\ \\theta", "Inverse Sine"),
    ("acos", "cos⁻¹ θ", "\\text{cos}^{-1}\\ \\theta", "Inverse Cosine"),
    ("atan", "tan⁻¹ θ", "\\text{tan}^{-1}\\ \\theta", "Inverse Tangent"),
];

const CHEMISTRY: &[Entry] = &[
    ("equilibrium", "A ⇌ B", "\\ce{A <=> B}", "Equilibrium"),
    ("formula", "H₂O", "\\ce{H2O}", "Chemical Formula"),
    ("reaction", "A → B", "\\ce{A -> B}", "Reaction Arrow"),
    ("isotope", "²²⁷₉₀Th⁺", "\\ce{^{227}_{90}Th+}", "Isotope"),
    ("complex", "KCr(SO₄)₂·12H₂O", "\\ce{KCr(SO4)2*12H2O}", "Complex Chemical Formula"),
    ("bonds", "A-B=C≡D", "\\ce{A-B=C#D}", "Chemical Bonds"),
    (
        "annotated",
        "A →[above][below] B",
        "\\ce{A ->[{text above}][{text below}] B}",
        "Reaction with text",
    ),
];

const SYMBOLS: &[Entry] = &[
    ("pi", "π", "\\pi ", "Pi"),
    ("infty", "∞", "\\infty ", "Infinity"),
    ("alpha", "α", "\\alpha ", "Alpha"),
    ("beta", "β", "\\beta ", "Beta"),
    ("gamma", "γ", "\\gamma ", "Gamma"),
    ("delta", "δ", "\\delta ", "Delta"),
    ("epsilon", "ε", "\\epsilon ", "Epsilon"),
    ("theta", "θ", "\\theta ", "Theta"),
    ("lambda", "λ", "\\lambda ", "Lambda"),
    ("mu", "μ", "\\mu ", "Mu"),
    ("sigma", "σ", "\\sigma ", "Sigma"),
    ("omega", "ω", "\\omega ", "Omega"),
    ("Delta", "Δ", "\\Delta ", "Delta (uppercase)"),
    ("Omega", "Ω", "\\Omega ", "Omega (uppercase)"),
];

/// Snippets grouped by category, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetCatalog {
    groups: [Vec<Snippet>; 3],
}

impl Default for SnippetCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SnippetCatalog {
    pub fn builtin() -> Self {
        let build = |entries: &[Entry]| -> Vec<Snippet> {
            entries
                .iter()
                .map(|&(id, label, text, description)| Snippet::new(id, label, text, description))
                .collect()
        };
        Self {
            groups: [build(MATH), build(CHEMISTRY), build(SYMBOLS)],
        }
    }

    pub fn snippets(&self, category: Category) -> &[Snippet] {
        &self.groups[category.index()]
    }

    pub fn get(&self, category: Category, index: usize) -> Option<&Snippet> {
        self.snippets(category).get(index)
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append user snippets to their categories.
    pub fn extend(&mut self, user: impl IntoIterator<Item = UserSnippet>) {
        for entry in user {
            self.groups[entry.category.index()].push(entry.snippet);
        }
    }

    /// Built-in catalog plus the snippets in `path`, if given.
    ///
    /// # Errors
    ///
    /// Returns an error if the user file cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut catalog = Self::builtin();
        if let Some(path) = path {
            let user = load_user_snippets(path)?;
            tracing::debug!(count = user.len(), path = %path.display(), "loaded user snippets");
            catalog.extend(user);
        }
        Ok(catalog)
    }
}

/// One entry of a user snippet file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSnippet {
    #[serde(flatten)]
    pub snippet: Snippet,
    #[serde(default)]
    pub category: Category,
}

/// Read a JSON array of snippets.
///
/// # Errors
///
/// Returns an error naming the file if it cannot be read or is not a valid
/// snippet array.
pub fn load_user_snippets(path: &Path) -> Result<Vec<UserSnippet>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snippet file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse snippet file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_catalog_sizes() {
        let catalog = SnippetCatalog::builtin();
        assert_eq!(catalog.snippets(Category::Math).len(), 19);
        assert_eq!(catalog.snippets(Category::Chemistry).len(), 7);
        assert_eq!(catalog.snippets(Category::Symbols).len(), 14);
        assert_eq!(catalog.len(), 40);
    }

    #[test]
    fn test_builtin_ids_are_unique_per_category() {
        let catalog = SnippetCatalog::builtin();
        for category in Category::ALL {
            let mut ids: Vec<_> = catalog.snippets(category).iter().map(|s| &s.id).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), catalog.snippets(category).len());
        }
    }

    #[test]
    fn test_fraction_snippet_has_two_placeholders() {
        let catalog = SnippetCatalog::builtin();
        let frac = catalog.get(Category::Math, 0).unwrap();
        assert_eq!(frac.insert_text, "\\frac{a}{b}");
        assert_eq!(frac.placeholders().len(), 2);
    }

    #[test]
    fn test_category_cycle_and_domain() {
        assert_eq!(Category::Math.next(), Category::Chemistry);
        assert_eq!(Category::Symbols.next(), Category::Math);
        assert_eq!(Category::Chemistry.align_domain(), AlignDomain::Chemistry);
        assert_eq!(Category::Symbols.align_domain(), AlignDomain::Math);
    }

    #[test]
    fn test_load_user_snippets_appends_to_category() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": "ka", "label": "Ka", "insert_text": "K_{{a}}", "description": "Acid constant", "category": "chem"}},
                {{"id": "hbar", "label": "ħ", "insert_text": "\\hbar "}}
            ]"#
        )
        .unwrap();

        let catalog = SnippetCatalog::load(Some(file.path())).unwrap();
        let chem = catalog.snippets(Category::Chemistry);
        assert_eq!(chem.last().unwrap().id, "ka");
        assert_eq!(chem.last().unwrap().insert_text, "K_{a}");

        let math = catalog.snippets(Category::Math);
        assert_eq!(math.last().unwrap().insert_text, "\\hbar ");
        assert_eq!(math.last().unwrap().description, "");
    }

    #[test]
    fn test_load_user_snippets_reports_path_on_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        let err = load_user_snippets(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse snippet file"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = SnippetCatalog::load(Some(&dir.path().join("none.json"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read snippet file"));
    }
}
