//! Plain-text preview renderer.
//!
//! Approximates typeset output with Unicode: Greek letters and operators
//! become their symbols, scripts use superscript/subscript characters where
//! every char has one, fractions and roots are written inline. Layout
//! commands (`\left`, `\right`, `&`, environments) are dropped.

use super::macros::Scanner;
use super::{MathRenderer, Node, NodeTag, RenderError, RenderOptions, RenderTree, expand_macros};

/// Renderer used for the live preview pane and for exports.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodePreview;

impl MathRenderer for UnicodePreview {
    fn render(&self, input: &str, options: &RenderOptions) -> Result<RenderTree, RenderError> {
        let source = options.strip_display(input);
        let expanded = expand_macros(source, &options.macros)?;
        Converter {
            trust: options.trust,
        }
        .convert(&expanded)
    }
}

struct Converter {
    trust: bool,
}

impl Converter {
    fn convert(&self, text: &str) -> Result<RenderTree, RenderError> {
        let mut scanner = Scanner::new(text);
        let mut tree = RenderTree::default();
        while let Some(ch) = scanner.bump() {
            match ch {
                '\\' => self.command(&mut scanner, &mut tree)?,
                '{' => {
                    let inner = scanner.read_group_body()?;
                    tree.extend(self.convert(&inner)?);
                }
                '}' => {
                    return Err(RenderError::UnbalancedGroup {
                        position: scanner.pos() - 1,
                    });
                }
                '^' | '_' => {
                    let arg = scanner.read_arg(&ch.to_string())?;
                    let text = self.inline(&arg)?;
                    tree.push_text(&script(ch, &text));
                }
                '&' => {}
                '~' => tree.push_text(" "),
                c if c.is_whitespace() => tree.push_text(" "),
                c => tree.push_text(c.encode_utf8(&mut [0u8; 4])),
            }
        }
        Ok(tree)
    }

    /// Convert a nested argument to a single line of text.
    fn inline(&self, text: &str) -> Result<String, RenderError> {
        Ok(self.convert(text)?.flatten())
    }

    fn command(&self, scanner: &mut Scanner, tree: &mut RenderTree) -> Result<(), RenderError> {
        let name = scanner.read_command_name();
        match name.as_str() {
            "" => tree.push_text("\\"),
            "\\" | "cr" | "newline" => tree.push(Node::LineBreak),
            " " | "," | ";" | ":" | "quad" | "qquad" => tree.push_text(" "),
            "!" => {}
            "{" | "}" | "&" | "%" | "$" | "#" | "_" => tree.push_text(&name),
            "frac" | "dfrac" | "tfrac" => {
                let num = self.inline(&scanner.read_arg(&name)?)?;
                let den = self.inline(&scanner.read_arg(&name)?)?;
                tree.push_text(&format!("{}⁄{}", grouped(&num), grouped(&den)));
            }
            "sqrt" => {
                let index = scanner.read_optional();
                let radicand = self.inline(&scanner.read_arg(&name)?)?;
                let sign = match index.as_deref().map(str::trim) {
                    None | Some("" | "2") => "√".to_string(),
                    Some("3") => "∛".to_string(),
                    Some("4") => "∜".to_string(),
                    Some(n) => format!("{}√", script('^', n)),
                };
                tree.push_text(&format!("{sign}{}", grouped(&radicand)));
            }
            "text" | "textrm" | "textbf" | "textit" | "mbox" => {
                tree.push_text(&scanner.read_arg(&name)?);
            }
            "mathrm" | "mathbf" | "mathit" | "operatorname" => {
                let arg = scanner.read_arg(&name)?;
                tree.push_text(&self.inline(&arg)?);
            }
            "ce" => {
                let arg = scanner.read_arg(&name)?;
                tree.push_text(&chemistry(&arg));
            }
            "left" | "right" | "big" | "Big" | "bigg" | "Bigg" => {
                if scanner.peek() == Some('.') {
                    scanner.bump();
                }
            }
            "begin" | "end" => {
                scanner.read_arg(&name)?;
            }
            "structure" => {
                if !self.trust {
                    return Err(RenderError::Untrusted { command: name });
                }
                let raw = scanner.read_arg(&name)?;
                let height = scanner.read_arg(&name)?;
                tree.push(Node::marked(
                    NodeTag::Structure,
                    &[("raw", raw.as_str()), ("height", height.as_str())],
                ));
            }
            other => {
                if let Some(accent) = accent(other) {
                    let base = self.inline(&scanner.read_arg(&name)?)?;
                    tree.push_text(&format!("{base}{accent}"));
                } else if let Some(symbol) = symbol(other) {
                    tree.push_text(symbol);
                } else {
                    tree.push_text(&format!("\\{other}"));
                }
            }
        }
        Ok(())
    }
}

/// Parenthesize anything longer than a single alphanumeric run.
fn grouped(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= 1 || text.chars().all(char::is_alphanumeric) {
        text.to_string()
    } else {
        format!("({text})")
    }
}

/// `^`/`_` applied to `text`: script characters when every char has one,
/// otherwise the marker and the text in parentheses.
fn script(marker: char, text: &str) -> String {
    let map = if marker == '^' { superscript } else { subscript };
    let text = text.trim();
    text.chars()
        .map(map)
        .collect::<Option<String>>()
        .unwrap_or_else(|| format!("{marker}({text})"))
}

const fn superscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '⁰',
        '1' => '¹',
        '2' => '²',
        '3' => '³',
        '4' => '⁴',
        '5' => '⁵',
        '6' => '⁶',
        '7' => '⁷',
        '8' => '⁸',
        '9' => '⁹',
        '+' => '⁺',
        '-' | '−' => '⁻',
        '=' => '⁼',
        '(' => '⁽',
        ')' => '⁾',
        'a' => 'ᵃ',
        'b' => 'ᵇ',
        'c' => 'ᶜ',
        'd' => 'ᵈ',
        'e' => 'ᵉ',
        'f' => 'ᶠ',
        'g' => 'ᵍ',
        'h' => 'ʰ',
        'i' => 'ⁱ',
        'j' => 'ʲ',
        'k' => 'ᵏ',
        'l' => 'ˡ',
        'm' => 'ᵐ',
        'n' => 'ⁿ',
        'o' => 'ᵒ',
        'p' => 'ᵖ',
        'r' => 'ʳ',
        's' => 'ˢ',
        't' => 'ᵗ',
        'u' => 'ᵘ',
        'v' => 'ᵛ',
        'w' => 'ʷ',
        'x' => 'ˣ',
        'y' => 'ʸ',
        'z' => 'ᶻ',
        _ => return None,
    })
}

const fn subscript(c: char) -> Option<char> {
    Some(match c {
        '0' => '₀',
        '1' => '₁',
        '2' => '₂',
        '3' => '₃',
        '4' => '₄',
        '5' => '₅',
        '6' => '₆',
        '7' => '₇',
        '8' => '₈',
        '9' => '₉',
        '+' => '₊',
        '-' | '−' => '₋',
        '=' => '₌',
        '(' => '₍',
        ')' => '₎',
        'a' => 'ₐ',
        'e' => 'ₑ',
        'h' => 'ₕ',
        'i' => 'ᵢ',
        'j' => 'ⱼ',
        'k' => 'ₖ',
        'l' => 'ₗ',
        'm' => 'ₘ',
        'n' => 'ₙ',
        'o' => 'ₒ',
        'p' => 'ₚ',
        'r' => 'ᵣ',
        's' => 'ₛ',
        't' => 'ₜ',
        'u' => 'ᵤ',
        'v' => 'ᵥ',
        'x' => 'ₓ',
        _ => return None,
    })
}

fn accent(name: &str) -> Option<char> {
    Some(match name {
        "vec" => '\u{20D7}',
        "overrightharpoon" => '\u{20D1}',
        "hat" => '\u{0302}',
        "bar" | "overline" => '\u{0305}',
        "dot" => '\u{0307}',
        "ddot" => '\u{0308}',
        "tilde" => '\u{0303}',
        _ => return None,
    })
}

fn symbol(name: &str) -> Option<&'static str> {
    Some(match name {
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" | "varepsilon" => "ε",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" | "vartheta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "phi" | "varphi" => "φ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",
        "pm" => "±",
        "mp" => "∓",
        "times" => "×",
        "cdot" => "·",
        "div" => "÷",
        "approx" => "≈",
        "neq" | "ne" => "≠",
        "equiv" => "≡",
        "leq" | "le" => "≤",
        "geq" | "ge" => "≥",
        "leqslant" => "⩽",
        "geqslant" => "⩾",
        "infty" => "∞",
        "partial" => "∂",
        "nabla" => "∇",
        "sum" => "∑",
        "prod" => "∏",
        "int" => "∫",
        "oint" => "∮",
        "rightarrow" | "to" => "→",
        "leftarrow" | "gets" => "←",
        "leftrightarrow" => "↔",
        "Rightarrow" | "implies" => "⇒",
        "Leftarrow" => "⇐",
        "Leftrightarrow" | "iff" => "⇔",
        "rightleftharpoons" => "⇌",
        "cdots" | "ldots" | "dots" => "…",
        "circ" => "∘",
        "degree" => "°",
        "propto" => "∝",
        "in" => "∈",
        "forall" => "∀",
        "exists" => "∃",
        "sin" => "sin",
        "cos" => "cos",
        "tan" => "tan",
        "log" => "log",
        "ln" => "ln",
        "exp" => "exp",
        "lim" => "lim",
        _ => return None,
    })
}

const ARROWS: [(&str, &str); 4] = [("<=>", "⇌"), ("<->", "↔"), ("->", "→"), ("<-", "←")];

/// Chemical-equation shorthand: element counts become subscripts, trailing
/// charges superscripts, and reaction arrows their symbols.
fn chemistry(raw: &str) -> String {
    let mut scanner = Scanner::new(raw);
    let mut out = String::with_capacity(raw.len());
    let mut prev: Option<char> = None;
    let mut in_count = false;
    'outer: while let Some(ch) = scanner.peek() {
        for (ascii, arrow) in ARROWS {
            if scanner.rest_starts_with(ascii) {
                out.push_str(arrow);
                scanner.advance(ascii.chars().count());
                prev = Some('>');
                in_count = false;
                continue 'outer;
            }
        }
        scanner.bump();
        // A count only continues through digits; after `*` or a space the
        // next number is a coefficient.
        if !ch.is_ascii_digit() {
            in_count = false;
        }
        match ch {
            '^' | '_' => {
                let arg = scanner.read_arg(&ch.to_string()).unwrap_or_default();
                out.push_str(&script(ch, &arg));
            }
            '{' | '}' => {}
            '*' => out.push('·'),
            '#' => out.push('≡'),
            d if d.is_ascii_digit() => {
                let counts = in_count || prev.is_some_and(|p| p.is_alphabetic() || p == ')' || p == ']');
                if counts {
                    out.push(subscript(d).unwrap_or(d));
                } else {
                    out.push(d);
                }
                in_count = counts;
            }
            '+' | '-' => {
                let after_species = prev.is_some_and(|p| p.is_alphanumeric() || p == ')');
                let at_end = scanner.peek().is_none_or(|c| c.is_whitespace() || c == '}');
                if after_species && at_end {
                    out.push(superscript(ch).unwrap_or(ch));
                } else {
                    out.push(ch);
                }
            }
            c => out.push(c),
        }
        prev = Some(ch);
    }
    out
}
