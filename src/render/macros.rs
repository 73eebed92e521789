use std::collections::BTreeMap;

use super::RenderError;

/// Expansion depth after which a macro is assumed to recurse forever.
pub const MAX_MACRO_DEPTH: usize = 32;

/// A user-level command defined by text substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroDef {
    /// Number of arguments read before the expansion.
    pub arity: usize,
    /// Body with `#1`..`#9` standing for the arguments.
    pub expansion: String,
    /// Body used when the arguments are followed by `*`. It may refer to
    /// more arguments than `arity`; the extra ones are read after the star.
    pub starred: Option<String>,
}

impl MacroDef {
    pub fn new(arity: usize, expansion: impl Into<String>) -> Self {
        Self {
            arity,
            expansion: expansion.into(),
            starred: None,
        }
    }

    #[must_use]
    pub fn with_starred(mut self, starred: impl Into<String>) -> Self {
        self.starred = Some(starred.into());
        self
    }
}

/// Command name (without the backslash) to definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroTable(BTreeMap<String, MacroDef>);

impl Default for MacroTable {
    /// The structure-diagram macros: `\hsmiles{raw}{height}`,
    /// `\smiles{raw}` (height 2) and `\smiles{raw}*{height}`.
    fn default() -> Self {
        let mut table = Self::empty();
        table.define("hsmiles", MacroDef::new(2, "\\structure{#1}{#2}"));
        table.define(
            "smiles",
            MacroDef::new(1, "\\hsmiles{#1}{2}").with_starred("\\hsmiles{#1}{#2}"),
        );
        table
    }
}

impl MacroTable {
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn define(&mut self, name: impl Into<String>, def: MacroDef) {
        self.0.insert(name.into(), def);
    }

    pub fn get(&self, name: &str) -> Option<&MacroDef> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Replace every macro invocation in `input` with its expansion.
///
/// # Errors
///
/// [`RenderError::MissingArgument`] when an invocation is cut short,
/// [`RenderError::UnbalancedGroup`] for an unclosed argument, and
/// [`RenderError::MacroDepth`] for runaway recursion.
pub fn expand_macros(input: &str, macros: &MacroTable) -> Result<String, RenderError> {
    if macros.is_empty() {
        return Ok(input.to_string());
    }
    expand(input, macros, 0)
}

fn expand(input: &str, macros: &MacroTable, depth: usize) -> Result<String, RenderError> {
    if depth > MAX_MACRO_DEPTH {
        return Err(RenderError::MacroDepth {
            limit: MAX_MACRO_DEPTH,
        });
    }
    let mut scanner = Scanner::new(input);
    let mut out = String::with_capacity(input.len());
    while let Some(ch) = scanner.bump() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let name = scanner.read_command_name();
        let Some(def) = macros.get(&name) else {
            out.push('\\');
            out.push_str(&name);
            continue;
        };
        let mut args = Vec::with_capacity(def.arity);
        for _ in 0..def.arity {
            args.push(scanner.read_arg(&name)?);
        }
        let body = match &def.starred {
            Some(starred) if scanner.peek() == Some('*') => {
                scanner.bump();
                for _ in def.arity..highest_parameter(starred) {
                    args.push(scanner.read_arg(&name)?);
                }
                substitute(starred, &args)
            }
            _ => substitute(&def.expansion, &args),
        };
        out.push_str(&expand(&body, macros, depth + 1)?);
    }
    Ok(out)
}

fn highest_parameter(body: &str) -> usize {
    let mut highest = 0;
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '#'
            && let Some(n) = chars.peek().and_then(|c| c.to_digit(10))
        {
            highest = highest.max(n as usize);
        }
    }
    highest
}

fn substitute(body: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '#'
            && let Some(n) = chars.peek().and_then(|c| c.to_digit(10))
        {
            chars.next();
            if let Some(arg) = (n as usize).checked_sub(1).and_then(|i| args.get(i)) {
                out.push_str(arg);
            }
            continue;
        }
        out.push(ch);
    }
    out
}

/// Char cursor shared by the macro expander and the preview renderer.
pub(super) struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    pub(super) fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    pub(super) fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    pub(super) fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    pub(super) const fn pos(&self) -> usize {
        self.pos
    }

    pub(super) fn rest_starts_with(&self, s: &str) -> bool {
        let mut idx = self.pos;
        for ch in s.chars() {
            if self.chars.get(idx) != Some(&ch) {
                return false;
            }
            idx += 1;
        }
        true
    }

    pub(super) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.chars.len());
    }

    fn skip_spaces(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    /// Name after a consumed backslash: a run of ASCII letters, or a single
    /// other char. Empty at end of input.
    pub(super) fn read_command_name(&mut self) -> String {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        if self.pos == start {
            return self.bump().map(String::from).unwrap_or_default();
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Raw contents of a brace group whose `{` was just consumed.
    pub(super) fn read_group_body(&mut self) -> Result<String, RenderError> {
        let open = self.pos.saturating_sub(1);
        let mut depth = 1usize;
        let mut out = String::new();
        while let Some(ch) = self.bump() {
            match ch {
                '\\' => {
                    out.push(ch);
                    if let Some(next) = self.bump() {
                        out.push(next);
                    }
                }
                '{' => {
                    depth += 1;
                    out.push(ch);
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(out);
                    }
                    out.push(ch);
                }
                _ => out.push(ch),
            }
        }
        Err(RenderError::UnbalancedGroup { position: open })
    }

    /// One argument of `command`: a brace group, a control word, or a
    /// single char.
    pub(super) fn read_arg(&mut self, command: &str) -> Result<String, RenderError> {
        self.skip_spaces();
        let missing = || RenderError::MissingArgument {
            command: command.to_string(),
        };
        match self.peek() {
            None | Some('}') => Err(missing()),
            Some('{') => {
                self.bump();
                self.read_group_body()
            }
            Some('\\') => {
                self.bump();
                Ok(format!("\\{}", self.read_command_name()))
            }
            Some(_) => self.bump().map(String::from).ok_or_else(missing),
        }
    }

    /// An optional `[...]` argument.
    pub(super) fn read_optional(&mut self) -> Option<String> {
        if self.peek() != Some('[') {
            return None;
        }
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        while let Some(ch) = self.bump() {
            if ch == ']' {
                return Some(out);
            }
            out.push(ch);
        }
        self.pos = start;
        None
    }
}
