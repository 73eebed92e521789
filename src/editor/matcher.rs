//! Backward bracket matching by balance counting.

use ropey::Rope;

/// Prefix that marks a bracket as already scaled to its content.
pub const SCALED_PREFIX: &str = "\\left";

/// An opening/closing delimiter pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BracketPair {
    pub open: char,
    pub close: char,
}

impl BracketPair {
    pub const PAREN: Self = Self {
        open: '(',
        close: ')',
    };
    pub const SQUARE: Self = Self {
        open: '[',
        close: ']',
    };
    pub const BRACE: Self = Self {
        open: '{',
        close: '}',
    };

    /// The pair opened by `ch`, if any.
    pub const fn for_open(ch: char) -> Option<Self> {
        match ch {
            '(' => Some(Self::PAREN),
            '[' => Some(Self::SQUARE),
            '{' => Some(Self::BRACE),
            _ => None,
        }
    }

    /// The pair closed by `ch`, if any.
    pub const fn for_close(ch: char) -> Option<Self> {
        match ch {
            ')' => Some(Self::PAREN),
            ']' => Some(Self::SQUARE),
            '}' => Some(Self::BRACE),
            _ => None,
        }
    }
}

/// Result of matching a closing bracket against its opener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMatch {
    /// A plain opening bracket at this char index.
    Bare(usize),
    /// The opener at this char index is already preceded by [`SCALED_PREFIX`].
    AlreadyScaled(usize),
}

impl OpenMatch {
    pub const fn position(self) -> usize {
        match self {
            Self::Bare(pos) | Self::AlreadyScaled(pos) => pos,
        }
    }
}

/// Find the opening bracket matching the closing bracket just before `caret`.
///
/// Scans backward from `caret - 1`, counting `pair.close` up and
/// `pair.open` down, and returns where the count returns to zero. Brackets
/// of other kinds never affect the count. Returns `None` when the char
/// before `caret` is not `pair.close` or the scan reaches the start of the
/// text unbalanced.
pub fn find_matching_open(text: &Rope, caret: usize, pair: BracketPair) -> Option<usize> {
    if caret == 0 || caret > text.len_chars() || text.char(caret - 1) != pair.close {
        return None;
    }
    let mut chars = text.chars_at(caret);
    let mut idx = caret;
    let mut balance = 0usize;
    while let Some(ch) = chars.prev() {
        idx -= 1;
        if ch == pair.close {
            balance += 1;
        } else if ch == pair.open {
            balance -= 1;
            if balance == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// Like [`find_matching_open`], but reports whether the opener is already
/// scaled so callers can skip wrapping it twice.
pub fn match_open(text: &Rope, caret: usize, pair: BracketPair) -> Option<OpenMatch> {
    let open = find_matching_open(text, caret, pair)?;
    let prefix_len = SCALED_PREFIX.chars().count();
    let scaled = open >= prefix_len && text.slice(open - prefix_len..open) == SCALED_PREFIX;
    Some(if scaled {
        OpenMatch::AlreadyScaled(open)
    } else {
        OpenMatch::Bare(open)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rope(s: &str) -> Rope {
        Rope::from_str(s)
    }

    #[test]
    fn test_simple_pair() {
        assert_eq!(find_matching_open(&rope("(a)"), 3, BracketPair::PAREN), Some(0));
    }

    #[test]
    fn test_nested_pairs() {
        let text = rope("f((a)(b))");
        assert_eq!(find_matching_open(&text, 9, BracketPair::PAREN), Some(1));
        assert_eq!(find_matching_open(&text, 5, BracketPair::PAREN), Some(2));
        assert_eq!(find_matching_open(&text, 8, BracketPair::PAREN), Some(5));
    }

    #[test]
    fn test_other_bracket_kinds_are_ignored() {
        let text = rope("[(]x)");
        assert_eq!(find_matching_open(&text, 5, BracketPair::PAREN), Some(1));
        assert_eq!(find_matching_open(&text, 3, BracketPair::SQUARE), Some(0));
    }

    #[test]
    fn test_unbalanced_close_is_not_found() {
        assert_eq!(find_matching_open(&rope("a)"), 2, BracketPair::PAREN), None);
        assert_eq!(find_matching_open(&rope("(a))"), 4, BracketPair::PAREN), None);
    }

    #[test]
    fn test_requires_close_before_caret() {
        assert_eq!(find_matching_open(&rope("(a)x"), 4, BracketPair::PAREN), None);
        assert_eq!(find_matching_open(&rope(""), 0, BracketPair::PAREN), None);
        assert_eq!(find_matching_open(&rope("()"), 7, BracketPair::PAREN), None);
    }

    #[test]
    fn test_multibyte_content() {
        let text = rope("α(β)");
        assert_eq!(find_matching_open(&text, 4, BracketPair::PAREN), Some(1));
    }

    #[test]
    fn test_match_open_detects_scaled_prefix() {
        let text = rope("\\left(\\frac{a}{b}\\right)");
        let caret = text.len_chars();
        assert_eq!(
            match_open(&text, caret, BracketPair::PAREN),
            Some(OpenMatch::AlreadyScaled(5))
        );
    }

    #[test]
    fn test_match_open_near_start_is_bare() {
        let text = rope("ft(x)");
        assert_eq!(match_open(&text, 5, BracketPair::PAREN), Some(OpenMatch::Bare(2)));
    }

    #[test]
    fn test_pair_lookup() {
        assert_eq!(BracketPair::for_open('['), Some(BracketPair::SQUARE));
        assert_eq!(BracketPair::for_close('}'), Some(BracketPair::BRACE));
        assert_eq!(BracketPair::for_open(')'), None);
    }

    /// Build a balanced paren string from a sequence of open/close choices,
    /// with filler characters in between.
    fn balanced(steps: &[bool]) -> String {
        let mut out = String::new();
        let mut depth = 0usize;
        for &open in steps {
            if open || depth == 0 {
                out.push('(');
                depth += 1;
            } else {
                out.push(')');
                depth -= 1;
            }
            out.push('x');
        }
        out.push_str(&")".repeat(depth));
        out
    }

    proptest! {
        #[test]
        fn prop_every_close_finds_its_nested_open(steps in proptest::collection::vec(any::<bool>(), 0..40)) {
            let s = balanced(&steps);
            let chars: Vec<char> = s.chars().collect();
            let text = Rope::from_str(&s);

            let mut stack = Vec::new();
            for (i, &c) in chars.iter().enumerate() {
                match c {
                    '(' => stack.push(i),
                    ')' => {
                        let expected = stack.pop();
                        prop_assert_eq!(find_matching_open(&text, i + 1, BracketPair::PAREN), expected);
                    }
                    _ => {}
                }
            }
        }

        #[test]
        fn prop_extra_close_is_never_matched(steps in proptest::collection::vec(any::<bool>(), 0..40)) {
            let s = format!("{})", balanced(&steps));
            let text = Rope::from_str(&s);
            prop_assert_eq!(find_matching_open(&text, text.len_chars(), BracketPair::PAREN), None);
        }
    }
}
