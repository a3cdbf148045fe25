//! The `parentsSelector()` helper as a capability over the compiler.
//!
//! The helper hands stylesheets the selector currently being compiled, as a
//! comma list of selector sequences, each a space list of components. The
//! compiler binding supplies the selector through [`SelectorContext`].

use std::fmt;

/// Separator of a Sass list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSeparator {
    Space,
    Comma,
}

impl ListSeparator {
    fn as_str(self) -> &'static str {
        match self {
            ListSeparator::Space => " ",
            ListSeparator::Comma => ", ",
        }
    }
}

/// A Sass script value produced by a helper function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SassValue {
    Null,
    String(String),
    List {
        items: Vec<SassValue>,
        separator: ListSeparator,
    },
}

impl fmt::Display for SassValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SassValue::Null => f.write_str("null"),
            SassValue::String(s) => f.write_str(s),
            SassValue::List { items, separator } => {
                if items.is_empty() {
                    return f.write_str("()");
                }
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(separator.as_str())?;
                    }
                    // A nested list needs parentheses unless it binds tighter.
                    let wrap = matches!(
                        item,
                        SassValue::List { separator: inner, items } if items.len() > 1
                            && !(*separator == ListSeparator::Comma && *inner == ListSeparator::Space)
                    );
                    if wrap {
                        write!(f, "({})", item)?;
                    } else {
                        write!(f, "{}", item)?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Access to the selector the compiler is currently inside.
pub trait SelectorContext {
    /// Selector sequences, each split into components, or `None` at the root.
    fn parent_selectors(&self) -> Option<Vec<Vec<String>>>;
}

/// Build the `parentsSelector()` value for a context.
///
/// Returns `null` outside any rule; otherwise a comma list with one space list
/// of component strings per selector sequence.
pub fn parents_selector(ctx: &dyn SelectorContext) -> SassValue {
    let Some(sequences) = ctx.parent_selectors() else {
        return SassValue::Null;
    };

    SassValue::List {
        items: sequences
            .into_iter()
            .map(|seq| SassValue::List {
                items: seq.into_iter().map(SassValue::String).collect(),
                separator: ListSeparator::Space,
            })
            .collect(),
        separator: ListSeparator::Comma,
    }
}

/// A resolved selector string, such as `.nav > li a, .menu`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSelector(Option<String>);

impl ResolvedSelector {
    /// Selector of the current rule.
    pub fn new(selector: impl Into<String>) -> Self {
        Self(Some(selector.into()))
    }

    /// Context outside any rule.
    pub fn root() -> Self {
        Self(None)
    }
}

impl SelectorContext for ResolvedSelector {
    fn parent_selectors(&self) -> Option<Vec<Vec<String>>> {
        let selector = self.0.as_deref()?;
        Some(
            split_top_level(selector, |c| c == ',')
                .into_iter()
                .map(components)
                .filter(|seq| !seq.is_empty())
                .collect(),
        )
    }
}

/// Split on `is_sep` outside brackets, parentheses and quotes.
fn split_top_level(input: &str, is_sep: impl Fn(char) -> bool) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if depth == 0 && is_sep(c) => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);

    parts
}

/// Components of one selector sequence; combinators are their own components.
fn components(sequence: &str) -> Vec<String> {
    let mut out = Vec::new();

    for token in split_top_level(sequence, char::is_whitespace) {
        let mut rest = token;
        while !rest.is_empty() {
            let cut = split_top_level(rest, |c| matches!(c, '>' | '+' | '~'))[0].len();
            if cut > 0 {
                out.push(rest[..cut].to_string());
            }
            if cut < rest.len() {
                out.push(rest[cut..cut + 1].to_string());
                rest = &rest[cut + 1..];
            } else {
                rest = "";
            }
        }
    }

    out
}
