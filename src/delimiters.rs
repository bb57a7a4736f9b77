//! Custom template delimiters.
//!
//! Tera's markers are fixed, so an override pair is applied by rewriting the
//! source before it is parsed. A span between the custom markers becomes a
//! `{% ... %}` statement when it opens with a statement keyword and a
//! `{{ ... }}` expression otherwise. Surrounding text passes through with its
//! `{% %}` tags live; stray `{{` or `{#` in it is fenced in a raw block.

use std::borrow::Cow;

const STANDARD_LEFT: &str = "{{";
const STANDARD_RIGHT: &str = "}}";

/// First words that make a marked span a statement rather than an expression.
const STATEMENT_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "endif", "for", "endfor", "break", "continue", "include", "import",
    "extends", "block", "endblock", "macro", "endmacro", "set", "set_global", "filter",
    "endfilter",
];

/// Open/close markers for template expressions. Empty strings mean the
/// engine's standard markers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delimiters {
    pub left: String,
    pub right: String,
}

impl Delimiters {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    /// The engine's standard markers.
    pub fn standard() -> Self {
        Self::default()
    }

    pub fn left(&self) -> &str {
        if self.left.is_empty() {
            STANDARD_LEFT
        } else {
            &self.left
        }
    }

    pub fn right(&self) -> &str {
        if self.right.is_empty() {
            STANDARD_RIGHT
        } else {
            &self.right
        }
    }

    pub fn is_standard(&self) -> bool {
        self.left() == STANDARD_LEFT && self.right() == STANDARD_RIGHT
    }

    /// Rewrite `source` into standard Tera syntax.
    pub(crate) fn translate<'a>(&self, source: &'a str) -> tera::Result<Cow<'a, str>> {
        if self.is_standard() {
            return Ok(Cow::Borrowed(source));
        }
        let (left, right) = (self.left(), self.right());

        let mut out = String::with_capacity(source.len() + 16);
        let mut rest = source;
        while let Some(start) = rest.find(left) {
            push_literal(&mut out, &rest[..start])?;
            let after = &rest[start + left.len()..];
            let end = find_unquoted(after, right).ok_or_else(|| {
                tera::Error::msg(format!("unclosed '{left}' delimiter, expected '{right}'"))
            })?;
            let inner = &after[..end];
            if is_statement(inner) {
                out.push_str("{%");
                out.push_str(inner);
                out.push_str("%}");
            } else {
                out.push_str(STANDARD_LEFT);
                out.push_str(inner);
                out.push_str(STANDARD_RIGHT);
            }
            rest = &after[end + right.len()..];
        }
        push_literal(&mut out, rest)?;
        Ok(Cow::Owned(out))
    }
}

/// Byte offset of the first `marker` in `text` outside a string literal.
fn find_unquoted(text: &str, marker: &str) -> Option<usize> {
    let mut quote = None;
    for (i, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if text[i..].starts_with(marker) => return Some(i),
            None if matches!(c, '"' | '\'' | '`') => quote = Some(c),
            None => {}
        }
    }
    None
}

fn is_statement(inner: &str) -> bool {
    let body = inner.strip_prefix('-').unwrap_or(inner).trim_start();
    let word_end = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    let (word, tail) = body.split_at(word_end);
    STATEMENT_KEYWORDS.contains(&word)
        && tail
            .chars()
            .next()
            .map_or(true, |c| c.is_whitespace() || c == '-')
}

/// Copy literal text, keeping complete `{% ... %}` tags live.
fn push_literal(out: &mut String, text: &str) -> tera::Result<()> {
    let mut rest = text;
    while let Some(start) = rest.find("{%") {
        let Some(len) = rest[start + 2..].find("%}") else {
            break;
        };
        let end = start + 2 + len + 2;
        push_protected(out, &rest[..start])?;
        out.push_str(&rest[start..end]);
        rest = &rest[end..];
    }
    push_protected(out, rest)
}

fn push_protected(out: &mut String, text: &str) -> tera::Result<()> {
    let needs_raw = text.contains("{{")
        || text.contains("{%")
        || text.contains("{#")
        || text.ends_with('{');
    if !needs_raw {
        out.push_str(text);
        return Ok(());
    }
    if text.contains("endraw") {
        return Err(tera::Error::msg(
            "literal text containing 'endraw' cannot be used with custom delimiters",
        ));
    }
    out.push_str("{% raw %}");
    out.push_str(text);
    out.push_str("{% endraw %}");
    Ok(())
}
