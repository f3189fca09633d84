//! Indentation-aware text rendering for the input IR and lowered programs.

use std::fmt::{self, Formatter, Write as _};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrettyOptions {
    /// Spaces per nesting level.
    pub indent_size: usize,
    /// Annotate instructions with their result type.
    pub show_types: bool,
}

impl Default for PrettyOptions {
    fn default() -> Self {
        Self {
            indent_size: 4,
            show_types: true,
        }
    }
}

/// Printer state threaded through `PrettyPrintable` impls.
pub struct PrettyCtx<'a> {
    pub options: &'a PrettyOptions,
    depth: usize,
}

impl<'a> PrettyCtx<'a> {
    pub fn new(options: &'a PrettyOptions) -> Self {
        Self { options, depth: 0 }
    }

    /// Write `line` at the current depth, followed by a newline.
    pub fn writeln(&self, f: &mut Formatter<'_>, line: impl AsRef<str>) -> fmt::Result {
        let width = self.depth * self.options.indent_size;
        writeln!(f, "{:width$}{}", "", line.as_ref())
    }

    /// Run `body` one level deeper.
    pub fn with_indent(
        &mut self,
        body: impl FnOnce(&mut Self) -> fmt::Result,
    ) -> fmt::Result {
        self.depth += 1;
        let result = body(self);
        self.depth -= 1;
        result
    }
}

pub trait PrettyPrintable {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result;
}

/// `Display` adapter returned by [`pretty`].
pub struct Pretty<'a, T: ?Sized> {
    value: &'a T,
    options: PrettyOptions,
}

impl<T: PrettyPrintable + ?Sized> fmt::Display for Pretty<'_, T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.value.fmt_pretty(f, &mut PrettyCtx::new(&self.options))
    }
}

pub fn pretty<T: PrettyPrintable + ?Sized>(value: &T, options: PrettyOptions) -> Pretty<'_, T> {
    Pretty { value, options }
}

/// Quote-safe rendering of string literals.
pub fn escape_string(input: &str) -> String {
    input.chars().fold(String::with_capacity(input.len()), |mut out, ch| {
        let _ = match ch {
            '"' => out.write_str("\\\""),
            '\\' => out.write_str("\\\\"),
            '\n' => out.write_str("\\n"),
            '\r' => out.write_str("\\r"),
            '\t' => out.write_str("\\t"),
            c if c.is_control() => write!(out, "\\u{{{:x}}}", c as u32),
            c => out.write_char(c),
        };
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nested;

    impl PrettyPrintable for Nested {
        fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
            ctx.writeln(f, "outer {")?;
            ctx.with_indent(|ctx| {
                ctx.writeln(f, "middle {")?;
                ctx.with_indent(|ctx| ctx.writeln(f, "inner"))?;
                ctx.writeln(f, "}")
            })?;
            ctx.writeln(f, "}")
        }
    }

    #[test]
    fn indents_by_configured_width() {
        let options = PrettyOptions {
            indent_size: 2,
            ..PrettyOptions::default()
        };
        assert_eq!(
            pretty(&Nested, options).to_string(),
            "outer {\n  middle {\n    inner\n  }\n}\n"
        );
    }

    #[test]
    fn escapes_quotes_and_controls() {
        assert_eq!(escape_string("a\"b\n\u{1}"), "a\\\"b\\n\\u{1}");
    }
}
