//! Non-fatal reports produced while lowering, and their textual rendering.

use std::fmt::{self, Display, Formatter};
use std::io::{self, Write};

/// Source context used when neither the diagnostic nor the caller names one.
const DEFAULT_CONTEXT: &str = "boxel";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Info,
    Warning,
    Error,
}

impl DiagnosticLevel {
    fn symbol(self) -> &'static str {
        match self {
            DiagnosticLevel::Error => "✖",
            DiagnosticLevel::Warning => "⚠",
            DiagnosticLevel::Info => "ℹ",
        }
    }

    fn label(self) -> &'static str {
        match self {
            DiagnosticLevel::Error => "ERROR",
            DiagnosticLevel::Warning => "WARNING",
            DiagnosticLevel::Info => "INFO",
        }
    }
}

/// Output layout for rendered diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticTemplate {
    /// Symbol-prefixed lines meant for a terminal.
    Pretty,
    /// `[context] LEVEL: message` lines, stable for tooling and tests.
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticDisplayOptions {
    pub template: DiagnosticTemplate,
    /// Also render `Info` diagnostics.
    pub verbose_info: bool,
}

impl DiagnosticDisplayOptions {
    pub fn with_template(template: DiagnosticTemplate, verbose_info: bool) -> Self {
        Self {
            template,
            verbose_info,
        }
    }

    pub fn pretty(verbose_info: bool) -> Self {
        Self::with_template(DiagnosticTemplate::Pretty, verbose_info)
    }

    pub fn plain(verbose_info: bool) -> Self {
        Self::with_template(DiagnosticTemplate::Plain, verbose_info)
    }

    fn shows(&self, level: DiagnosticLevel) -> bool {
        level > DiagnosticLevel::Info || self.verbose_info
    }
}

impl Default for DiagnosticDisplayOptions {
    fn default() -> Self {
        Self::pretty(false)
    }
}

/// A non-fatal report attached to a lowering result.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub message: String,
    pub code: Option<String>,
    /// Human-readable position, e.g. a statement location.
    pub location: Option<String>,
    pub suggestions: Vec<String>,
    /// Pass or component that raised it, e.g. `isel`.
    pub source_context: Option<String>,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            code: None,
            location: None,
            suggestions: Vec::new(),
            source_context: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warning, message)
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_source_context(mut self, context: impl Into<String>) -> Self {
        self.source_context = Some(context.into());
        self
    }

    /// Lines for this diagnostic in the given layout; empty when filtered out.
    fn lines(&self, context: &str, options: &DiagnosticDisplayOptions) -> Vec<String> {
        if !options.shows(self.level) {
            return Vec::new();
        }

        let (mut head, help) = match options.template {
            DiagnosticTemplate::Pretty => (
                format!("{} [{}] {}", self.level.symbol(), context, self.message),
                "help",
            ),
            DiagnosticTemplate::Plain => (
                format!("[{}] {}: {}", context, self.level.label(), self.message),
                "suggestion",
            ),
        };
        if let Some(code) = &self.code {
            head.push_str(&format!(" ({code})"));
        }

        std::iter::once(head)
            .chain(self.location.iter().map(|at| format!("   at {at}")))
            .chain(self.suggestions.iter().map(|s| format!("   {help}: {s}")))
            .collect()
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        if let Some(code) = &self.code {
            write!(f, " [{code}]")?;
        }
        if !self.suggestions.is_empty() {
            write!(f, " (hints: {})", self.suggestions.join("; "))?;
        }
        Ok(())
    }
}

/// Render every diagnostic. `fallback_context` applies to diagnostics that
/// carry no source context of their own.
pub fn render_all(
    diagnostics: &[Diagnostic],
    fallback_context: Option<&str>,
    options: &DiagnosticDisplayOptions,
) -> Vec<String> {
    diagnostics
        .iter()
        .flat_map(|diagnostic| {
            let context = diagnostic
                .source_context
                .as_deref()
                .or(fallback_context)
                .unwrap_or(DEFAULT_CONTEXT);
            diagnostic.lines(context, options)
        })
        .collect()
}

/// Write the rendered diagnostics to `out`, one line each.
pub fn emit(
    diagnostics: &[Diagnostic],
    fallback_context: Option<&str>,
    options: &DiagnosticDisplayOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    render_all(diagnostics, fallback_context, options)
        .iter()
        .try_for_each(|line| writeln!(out, "{line}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_template_includes_code_and_location() {
        let diagnostic = Diagnostic::warning("BinaryOp lowered to a placeholder")
            .with_code("boxel::unsupported")
            .with_location("`main` L0#0");
        let lines = render_all(
            &[diagnostic],
            Some("isel"),
            &DiagnosticDisplayOptions::plain(false),
        );
        assert_eq!(
            lines,
            vec![
                "[isel] WARNING: BinaryOp lowered to a placeholder (boxel::unsupported)".to_string(),
                "   at `main` L0#0".to_string(),
            ]
        );
    }

    #[test]
    fn pretty_template_prefixes_symbol_and_lists_help() {
        let diagnostic = Diagnostic::new(DiagnosticLevel::Error, "no helper")
            .with_source_context("catalog")
            .with_suggestion("declare it in the runtime");
        assert_eq!(
            render_all(&[diagnostic], Some("isel"), &DiagnosticDisplayOptions::default()),
            vec![
                "✖ [catalog] no helper".to_string(),
                "   help: declare it in the runtime".to_string(),
            ]
        );
    }

    #[test]
    fn info_is_hidden_unless_verbose() {
        let diagnostics = [Diagnostic::new(DiagnosticLevel::Info, "3 strings interned")];
        assert!(render_all(&diagnostics, None, &DiagnosticDisplayOptions::plain(false)).is_empty());
        assert_eq!(
            render_all(&diagnostics, None, &DiagnosticDisplayOptions::plain(true)),
            vec!["[boxel] INFO: 3 strings interned".to_string()]
        );
    }

    #[test]
    fn display_lists_hints() {
        let diagnostic = Diagnostic::new(DiagnosticLevel::Error, "boom")
            .with_code("E1")
            .with_suggestion("retry");
        assert_eq!(diagnostic.to_string(), "boom [E1] (hints: retry)");
    }
}
