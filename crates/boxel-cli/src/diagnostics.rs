//! Diagnostic and error reporting utilities

use std::io::{self, Write};

use boxel_core::diagnostics::{emit, Diagnostic, DiagnosticDisplayOptions};

use crate::config::DiagnosticStyle;
use crate::{CliError, Result};

/// Install miette as the report handler for fatal errors.
pub fn setup_error_reporting() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .map_err(|e| CliError::Config(format!("Failed to setup error reporting: {}", e)))?;

    Ok(())
}

/// Print a fatal error to stderr through the installed miette handler.
pub fn render_cli_error(error: CliError) {
    eprintln!("{:?}", miette::Report::new(error));
}

pub fn display_options(style: DiagnosticStyle, verbose: bool) -> DiagnosticDisplayOptions {
    match style {
        DiagnosticStyle::Pretty => DiagnosticDisplayOptions::pretty(verbose),
        DiagnosticStyle::Plain => DiagnosticDisplayOptions::plain(verbose),
    }
}

/// Write non-fatal diagnostics, one line per entry, to `out`.
pub fn emit_diagnostics(
    diagnostics: &[Diagnostic],
    style: DiagnosticStyle,
    verbose: bool,
    out: &mut dyn Write,
) -> io::Result<()> {
    emit(diagnostics, Some("isel"), &display_options(style, verbose), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_diagnostics_name_the_code_and_location() {
        let diagnostics = vec![Diagnostic::warning("call expression lowered to a zero placeholder")
            .with_code("boxel::unsupported")
            .with_location("`main` L0#1")];
        let mut out = Vec::new();
        emit_diagnostics(&diagnostics, DiagnosticStyle::Plain, false, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("WARNING: call expression lowered to a zero placeholder"));
        assert!(text.contains("boxel::unsupported"));
        assert!(text.contains("`main` L0#1"));
    }

    #[test]
    fn lowering_errors_keep_their_diagnostic_code() {
        use miette::Diagnostic as _;

        let error = CliError::from(boxel_core::Error::MissingRuntimeType {
            name: "struct.vm.Value".into(),
        });
        let code = error.code().map(|code| code.to_string());
        assert_eq!(code.as_deref(), Some("boxel::catalog::missing_type"));
    }
}
