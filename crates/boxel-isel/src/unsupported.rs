//! Placeholders for operations the runtime gives no lowering for.

use boxel_core::diagnostics::Diagnostic;
use boxel_core::mir::{ExprKind, StmtLocation};
use derive_more::Display;
use tracing::warn;

use crate::driver::FunctionLowering;

pub const UNSUPPORTED_CODE: &str = "boxel::unsupported";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum UnsupportedKind {
    #[display("{_0} expression")]
    Expr(ExprKind),
    #[display("non-boolean condition")]
    NonBooleanCondition,
}

impl UnsupportedKind {
    /// Role of the optional runtime helper that would lower this operation.
    pub fn helper_role(self) -> Option<&'static str> {
        match self {
            UnsupportedKind::Expr(ExprKind::BinaryOp) => Some("binary_op"),
            UnsupportedKind::Expr(ExprKind::UnaryOp) => Some("unary_op"),
            UnsupportedKind::Expr(ExprKind::Name) => Some("get_name"),
            UnsupportedKind::Expr(ExprKind::Member) => Some("get_member"),
            UnsupportedKind::Expr(ExprKind::Subscript) => Some("get_element"),
            _ => None,
        }
    }
}

/// A placeholder emitted in place of an operation with no lowering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unsupported {
    pub kind: UnsupportedKind,
    pub location: StmtLocation,
}

impl Unsupported {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let message = match self.kind {
            UnsupportedKind::Expr(kind) => {
                format!("{} expression lowered to a zero placeholder", kind)
            }
            UnsupportedKind::NonBooleanCondition => {
                "non-boolean condition lowered to `false`".to_string()
            }
        };
        let diagnostic = Diagnostic::warning(message)
            .with_code(UNSUPPORTED_CODE)
            .with_location(self.location.to_string())
            .with_source_context("isel");
        match self.kind.helper_role() {
            Some(role) => diagnostic.with_suggestion(format!(
                "provide the optional `{}` helper in the runtime definition",
                role
            )),
            None => diagnostic,
        }
    }
}

impl From<&Unsupported> for Diagnostic {
    fn from(unsupported: &Unsupported) -> Self {
        unsupported.to_diagnostic()
    }
}

impl FunctionLowering<'_, '_> {
    pub(crate) fn report_unsupported(&mut self, kind: UnsupportedKind) {
        warn!(location = %self.location, %kind, "emitting placeholder");
        self.session.unsupported.push(Unsupported {
            kind,
            location: self.location.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxel_core::diagnostics::DiagnosticLevel;
    use boxel_core::mir::BlockId;

    #[test]
    fn converts_to_warning_diagnostic() {
        let unsupported = Unsupported {
            kind: UnsupportedKind::Expr(ExprKind::Call),
            location: StmtLocation {
                function: "main".into(),
                block: BlockId(1),
                statement: 0,
            },
        };
        let diagnostic = Diagnostic::from(&unsupported);
        assert_eq!(diagnostic.level, DiagnosticLevel::Warning);
        assert_eq!(diagnostic.code.as_deref(), Some(UNSUPPORTED_CODE));
        assert_eq!(diagnostic.location.as_deref(), Some("`main` L1#0"));
        assert_eq!(
            diagnostic.message,
            "Call expression lowered to a zero placeholder"
        );
        assert!(diagnostic.suggestions.is_empty());
        assert_eq!(
            UnsupportedKind::NonBooleanCondition.to_string(),
            "non-boolean condition"
        );
    }

    #[test]
    fn missing_helpers_are_named_in_the_suggestion() {
        let unsupported = Unsupported {
            kind: UnsupportedKind::Expr(ExprKind::Member),
            location: StmtLocation {
                function: "main".into(),
                block: BlockId(0),
                statement: 2,
            },
        };
        assert_eq!(
            unsupported.to_diagnostic().suggestions,
            vec!["provide the optional `get_member` helper in the runtime definition".to_string()]
        );
    }
}
