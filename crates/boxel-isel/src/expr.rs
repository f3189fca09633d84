//! Expression lowering.
//!
//! Every expression produces a boxed value. Operands are always lowered
//! left to right before their parent, even when the parent itself has no
//! lowering and ends up as a placeholder.

use boxel_core::lir::{LirConstant, LirValue, Ty};
use boxel_core::mir::{Expr, ExprKind};

use crate::catalog::HelperRef;
use crate::driver::FunctionLowering;
use crate::error::Result;
use crate::temps::TempStorage;
use crate::unsupported::UnsupportedKind;

/// Result of lowering one expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Lowered {
    Value(LirValue),
    /// No lowering exists for this node; the caller decides on a placeholder.
    Unsupported(ExprKind),
}

impl FunctionLowering<'_, '_> {
    pub(crate) fn lower_expr(&mut self, expr: &Expr) -> Result<Lowered> {
        let catalog = self.session.catalog;
        let ctx = self.context.clone();

        let lowered = match expr {
            Expr::Constant(number) => {
                let number = LirValue::Constant(LirConstant::Float(*number, catalog.number.clone()));
                self.box_result(&catalog.init_number, |out| vec![out, number])?
            }
            Expr::StringLiteral(text) => {
                let bytes = self.session.intern_string(text);
                self.box_result(&catalog.init_string, |out| vec![ctx, out, bytes])?
            }
            Expr::Temporary(temp) => match self.storage_for(*temp)? {
                TempStorage::Slot(address) => Lowered::Value(self.builder.load(address)?),
                TempStorage::Argument(value) => Lowered::Value(value),
            },
            Expr::Name(name) => match &catalog.get_name {
                Some(helper) => {
                    let bytes = self.session.intern_string(name);
                    self.box_result(helper, |out| vec![ctx, out, bytes])?
                }
                None => Lowered::Unsupported(ExprKind::Name),
            },
            Expr::Closure(_) => Lowered::Unsupported(ExprKind::Closure),
            Expr::UnaryOp(op, operand) => {
                let operand = self.lower_value(operand)?;
                match &catalog.unary_op {
                    Some(helper) => {
                        let code = op_code(op.op_code());
                        self.box_result(helper, |out| vec![ctx, out, code, operand])?
                    }
                    None => Lowered::Unsupported(ExprKind::UnaryOp),
                }
            }
            Expr::BinaryOp(op, left, right) => {
                let left = self.lower_value(left)?;
                let right = self.lower_value(right)?;
                match &catalog.binary_op {
                    Some(helper) => {
                        let code = op_code(op.op_code());
                        self.box_result(helper, |out| vec![ctx, out, code, left, right])?
                    }
                    None => Lowered::Unsupported(ExprKind::BinaryOp),
                }
            }
            Expr::Call { callee, args } => {
                self.lower_operands(callee, args)?;
                Lowered::Unsupported(ExprKind::Call)
            }
            Expr::New { callee, args } => {
                self.lower_operands(callee, args)?;
                Lowered::Unsupported(ExprKind::New)
            }
            Expr::Subscript { base, index } => {
                let base = self.lower_value(base)?;
                let index = self.lower_value(index)?;
                match &catalog.get_element {
                    Some(helper) => self.box_result(helper, |out| vec![ctx, out, base, index])?,
                    None => Lowered::Unsupported(ExprKind::Subscript),
                }
            }
            Expr::Member { base, name } => {
                let base = self.lower_value(base)?;
                match &catalog.get_member {
                    Some(helper) => {
                        let bytes = self.session.intern_string(name);
                        self.box_result(helper, |out| vec![ctx, out, base, bytes])?
                    }
                    None => Lowered::Unsupported(ExprKind::Member),
                }
            }
        };
        Ok(lowered)
    }

    /// Lower `expr`, substituting the zero value for an unsupported node.
    pub(crate) fn lower_value(&mut self, expr: &Expr) -> Result<LirValue> {
        match self.lower_expr(expr)? {
            Lowered::Value(value) => Ok(value),
            Lowered::Unsupported(kind) => {
                self.report_unsupported(UnsupportedKind::Expr(kind));
                Ok(LirValue::Constant(LirConstant::ZeroInit(
                    self.session.catalog.value.clone(),
                )))
            }
        }
    }

    /// Lower a branch condition. Only values that are already `i1` are used;
    /// anything else becomes `false`.
    pub(crate) fn lower_condition(&mut self, expr: &Expr) -> Result<LirValue> {
        let value = self.lower_value(expr)?;
        if self
            .builder
            .value_type(&value)
            .is_some_and(|ty| ty.is_bool())
        {
            return Ok(value);
        }
        self.report_unsupported(UnsupportedKind::NonBooleanCondition);
        Ok(LirValue::Constant(LirConstant::Bool(false)))
    }

    fn lower_operands(&mut self, callee: &Expr, args: &[Expr]) -> Result<()> {
        self.lower_value(callee)?;
        for arg in args {
            self.lower_value(arg)?;
        }
        Ok(())
    }

    /// Call a helper that writes its boxed result through an out pointer to
    /// fresh storage, then load the result.
    fn box_result(
        &mut self,
        helper: &HelperRef,
        args: impl FnOnce(LirValue) -> Vec<LirValue>,
    ) -> Result<Lowered> {
        let out = self.builder.alloca(&self.session.catalog.value)?;
        self.builder.call(helper, args(out.clone()))?;
        Ok(Lowered::Value(self.builder.load(out)?))
    }
}

fn op_code(code: i64) -> LirValue {
    LirValue::Constant(LirConstant::Int(code, Ty::I32))
}
