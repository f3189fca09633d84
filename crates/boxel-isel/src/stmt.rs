//! Statement and terminator lowering.

use boxel_core::lir::{BasicBlockId, LirTerminator, LirValue, Ty};
use boxel_core::mir::{self, Stmt};

use crate::driver::FunctionLowering;
use crate::error::{Error, Result};
use crate::temps::TempStorage;
use crate::{isel_bail, isel_ensure};

impl FunctionLowering<'_, '_> {
    pub(crate) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        let catalog = self.session.catalog;
        match stmt {
            Stmt::Eval(expr) => {
                self.lower_value(expr)?;
            }
            Stmt::Assign { target, source } => {
                let Some(temp) = target.as_temp() else {
                    isel_bail!(Error::AssignTarget {
                        location: self.location.clone(),
                        found: target.kind(),
                    });
                };
                let destination = match self.storage_for(temp)? {
                    TempStorage::Slot(address) => address,
                    TempStorage::Argument(value) => value,
                };
                let value = self.lower_value(source)?;
                self.check_store(&value, &destination)?;
                self.builder.store(value, destination)?;
            }
            Stmt::Jump(target) => {
                let target = self.target_block(*target)?;
                self.builder.terminate(LirTerminator::Br(target))?;
            }
            Stmt::CondJump {
                cond,
                if_true,
                if_false,
            } => {
                let condition = self.lower_condition(cond)?;
                let if_true = self.target_block(*if_true)?;
                let if_false = self.target_block(*if_false)?;
                self.builder.terminate(LirTerminator::CondBr {
                    condition,
                    if_true,
                    if_false,
                })?;
            }
            Stmt::Return(expr) => {
                let Some(temp) = expr.as_temp() else {
                    isel_bail!(Error::ReturnOperand {
                        location: self.location.clone(),
                        found: expr.kind(),
                    });
                };
                let value = match self.storage_for(temp)? {
                    TempStorage::Slot(address) => self.builder.load(address)?,
                    TempStorage::Argument(value) => value,
                };
                self.builder
                    .call(&catalog.return_value, vec![self.context.clone(), value])?;
                self.builder.terminate(LirTerminator::Return(None))?;
            }
            Stmt::Enter(_) => isel_bail!(Error::UnsupportedRegion {
                location: self.location.clone(),
                marker: "enter",
            }),
            Stmt::Leave => isel_bail!(Error::UnsupportedRegion {
                location: self.location.clone(),
                marker: "leave",
            }),
        }
        Ok(())
    }

    fn target_block(&mut self, block: mir::BlockId) -> Result<BasicBlockId> {
        isel_ensure!(
            self.function.block(block).is_some(),
            Error::UnknownBlock {
                location: self.location.clone(),
                block,
            }
        );
        Ok(self.blocks.block_for(block, &mut self.builder))
    }

    /// `destination` must point at storage of exactly the value's type.
    fn check_store(&self, value: &LirValue, destination: &LirValue) -> Result<()> {
        let found = self.builder.value_type(value);
        let expected = self.builder.value_type(destination);
        match (&found, &expected) {
            (Some(found), Some(expected)) if &found.ptr_to() == expected => Ok(()),
            _ => Err(Error::TypeMismatch {
                location: self.location.clone(),
                expected: describe(expected.as_ref()),
                found: describe(found.as_ref()),
            }),
        }
    }
}

fn describe(ty: Option<&Ty>) -> String {
    ty.map(Ty::to_string)
        .unwrap_or_else(|| "<unknown>".to_string())
}
