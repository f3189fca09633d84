//! Instruction builder for a single output function.

use std::collections::HashMap;

use boxel_core::lir::{
    BasicBlockId, Linkage, LirBasicBlock, LirFunction, LirFunctionSignature, LirId, LirInstruction,
    LirInstructionKind, LirLocal, LirTerminator, LirValue, Ty,
};
use tracing::trace;

use crate::catalog::HelperRef;
use crate::error::{isel_error, Result};

/// Appends instructions at an insertion point, numbering results per function.
pub struct FunctionBuilder {
    function: LirFunction,
    current: Option<BasicBlockId>,
    next_id: LirId,
    register_types: HashMap<LirId, Ty>,
}

impl FunctionBuilder {
    pub fn new(name: impl Into<String>, signature: LirFunctionSignature, linkage: Linkage) -> Self {
        Self {
            function: LirFunction::new(name, signature, linkage),
            current: None,
            next_id: 0,
            register_types: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn add_argument(&mut self, name: &str, ty: Ty) -> LirValue {
        let id = self.function.locals.len() as u32;
        self.function.locals.push(LirLocal {
            id,
            ty,
            name: Some(name.to_string()),
            is_argument: true,
        });
        LirValue::Local(id)
    }

    pub fn create_block(&mut self, label: Option<String>) -> BasicBlockId {
        let id = self.function.basic_blocks.len() as BasicBlockId;
        trace!(function = %self.function.name, block = id, ?label, "creating block");
        self.function.add_basic_block(LirBasicBlock::new(id, label));
        id
    }

    pub fn block_count(&self) -> usize {
        self.function.basic_blocks.len()
    }

    pub fn position_at_end(&mut self, block: BasicBlockId) {
        self.current = Some(block);
    }

    fn emit(&mut self, kind: LirInstructionKind, result: Option<Ty>) -> Result<LirValue> {
        let block = self
            .current
            .and_then(|id| self.function.get_basic_block_mut(id))
            .ok_or_else(|| isel_error("no insertion block"))?;
        let id = self.next_id;
        self.next_id += 1;
        let mut instruction = LirInstruction::new(id, kind);
        if let Some(ty) = result {
            self.register_types.insert(id, ty.clone());
            instruction = instruction.with_type(ty);
        }
        block.add_instruction(instruction);
        Ok(LirValue::Register(id))
    }

    pub fn alloca(&mut self, ty: &Ty) -> Result<LirValue> {
        self.emit(LirInstructionKind::Alloca { ty: ty.clone() }, Some(ty.ptr_to()))
    }

    pub fn load(&mut self, address: LirValue) -> Result<LirValue> {
        let ty = self
            .value_type(&address)
            .and_then(|ty| ty.pointee().cloned())
            .ok_or_else(|| isel_error("load from a value that is not a pointer"))?;
        self.emit(LirInstructionKind::Load { address }, Some(ty))
    }

    pub fn store(&mut self, value: LirValue, address: LirValue) -> Result<()> {
        self.emit(LirInstructionKind::Store { value, address }, None)?;
        Ok(())
    }

    pub fn call(&mut self, helper: &HelperRef, args: Vec<LirValue>) -> Result<LirValue> {
        trace!(function = %self.function.name, helper = %helper.name, "calling runtime helper");
        self.emit(
            LirInstructionKind::Call {
                function: helper.callee(),
                args,
            },
            Some(helper.signature.return_type.clone()),
        )
    }

    /// Close the current block.
    pub fn terminate(&mut self, terminator: LirTerminator) -> Result<()> {
        let block = self
            .current
            .ok_or_else(|| isel_error("no insertion block"))?;
        if !self.function.set_terminator(block, terminator) {
            return Err(isel_error(format!("block bb{} does not exist", block)));
        }
        Ok(())
    }

    pub fn value_type(&self, value: &LirValue) -> Option<Ty> {
        match value {
            LirValue::Register(id) => self.register_types.get(id).cloned(),
            LirValue::Constant(constant) => Some(constant.ty()),
            LirValue::Global(_, ty) => Some(ty.clone()),
            LirValue::Local(id) => self
                .function
                .locals
                .iter()
                .find(|local| local.id == *id)
                .map(|local| local.ty.clone()),
            LirValue::Function(_) => None,
        }
    }

    pub fn finish(self) -> LirFunction {
        self.function
    }
}
