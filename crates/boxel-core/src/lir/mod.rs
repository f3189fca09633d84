//! Typed control-flow graph produced by instruction selection.

use derive_more::Display;
use itertools::Itertools;

pub mod pretty;
pub mod ty;

pub use ty::Ty;
pub type LirType = Ty;
pub type LirId = u32;
pub type RegisterId = u32;
pub type BasicBlockId = u32;

pub const DEFAULT_MODULE_NAME: &str = "a.out";

#[derive(Debug, Clone, PartialEq)]
pub struct LirProgram {
    pub name: String,
    pub type_definitions: Vec<LirTypeDefinition>,
    pub externals: Vec<LirExternal>,
    pub globals: Vec<LirGlobal>,
    pub functions: Vec<LirFunction>,
}

/// A body-less function declaration, typically a runtime helper.
#[derive(Debug, Clone, PartialEq)]
pub struct LirExternal {
    pub name: String,
    pub signature: LirFunctionSignature,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LirFunction {
    pub name: String,
    pub signature: LirFunctionSignature,
    pub basic_blocks: Vec<LirBasicBlock>,
    pub locals: Vec<LirLocal>,
    pub linkage: Linkage,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LirFunctionSignature {
    pub params: Vec<LirType>,
    pub return_type: LirType,
    pub is_variadic: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LirBasicBlock {
    pub id: BasicBlockId,
    pub label: Option<String>,
    pub instructions: Vec<LirInstruction>,
    pub terminator: LirTerminator,
    pub predecessors: Vec<BasicBlockId>,
    pub successors: Vec<BasicBlockId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LirInstruction {
    pub id: LirId,
    pub kind: LirInstructionKind,
    pub type_hint: Option<LirType>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LirInstructionKind {
    /// Stack slot of `ty`; the result is a pointer to it.
    Alloca { ty: LirType },
    Load { address: LirValue },
    /// Produces no value, but still consumes an id.
    Store { value: LirValue, address: LirValue },
    Call { function: LirValue, args: Vec<LirValue> },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LirTerminator {
    Return(Option<LirValue>),
    Br(BasicBlockId),
    CondBr {
        condition: LirValue,
        if_true: BasicBlockId,
        if_false: BasicBlockId,
    },
    Unreachable,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LirValue {
    /// Result of the instruction with this id.
    Register(RegisterId),
    Constant(LirConstant),
    /// Address of a named global of the given type.
    Global(String, Ty),
    /// A function or helper referenced by name.
    Function(String),
    /// Function parameter by position.
    Local(u32),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LirConstant {
    Int(i64, LirType),
    Float(f64, LirType),
    Bool(bool),
    /// Text of a null-terminated byte string.
    String(String),
    /// Canonical all-zero value of a type.
    ZeroInit(LirType),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LirGlobal {
    pub name: String,
    pub ty: LirType,
    pub initializer: Option<LirConstant>,
    pub linkage: Linkage,
    pub is_constant: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LirTypeDefinition {
    pub name: String,
    pub ty: LirType,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LirLocal {
    pub id: u32,
    pub ty: LirType,
    pub name: Option<String>,
    pub is_argument: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display)]
pub enum Linkage {
    #[default]
    #[display("external")]
    External,
    #[display("internal")]
    Internal,
    #[display("private")]
    Private,
}

impl LirProgram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_definitions: Vec::new(),
            externals: Vec::new(),
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: LirFunction) {
        self.functions.push(function);
    }

    pub fn add_global(&mut self, global: LirGlobal) {
        self.globals.push(global);
    }

    pub fn add_external(&mut self, external: LirExternal) {
        self.externals.push(external);
    }

    pub fn add_type_definition(&mut self, definition: LirTypeDefinition) {
        self.type_definitions.push(definition);
    }

    pub fn type_definition(&self, name: &str) -> Option<&LirTypeDefinition> {
        self.type_definitions.iter().find(|def| def.name == name)
    }

    pub fn external(&self, name: &str) -> Option<&LirExternal> {
        self.externals.iter().find(|ext| ext.name == name)
    }

    pub fn function(&self, name: &str) -> Option<&LirFunction> {
        self.functions.iter().find(|func| func.name == name)
    }
}

impl Default for LirProgram {
    fn default() -> Self {
        Self::new(DEFAULT_MODULE_NAME)
    }
}

impl LirFunctionSignature {
    pub fn new(params: Vec<LirType>, return_type: LirType) -> Self {
        Self {
            params,
            return_type,
            is_variadic: false,
        }
    }

    pub fn ty(&self) -> Ty {
        Ty::Function {
            return_type: Box::new(self.return_type.clone()),
            param_types: self.params.clone(),
            is_variadic: self.is_variadic,
        }
    }
}

impl std::fmt::Display for LirFunctionSignature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.ty().fmt(f)
    }
}

impl LirFunction {
    pub fn new(name: impl Into<String>, signature: LirFunctionSignature, linkage: Linkage) -> Self {
        Self {
            name: name.into(),
            signature,
            basic_blocks: Vec::new(),
            locals: Vec::new(),
            linkage,
        }
    }

    pub fn add_basic_block(&mut self, block: LirBasicBlock) {
        self.basic_blocks.push(block);
    }

    pub fn get_basic_block_mut(&mut self, id: BasicBlockId) -> Option<&mut LirBasicBlock> {
        self.basic_blocks.iter_mut().find(|bb| bb.id == id)
    }

    /// Set the terminator of `block` and record the resulting CFG edges.
    /// Returns `false` if the block does not exist.
    pub fn set_terminator(&mut self, block: BasicBlockId, terminator: LirTerminator) -> bool {
        let successors = terminator.successors();
        let previous = match self.get_basic_block_mut(block) {
            Some(bb) => {
                let previous = std::mem::take(&mut bb.successors);
                bb.successors = successors.iter().copied().unique().collect();
                bb.set_terminator(terminator);
                previous
            }
            None => return false,
        };
        for old in previous {
            if let Some(bb) = self.get_basic_block_mut(old) {
                bb.predecessors.retain(|pred| *pred != block);
            }
        }
        for succ in successors {
            if let Some(bb) = self.get_basic_block_mut(succ) {
                if !bb.predecessors.contains(&block) {
                    bb.predecessors.push(block);
                }
            }
        }
        true
    }

    pub fn instructions(&self) -> impl Iterator<Item = &LirInstruction> {
        self.basic_blocks.iter().flat_map(|bb| bb.instructions.iter())
    }
}

impl LirBasicBlock {
    pub fn new(id: BasicBlockId, label: Option<String>) -> Self {
        Self {
            id,
            label,
            instructions: Vec::new(),
            terminator: LirTerminator::Unreachable,
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    pub fn add_instruction(&mut self, instruction: LirInstruction) {
        self.instructions.push(instruction);
    }

    pub fn set_terminator(&mut self, terminator: LirTerminator) {
        self.terminator = terminator;
    }
}

impl LirInstruction {
    pub fn new(id: LirId, kind: LirInstructionKind) -> Self {
        Self {
            id,
            kind,
            type_hint: None,
        }
    }

    pub fn with_type(mut self, ty: LirType) -> Self {
        self.type_hint = Some(ty);
        self
    }
}

impl LirTerminator {
    pub fn successors(&self) -> Vec<BasicBlockId> {
        match self {
            LirTerminator::Br(target) => vec![*target],
            LirTerminator::CondBr {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
            LirTerminator::Return(_) | LirTerminator::Unreachable => Vec::new(),
        }
    }
}

impl LirConstant {
    pub fn ty(&self) -> LirType {
        match self {
            LirConstant::Int(_, ty) | LirConstant::Float(_, ty) | LirConstant::ZeroInit(ty) => {
                ty.clone()
            }
            LirConstant::Bool(_) => Ty::I1,
            LirConstant::String(text) => Ty::Array(Box::new(Ty::I8), text.len() as u64 + 1),
        }
    }
}
