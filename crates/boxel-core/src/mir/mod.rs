//! Mid-level IR consumed by instruction selection.
//!
//! Functions are lists of basic blocks, blocks are lists of statements, and
//! statements hold tree-shaped expressions. Blocks and functions are addressed
//! by their index in the owning vector, never by reference identity.

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

pub mod pretty;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
#[display("L{_0}")]
pub struct BlockId(pub u32);

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, From,
)]
#[serde(transparent)]
#[display("fn#{_0}")]
pub struct FunctionId(pub u32);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub temp_count: u32,
    #[serde(default)]
    pub basic_blocks: Vec<BasicBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    #[serde(default)]
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Eval(Expr),
    Assign {
        target: Expr,
        source: Expr,
    },
    Jump(BlockId),
    CondJump {
        cond: Expr,
        if_true: BlockId,
        if_false: BlockId,
    },
    Return(Expr),
    /// Start of a scope region (`with`, exception handler).
    Enter(Expr),
    Leave,
}

/// A temporary reference. Non-negative indices name function-local slots,
/// negative indices encode incoming argument `-index - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Temp {
    pub index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TempKind {
    Local(u32),
    Argument(u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Constant(f64),
    StringLiteral(String),
    Temporary(Temp),
    Name(String),
    Closure(FunctionId),
    UnaryOp(UnaryOp, Box<Expr>),
    BinaryOp(BinaryOp, Box<Expr>, Box<Expr>),
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Subscript {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        name: String,
    },
}

/// Variant tag of an [`Expr`], used in reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum ExprKind {
    Constant,
    StringLiteral,
    Temporary,
    Name,
    Closure,
    UnaryOp,
    BinaryOp,
    Call,
    New,
    Subscript,
    Member,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    Not = 0,
    Neg = 1,
    Plus = 2,
    Compl = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Mod = 4,
    Shl = 5,
    Shr = 6,
    UShr = 7,
    BitAnd = 8,
    BitOr = 9,
    BitXor = 10,
    Lt = 11,
    Gt = 12,
    Le = 13,
    Ge = 14,
    Eq = 15,
    Ne = 16,
    StrictEq = 17,
    StrictNe = 18,
    InstanceOf = 19,
    In = 20,
    And = 21,
    Or = 22,
}

/// Position of a statement inside a module, carried by fatal errors.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
#[display("`{function}` {block}#{statement}")]
pub struct StmtLocation {
    pub function: String,
    pub block: BlockId,
    pub statement: usize,
}

// Implementation helpers
impl Module {
    pub fn new() -> Self {
        Self {
            functions: Vec::new(),
        }
    }

    pub fn add_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.functions.push(function);
        id
    }

    pub fn function(&self, id: FunctionId) -> Option<&Function> {
        self.functions.get(id.index())
    }
}

impl Function {
    pub fn new(name: impl Into<String>, temp_count: u32) -> Self {
        Self {
            name: Some(name.into()),
            temp_count,
            basic_blocks: Vec::new(),
        }
    }

    pub fn anonymous(temp_count: u32) -> Self {
        Self {
            name: None,
            temp_count,
            basic_blocks: Vec::new(),
        }
    }

    pub fn add_block(&mut self) -> BlockId {
        let id = BlockId(self.basic_blocks.len() as u32);
        self.basic_blocks.push(BasicBlock::new());
        id
    }

    /// Append a statement to `block`.
    ///
    /// Panics if `block` was not created by [`Function::add_block`].
    pub fn push(&mut self, block: BlockId, stmt: Stmt) {
        self.basic_blocks[block.index()].statements.push(stmt);
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.basic_blocks.get(id.index())
    }

    pub fn entry_block(&self) -> Option<BlockId> {
        if self.basic_blocks.is_empty() {
            None
        } else {
            Some(BlockId(0))
        }
    }

    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> {
        (0..self.basic_blocks.len() as u32).map(BlockId)
    }
}

impl BasicBlock {
    pub fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    pub fn terminator(&self) -> Option<&Stmt> {
        self.statements.iter().find(|stmt| stmt.is_terminator())
    }
}

impl Stmt {
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Stmt::Jump(_) | Stmt::CondJump { .. } | Stmt::Return(_)
        )
    }

    pub fn successors(&self) -> Vec<BlockId> {
        match self {
            Stmt::Jump(target) => vec![*target],
            Stmt::CondJump {
                if_true, if_false, ..
            } => vec![*if_true, *if_false],
            _ => Vec::new(),
        }
    }
}

impl Temp {
    pub fn local(index: u16) -> Self {
        Self {
            index: i32::from(index),
        }
    }

    pub fn argument(number: u16) -> Self {
        Self {
            index: -i32::from(number) - 1,
        }
    }

    pub fn kind(self) -> TempKind {
        match u32::try_from(self.index) {
            Ok(index) => TempKind::Local(index),
            // -(index + 1) stays within i32 for every negative index.
            Err(_) => TempKind::Argument((-(self.index + 1)).unsigned_abs()),
        }
    }
}

impl Expr {
    pub fn constant(value: f64) -> Self {
        Expr::Constant(value)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Expr::StringLiteral(text.into())
    }

    pub fn temp(index: i32) -> Self {
        Expr::Temporary(Temp { index })
    }

    pub fn local(index: u16) -> Self {
        Expr::Temporary(Temp::local(index))
    }

    pub fn argument(number: u16) -> Self {
        Expr::Temporary(Temp::argument(number))
    }

    pub fn name(identifier: impl Into<String>) -> Self {
        Expr::Name(identifier.into())
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::UnaryOp(op, Box::new(operand))
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::BinaryOp(op, Box::new(left), Box::new(right))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn new_object(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::New {
            callee: Box::new(callee),
            args,
        }
    }

    pub fn subscript(base: Expr, index: Expr) -> Self {
        Expr::Subscript {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    pub fn member(base: Expr, name: impl Into<String>) -> Self {
        Expr::Member {
            base: Box::new(base),
            name: name.into(),
        }
    }

    pub fn kind(&self) -> ExprKind {
        match self {
            Expr::Constant(_) => ExprKind::Constant,
            Expr::StringLiteral(_) => ExprKind::StringLiteral,
            Expr::Temporary(_) => ExprKind::Temporary,
            Expr::Name(_) => ExprKind::Name,
            Expr::Closure(_) => ExprKind::Closure,
            Expr::UnaryOp(..) => ExprKind::UnaryOp,
            Expr::BinaryOp(..) => ExprKind::BinaryOp,
            Expr::Call { .. } => ExprKind::Call,
            Expr::New { .. } => ExprKind::New,
            Expr::Subscript { .. } => ExprKind::Subscript,
            Expr::Member { .. } => ExprKind::Member,
        }
    }

    pub fn as_temp(&self) -> Option<Temp> {
        match self {
            Expr::Temporary(temp) => Some(*temp),
            _ => None,
        }
    }
}

impl UnaryOp {
    /// Operator code passed to the runtime's unary dispatch helper.
    pub fn op_code(self) -> i64 {
        self as i64
    }

    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Compl => "~",
        }
    }
}

impl BinaryOp {
    /// Operator code passed to the runtime's binary dispatch helper.
    pub fn op_code(self) -> i64 {
        self as i64
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNe => "!==",
            BinaryOp::InstanceOf => "instanceof",
            BinaryOp::In => "in",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl BlockId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl FunctionId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}
