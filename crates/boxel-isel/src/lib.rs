//! Instruction selection: lowers `boxel_core::mir` modules into typed
//! `boxel_core::lir` programs that call into a boxed-value runtime.

pub mod blocks;
pub mod builder;
pub mod catalog;
pub mod driver;
pub mod error;
pub mod expr;
pub mod options;
pub mod stmt;
pub mod strings;
pub mod symbols;
pub mod temps;
pub mod unsupported;

#[cfg(test)]
mod testing;

pub use catalog::{HelperRef, RuntimeNames, TypeCatalog};
pub use driver::{InstructionSelection, LoweredModule};
pub use expr::Lowered;
pub use options::IselOptions;
pub use unsupported::{Unsupported, UnsupportedKind};

use boxel_core::Result;

/// A pass from one IR to another.
pub trait IrTransform<Src, Dst> {
    fn transform(&mut self, source: Src) -> Result<Dst>;
}
