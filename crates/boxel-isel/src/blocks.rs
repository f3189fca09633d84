//! Mapping from input blocks to output blocks.

use std::collections::HashMap;

use boxel_core::lir::BasicBlockId;
use boxel_core::mir;

use crate::builder::FunctionBuilder;

/// Input block to output block, created on first reference.
#[derive(Debug, Default)]
pub struct BlockMap {
    blocks: HashMap<mir::BlockId, BasicBlockId>,
}

impl BlockMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block_for(&mut self, block: mir::BlockId, builder: &mut FunctionBuilder) -> BasicBlockId {
        *self
            .blocks
            .entry(block)
            .or_insert_with(|| builder.create_block(Some(block.to_string())))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}
