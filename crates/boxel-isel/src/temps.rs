//! Storage for function temporaries.

use boxel_core::lir::{LirConstant, LirValue, Ty};
use boxel_core::mir::{Temp, TempKind};

use crate::builder::FunctionBuilder;
use crate::driver::FunctionLowering;
use crate::error::{Error, Result};

/// Where a temporary lives.
#[derive(Debug, Clone, PartialEq)]
pub enum TempStorage {
    /// Address of the temporary's slot.
    Slot(LirValue),
    /// Value of an incoming argument, fetched at the use site.
    Argument(LirValue),
}

#[derive(Debug, Default)]
pub struct TempSlots {
    slots: Vec<LirValue>,
}

impl TempSlots {
    /// Allocate `count` slots of `value` at the insertion point, then zero them.
    pub fn allocate(count: u32, value: &Ty, builder: &mut FunctionBuilder) -> Result<Self> {
        let slots = (0..count)
            .map(|_| builder.alloca(value))
            .collect::<Result<Vec<_>>>()?;
        for slot in &slots {
            builder.store(
                LirValue::Constant(LirConstant::ZeroInit(value.clone())),
                slot.clone(),
            )?;
        }
        Ok(Self { slots })
    }

    pub fn slot(&self, index: u32) -> Option<&LirValue> {
        self.slots.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FunctionLowering<'_, '_> {
    /// Resolve a temporary. Argument temporaries emit a fresh `get_argument`
    /// call on every use.
    pub(crate) fn storage_for(&mut self, temp: Temp) -> Result<TempStorage> {
        match temp.kind() {
            TempKind::Local(index) => match self.temps.slot(index) {
                Some(slot) => Ok(TempStorage::Slot(slot.clone())),
                None => Err(Error::TemporaryOutOfRange {
                    location: self.location.clone(),
                    index,
                    temp_count: self.function.temp_count,
                }),
            },
            TempKind::Argument(number) => {
                let catalog = self.session.catalog;
                let index = LirValue::Constant(LirConstant::Int(number as i64, Ty::I32));
                let value = self
                    .builder
                    .call(&catalog.get_argument, vec![self.context.clone(), index])?;
                Ok(TempStorage::Argument(value))
            }
        }
    }
}
