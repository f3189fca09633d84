use boxel_core::lir::{Linkage, DEFAULT_MODULE_NAME};
use serde::{Deserialize, Serialize};

use crate::catalog::RuntimeNames;

/// Knobs for a lowering session. Every field has a default, so a partial
/// `[lowering]` table in `boxel.toml` is enough.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IselOptions {
    pub module_name: String,
    pub runtime_names: RuntimeNames,
    /// Emit lowered functions with internal instead of external linkage.
    pub internal_linkage: bool,
}

impl Default for IselOptions {
    fn default() -> Self {
        Self {
            module_name: DEFAULT_MODULE_NAME.to_string(),
            runtime_names: RuntimeNames::default(),
            internal_linkage: false,
        }
    }
}

impl IselOptions {
    pub fn with_module_name(mut self, name: impl Into<String>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn function_linkage(&self) -> Linkage {
        if self.internal_linkage {
            Linkage::Internal
        } else {
            Linkage::External
        }
    }
}
