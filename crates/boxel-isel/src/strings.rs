//! Module-wide interning of string constants.

use std::collections::HashMap;

use boxel_core::lir::{Linkage, LirConstant, LirGlobal, LirValue, Ty};
use tracing::trace;

use crate::symbols::SymbolNames;

/// Base name of interned string globals; later ones are `.str.1`, `.str.2`, ...
const STRING_GLOBAL: &str = ".str";

/// Maps literal text to a single private byte-string global per session.
#[derive(Debug, Default)]
pub struct StringTable {
    names: HashMap<String, String>,
    globals: Vec<LirGlobal>,
}

impl StringTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pointer to the interned bytes of `text`, creating the global on first
    /// use under a name not yet taken in `symbols`.
    pub fn intern(&mut self, text: &str, symbols: &mut SymbolNames) -> LirValue {
        if let Some(name) = self.names.get(text) {
            return Self::pointer(name);
        }

        let name = symbols.claim(STRING_GLOBAL);
        let initializer = LirConstant::String(text.to_string());
        trace!(global = %name, bytes = text.len(), "interning string");
        self.globals.push(LirGlobal {
            name: name.clone(),
            ty: initializer.ty(),
            initializer: Some(initializer),
            linkage: Linkage::Private,
            is_constant: true,
        });
        let value = Self::pointer(&name);
        self.names.insert(text.to_string(), name);
        value
    }

    pub fn len(&self) -> usize {
        self.globals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.globals.is_empty()
    }

    pub fn into_globals(self) -> Vec<LirGlobal> {
        self.globals
    }

    fn pointer(name: &str) -> LirValue {
        LirValue::Global(name.to_string(), Ty::I8.ptr_to())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn identical_text_shares_one_global() {
        let mut table = StringTable::new();
        let mut symbols = SymbolNames::default();
        let first = table.intern("hello", &mut symbols);
        let other = table.intern("world", &mut symbols);
        let again = table.intern("hello", &mut symbols);

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(table.len(), 2);

        let globals = table.into_globals();
        assert_eq!(globals[0].name, ".str");
        assert_eq!(globals[1].name, ".str.1");
        assert_eq!(globals[0].ty, Ty::Array(Box::new(Ty::I8), 6));
        assert!(globals.iter().all(|g| g.is_constant && g.linkage == Linkage::Private));
    }

    #[test]
    fn sizes_count_utf8_bytes() {
        let mut table = StringTable::new();
        let mut symbols = SymbolNames::default();
        table.intern("héllo", &mut symbols);
        table.intern("", &mut symbols);
        let globals = table.into_globals();
        assert_eq!(globals[0].ty, Ty::Array(Box::new(Ty::I8), 7));
        assert_eq!(globals[1].ty, Ty::Array(Box::new(Ty::I8), 1));
    }

    #[test]
    fn names_already_defined_are_skipped() {
        let mut table = StringTable::new();
        let mut symbols: SymbolNames = [".str", ".str.2"].into_iter().collect();
        table.intern("a", &mut symbols);
        table.intern("b", &mut symbols);
        let names: Vec<_> = table.into_globals().into_iter().map(|g| g.name).collect();
        assert_eq!(names, vec![".str.1", ".str.3"]);
    }
}
