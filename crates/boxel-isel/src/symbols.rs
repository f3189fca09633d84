//! Module-level symbol names shared by functions, helpers and string globals.

use std::collections::HashSet;

/// Every symbol name already defined in the output module.
#[derive(Debug, Default)]
pub struct SymbolNames {
    taken: HashSet<String>,
}

impl SymbolNames {
    /// Claim `base`, or the first free `base.N` with N counting from 1.
    pub fn claim(&mut self, base: &str) -> String {
        let mut name = base.to_string();
        let mut suffix = 1;
        while self.taken.contains(&name) {
            name = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

impl<S: Into<String>> FromIterator<S> for SymbolNames {
    fn from_iter<I: IntoIterator<Item = S>>(names: I) -> Self {
        Self {
            taken: names.into_iter().map(Into::into).collect(),
        }
    }
}
