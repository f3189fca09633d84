//! Shared fixtures for unit tests.

use boxel_core::lir::LirProgram;
use boxel_core::RuntimeDefinition;

/// A runtime with only the four required helpers.
pub(crate) const REQUIRED_ONLY_RUNTIME: &str = r#"{
    "name": "required-only",
    "types": [
        { "name": "struct.vm.Value", "fields": ["i32", "i32", "f64"] },
        { "name": "struct.vm.Context" },
        { "name": "struct.vm.String" }
    ],
    "functions": [
        { "name": "__boxel_get_argument", "params": ["ptr %struct.vm.Context", "i32"], "ret": "%struct.vm.Value" },
        { "name": "__boxel_init_number", "params": ["ptr %struct.vm.Value", "f64"], "ret": "void" },
        { "name": "__boxel_init_string", "params": ["ptr %struct.vm.Context", "ptr %struct.vm.Value", "ptr i8"], "ret": "void" },
        { "name": "__boxel_return", "params": ["ptr %struct.vm.Context", "%struct.vm.Value"], "ret": "void" }
    ]
}"#;

pub(crate) trait ParseRuntime {
    fn parse_runtime(&self) -> RuntimeDefinition;
}

impl ParseRuntime for str {
    fn parse_runtime(&self) -> RuntimeDefinition {
        RuntimeDefinition::from_json(self, "test-runtime.json").expect("test runtime parses")
    }
}

pub(crate) fn link(runtime: &RuntimeDefinition) -> LirProgram {
    let mut program = LirProgram::default();
    runtime.link_into(&mut program).expect("test runtime links");
    program
}
