use std::fs;
use std::path::PathBuf;

use boxel_core::lir::LirProgram;
use boxel_core::mir::{BlockId, Module, Stmt};
use boxel_core::pretty::{pretty, PrettyOptions};
use boxel_core::RuntimeDefinition;
use pretty_assertions::assert_eq;

fn repo_file(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join(relative)
}

fn demo(name: &str) -> Module {
    let text = fs::read_to_string(repo_file(&format!("demos/{}", name))).unwrap();
    serde_json::from_str(&text).unwrap()
}

#[test]
fn branch_demo_decodes() {
    let module = demo("branch.json");
    let pick = &module.functions[0];
    assert_eq!(pick.name.as_deref(), Some("pick"));
    assert_eq!(pick.temp_count, 2);

    let successors: Vec<_> = pick
        .basic_blocks
        .iter()
        .map(|block| block.terminator().map(Stmt::successors).unwrap_or_default())
        .collect();
    assert_eq!(
        successors,
        vec![
            vec![BlockId(1), BlockId(2)],
            vec![BlockId(3)],
            vec![BlockId(3)],
            vec![],
        ]
    );
}

#[test]
fn dynamic_demo_pretty_prints() {
    let module = demo("dynamic.json");
    let text = pretty(&module, PrettyOptions::default()).to_string();

    assert!(text.starts_with("mir::Module {\n"));
    assert!(text.contains("fn#0 greet { temps: 1 } {"));
    assert!(text.contains("eval call console.log((\"hello, \" + arg0))"));
    assert!(text.contains("t0 = arg0[0.0]"));
    assert!(text.contains("fn#1 <anonymous> { temps: 0 } {"));
    assert!(text.contains("eval closure fn#0"));
}

#[test]
fn shipped_runtime_matches_bundled_copy() {
    let on_disk = RuntimeDefinition::load(repo_file("runtime/boxel_runtime.json")).unwrap();
    assert_eq!(on_disk, RuntimeDefinition::bundled().unwrap());

    let mut program = LirProgram::default();
    on_disk.link_into(&mut program).unwrap();
    assert_eq!(program.type_definitions.len(), 3);
    assert_eq!(program.externals.len(), 9);
}
