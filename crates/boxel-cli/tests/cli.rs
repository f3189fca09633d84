//! Integration tests for the boxel CLI

use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn demo(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(name)
}

fn boxel() -> Command {
    Command::cargo_bin("boxel").unwrap()
}

/// The bundled runtime with `init_number` taking the wrong operand type.
const MISTYPED_RUNTIME: &str = r#"{
    "name": "mistyped",
    "types": [
        { "name": "struct.vm.Value", "fields": ["i32", "i32", "f64"] },
        { "name": "struct.vm.Context" },
        { "name": "struct.vm.String" }
    ],
    "functions": [
        { "name": "__boxel_get_argument", "params": ["ptr %struct.vm.Context", "i32"], "ret": "%struct.vm.Value" },
        { "name": "__boxel_init_number", "params": ["ptr %struct.vm.Value", "i32"] },
        { "name": "__boxel_init_string", "params": ["ptr %struct.vm.Context", "ptr %struct.vm.Value", "ptr i8"] },
        { "name": "__boxel_return", "params": ["ptr %struct.vm.Context", "%struct.vm.Value"] }
    ]
}"#;

#[test]
fn test_cli_help() {
    boxel()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("boxel"))
        .stdout(predicate::str::contains("check-runtime"));
}

#[test]
fn test_cli_version() {
    boxel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_lower_round_trip() {
    boxel()
        .arg("lower")
        .arg(demo("round_trip.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("lir::Program a.out {"))
        .stdout(predicate::str::contains(
            "fn main(arg0: ptr %struct.vm.Context) -> void [linkage: external] {",
        ))
        .stdout(predicate::str::contains(
            "call @__boxel_init_number(%r2, f64 3.25)",
        ))
        .stdout(predicate::str::contains("call @__boxel_return(%local0, %r6)"))
        .stdout(predicate::str::contains("terminator: ret void"))
        .stderr(predicate::str::contains("placeholder").not());
}

#[test]
fn test_lower_branches_and_strings() {
    boxel()
        .args(["lower", "--module-name", "branchy"])
        .arg(demo("branch.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("lir::Program branchy {"))
        .stdout(predicate::str::contains("bb3 // label: L3 // preds: [bb1, bb2]"))
        .stdout(predicate::str::contains("@.str: [4 x i8]"))
        .stdout(predicate::str::contains("@.str.1: [3 x i8]"))
        .stderr(predicate::str::contains("non-boolean condition"));
}

#[test]
fn test_emit_input() {
    boxel()
        .args(["lower", "--emit", "input"])
        .arg(demo("round_trip.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("mir::Module {"))
        .stdout(predicate::str::contains("fn#0 main { temps: 1 } {"))
        .stdout(predicate::str::contains("lir::Program").not());
}

#[test]
fn test_unsupported_operations_are_reported() {
    boxel()
        .arg("lower")
        .arg(demo("dynamic.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("@__boxel_get_member"))
        .stdout(predicate::str::contains("fn anonymous.1("))
        .stderr(predicate::str::contains(
            "Call expression lowered to a zero placeholder",
        ))
        .stderr(predicate::str::contains(
            "Closure expression lowered to a zero placeholder",
        ));
}

#[test]
fn test_deny_unsupported_fails() {
    boxel()
        .args(["lower", "--deny-unsupported"])
        .arg(demo("dynamic.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("unsupported operation(s)"));

    boxel()
        .args(["lower", "--deny-unsupported"])
        .arg(demo("round_trip.json"))
        .assert()
        .success();
}

#[test]
fn test_output_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("main.lir");

    boxel()
        .arg("lower")
        .arg(demo("round_trip.json"))
        .arg("--output")
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("lir::Program a.out {"));
}

#[test]
fn test_config_file_controls_output() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("boxel.toml");
    fs::write(
        &config,
        "[lowering]\nmodule_name = \"configured\"\n\n[output]\nshow_types = false\ndiagnostics = \"plain\"\n",
    )
    .unwrap();

    boxel()
        .arg("--config")
        .arg(&config)
        .arg("lower")
        .arg(demo("branch.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("lir::Program configured {"))
        .stdout(predicate::str::contains("i0: %r0 = alloca %struct.vm.Value\n"))
        .stderr(predicate::str::contains("[isel] WARNING: non-boolean condition"));
}

#[test]
fn test_config_is_picked_up_from_working_directory() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("boxel.toml"),
        "[lowering]\ninternal_linkage = true\n",
    )
    .unwrap();

    boxel()
        .current_dir(dir.path())
        .arg("lower")
        .arg(demo("round_trip.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("[linkage: internal]"));
}

#[test]
fn test_missing_input_fails() {
    let dir = TempDir::new().unwrap();
    boxel()
        .arg("lower")
        .arg(dir.path().join("absent.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Invalid input module"));
}

#[test]
fn test_missing_runtime_fails() {
    let dir = TempDir::new().unwrap();
    boxel()
        .arg("lower")
        .arg(demo("round_trip.json"))
        .arg("--runtime")
        .arg(dir.path().join("missing.json"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_check_runtime_bundled() {
    boxel()
        .arg("check-runtime")
        .assert()
        .success()
        .stdout(predicate::str::contains("runtime boxel-runtime"))
        .stdout(predicate::str::contains("%struct.vm.Value = { i32, i32, f64 }"))
        .stdout(predicate::str::contains("@__boxel_binary_op"))
        .stdout(predicate::str::contains("not provided").not());
}

#[test]
fn test_check_runtime_rejects_mistyped_helper() {
    let dir = TempDir::new().unwrap();
    let runtime = dir.path().join("runtime.json");
    fs::write(&runtime, MISTYPED_RUNTIME).unwrap();

    boxel()
        .arg("check-runtime")
        .arg("--runtime")
        .arg(&runtime)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("__boxel_init_number"));
}

#[test]
fn test_check_runtime_rejects_malformed_json() {
    let dir = TempDir::new().unwrap();
    let runtime = dir.path().join("runtime.json");
    fs::write(&runtime, "{ \"types\": 3 }").unwrap();

    boxel()
        .arg("check-runtime")
        .arg("--runtime")
        .arg(&runtime)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("malformed"));
}
