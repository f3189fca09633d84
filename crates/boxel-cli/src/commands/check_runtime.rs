//! `boxel check-runtime`: link a runtime definition and resolve the catalog.

use std::fmt::Write as _;
use std::path::PathBuf;

use boxel_core::lir::{LirProgram, Ty};
use boxel_isel::{HelperRef, InstructionSelection, TypeCatalog};
use clap::Args;
use console::style;

use crate::commands::load_runtime;
use crate::config::CliConfig;
use crate::Result;

/// Arguments for the check-runtime command
#[derive(Debug, Clone, Args)]
pub struct CheckRuntimeArgs {
    /// Runtime definition artifact (overrides `[runtime] path`)
    #[arg(long)]
    pub runtime: Option<PathBuf>,
}

/// Execute the check-runtime command
pub fn check_runtime_command(args: CheckRuntimeArgs, config: &CliConfig) -> Result<()> {
    let runtime = load_runtime(args.runtime.as_deref(), config)?;
    let name = runtime.display_name().to_string();
    let selection = InstructionSelection::new(runtime, config.lowering.clone());
    let (program, catalog) = selection.prepare()?;

    print!("{}", describe(&name, &program, &catalog));
    Ok(())
}

/// Human-readable report of a resolved catalog.
pub fn describe(name: &str, program: &LirProgram, catalog: &TypeCatalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", style("runtime").cyan().bold(), name);
    let _ = writeln!(
        out,
        "  {} type(s), {} helper declaration(s)",
        program.type_definitions.len(),
        program.externals.len()
    );

    let _ = writeln!(out, "{}", style("types").yellow().bold());
    for (role, ty) in [
        ("number", &catalog.number),
        ("value", &catalog.value),
        ("context", &catalog.context_ptr),
        ("string", &catalog.string_ptr),
    ] {
        let _ = writeln!(out, "  {:<8} {}{}", role, ty, layout(program, ty));
    }
    let _ = writeln!(out, "  {:<8} {}", "function", catalog.function);

    let _ = writeln!(out, "{}", style("required helpers").yellow().bold());
    for (role, helper) in [
        ("get_argument", &catalog.get_argument),
        ("init_number", &catalog.init_number),
        ("init_string", &catalog.init_string),
        ("return", &catalog.return_value),
    ] {
        let _ = writeln!(out, "  {} {}", style("✓").green(), helper_line(role, helper));
    }

    let _ = writeln!(out, "{}", style("optional helpers").yellow().bold());
    for (role, helper) in catalog.optional_helpers() {
        let _ = match helper {
            Some(helper) => writeln!(out, "  {} {}", style("✓").green(), helper_line(role, helper)),
            None => writeln!(
                out,
                "  {} {:<12} not provided, lowered as placeholder",
                style("✗").red(),
                role
            ),
        };
    }
    out
}

fn helper_line(role: &str, helper: &HelperRef) -> String {
    format!("{:<12} @{}: {}", role, helper.name, helper.signature)
}

/// Body of a named struct, or of the struct a pointer points at.
fn layout(program: &LirProgram, ty: &Ty) -> String {
    let named = ty.pointee().unwrap_or(ty);
    let Some(definition) = named.struct_name().and_then(|name| program.type_definition(name)) else {
        return String::new();
    };
    match &definition.ty {
        Ty::Struct { fields, .. } if fields.is_empty() => " (opaque)".to_string(),
        Ty::Struct { fields, .. } => {
            let fields: Vec<_> = fields.iter().map(Ty::to_string).collect();
            format!(" = {{ {} }}", fields.join(", "))
        }
        _ => String::new(),
    }
}
