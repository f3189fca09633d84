//! `boxel lower`: run instruction selection over a JSON module.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use boxel_core::mir;
use boxel_core::pretty::pretty;
use boxel_isel::{InstructionSelection, LoweredModule};
use clap::{Args, ValueEnum};
use console::style;
use itertools::Itertools;
use tracing::info;

use crate::commands::load_runtime;
use crate::config::CliConfig;
use crate::diagnostics::emit_diagnostics;
use crate::{CliError, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum EmitKind {
    /// The lowered target program
    #[default]
    Lir,
    /// The parsed input module, without lowering
    Input,
}

/// Arguments for the lower command
#[derive(Debug, Clone, Args)]
pub struct LowerArgs {
    /// JSON-encoded input module
    pub input: PathBuf,

    /// Runtime definition artifact (overrides `[runtime] path`)
    #[arg(long)]
    pub runtime: Option<PathBuf>,

    /// Write the output here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// What to print
    #[arg(long, value_enum, default_value_t = EmitKind::Lir)]
    pub emit: EmitKind,

    /// Fail when any operation was lowered to a placeholder
    #[arg(long)]
    pub deny_unsupported: bool,

    /// Name of the output module (overrides `[lowering] module_name`)
    #[arg(long)]
    pub module_name: Option<String>,
}

/// Read and decode an input module.
pub fn read_module(path: &Path) -> Result<mir::Module> {
    let invalid = |message: String| CliError::InvalidInput {
        path: path.to_path_buf(),
        message,
    };
    let text = fs::read_to_string(path).map_err(|e| invalid(e.to_string()))?;
    serde_json::from_str(&text).map_err(|e| invalid(e.to_string()))
}

/// Lower `module` with the runtime and options that `args` and `config` select.
pub fn lower_module(
    module: &mir::Module,
    args: &LowerArgs,
    config: &CliConfig,
) -> Result<LoweredModule> {
    let runtime = load_runtime(args.runtime.as_deref(), config)?;
    let mut options = config.lowering.clone();
    if let Some(name) = &args.module_name {
        options = options.with_module_name(name.clone());
    }
    info!(
        runtime = runtime.display_name(),
        module = %options.module_name,
        functions = module.functions.len(),
        "lowering"
    );
    let lowered = InstructionSelection::new(runtime, options).lower_module(module)?;
    Ok(lowered)
}

/// Execute the lower command
pub fn lower_command(args: LowerArgs, config: &CliConfig, verbose: bool) -> Result<()> {
    let module = read_module(&args.input)?;
    let pretty_options = config.output.pretty_options();

    let (text, lowered) = match args.emit {
        EmitKind::Input => (pretty(&module, pretty_options).to_string(), None),
        EmitKind::Lir => {
            let lowered = lower_module(&module, &args, config)?;
            let text = pretty(&lowered.program, pretty_options).to_string();
            (text, Some(lowered))
        }
    };

    match &args.output {
        Some(path) => {
            fs::write(path, &text)?;
            info!(path = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    let Some(lowered) = lowered else {
        return Ok(());
    };
    if lowered.unsupported.is_empty() {
        return Ok(());
    }

    let mut stderr = io::stderr().lock();
    emit_diagnostics(
        &lowered.diagnostics(),
        config.output.diagnostics,
        verbose,
        &mut stderr,
    )?;
    let summary = lowered
        .unsupported_summary()
        .into_iter()
        .map(|(kind, count)| format!("{} x{}", kind, count))
        .join(", ");
    writeln!(
        stderr,
        "{} {} placeholder(s): {}",
        style("note:").yellow().bold(),
        lowered.unsupported_count(),
        summary
    )?;

    if args.deny_unsupported {
        return Err(CliError::UnsupportedDenied {
            count: lowered.unsupported_count(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use boxel_core::mir::{Expr, Function, Stmt};
    use pretty_assertions::assert_eq;

    fn args(input: PathBuf) -> LowerArgs {
        LowerArgs {
            input,
            runtime: None,
            output: None,
            emit: EmitKind::Lir,
            deny_unsupported: false,
            module_name: None,
        }
    }

    #[test]
    fn reads_modules_from_json() {
        let mut function = Function::new("main", 1);
        let entry = function.add_block();
        function.push(entry, Stmt::Return(Expr::local(0)));
        let mut module = mir::Module::new();
        module.add_function(function);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.json");
        fs::write(&path, serde_json::to_string(&module).unwrap()).unwrap();

        assert_eq!(read_module(&path).unwrap(), module);
    }

    #[test]
    fn bad_json_is_invalid_input() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"functions\": [").unwrap();

        let err = read_module(&path).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput { path: p, .. } if p == path));
    }

    #[test]
    fn module_name_flag_overrides_config() {
        let mut config = CliConfig::default();
        config.lowering.module_name = "from-config".into();
        let mut lower_args = args(PathBuf::from("unused.json"));

        let lowered = lower_module(&mir::Module::new(), &lower_args, &config).unwrap();
        assert_eq!(lowered.program.name, "from-config");

        lower_args.module_name = Some("from-flag".into());
        let lowered = lower_module(&mir::Module::new(), &lower_args, &config).unwrap();
        assert_eq!(lowered.program.name, "from-flag");
    }
}
