//! Module and function drivers.

use std::collections::BTreeMap;

use boxel_core::diagnostics::Diagnostic;
use boxel_core::lir::{Linkage, LirFunction, LirProgram, LirValue};
use boxel_core::mir::{self, BlockId, FunctionId, StmtLocation};
use boxel_core::RuntimeDefinition;
use tracing::{debug, warn};

use crate::blocks::BlockMap;
use crate::builder::FunctionBuilder;
use crate::catalog::TypeCatalog;
use crate::error::{Error, Result};
use crate::options::IselOptions;
use crate::strings::StringTable;
use crate::symbols::SymbolNames;
use crate::temps::TempSlots;
use crate::unsupported::{Unsupported, UnsupportedKind};
use crate::{isel_ensure, IrTransform};

/// Lowers input modules against one runtime definition.
pub struct InstructionSelection {
    runtime: RuntimeDefinition,
    options: IselOptions,
}

/// The output of a lowering session.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredModule {
    pub program: LirProgram,
    /// Placeholders emitted in statement order.
    pub unsupported: Vec<Unsupported>,
}

impl LoweredModule {
    pub fn unsupported_count(&self) -> usize {
        self.unsupported.len()
    }

    pub fn count_of(&self, kind: UnsupportedKind) -> usize {
        self.unsupported.iter().filter(|u| u.kind == kind).count()
    }

    pub fn unsupported_summary(&self) -> BTreeMap<UnsupportedKind, usize> {
        let mut summary = BTreeMap::new();
        for unsupported in &self.unsupported {
            *summary.entry(unsupported.kind).or_insert(0) += 1;
        }
        summary
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.unsupported.iter().map(Diagnostic::from).collect()
    }
}

impl InstructionSelection {
    pub fn new(runtime: RuntimeDefinition, options: IselOptions) -> Self {
        Self { runtime, options }
    }

    /// Create an empty output module with the runtime linked in and its
    /// target types resolved.
    pub fn prepare(&self) -> Result<(LirProgram, TypeCatalog)> {
        let mut program = LirProgram::new(self.options.module_name.clone());
        self.runtime.link_into(&mut program)?;
        let catalog = TypeCatalog::resolve(&program, &self.options.runtime_names)?;
        Ok((program, catalog))
    }

    pub fn lower_module(&self, module: &mir::Module) -> Result<LoweredModule> {
        let (mut program, catalog) = self.prepare()?;
        debug!(
            module = %program.name,
            functions = module.functions.len(),
            "lowering module"
        );

        let mut session = Session::new(&catalog, &program, self.options.function_linkage());
        for (idx, function) in module.functions.iter().enumerate() {
            let lowered = session.lower_function(FunctionId::new(idx as u32), function)?;
            program.add_function(lowered);
        }

        let Session {
            strings,
            unsupported,
            ..
        } = session;
        debug!(
            strings = strings.len(),
            unsupported = unsupported.len(),
            "module lowered"
        );
        program.globals.extend(strings.into_globals());
        Ok(LoweredModule {
            program,
            unsupported,
        })
    }
}

impl IrTransform<&mir::Module, LoweredModule> for InstructionSelection {
    fn transform(&mut self, source: &mir::Module) -> Result<LoweredModule> {
        self.lower_module(source)
    }
}

/// State shared by every function of one module.
pub(crate) struct Session<'a> {
    pub(crate) catalog: &'a TypeCatalog,
    pub(crate) strings: StringTable,
    pub(crate) unsupported: Vec<Unsupported>,
    linkage: Linkage,
    symbols: SymbolNames,
}

impl<'a> Session<'a> {
    fn new(catalog: &'a TypeCatalog, program: &LirProgram, linkage: Linkage) -> Self {
        let symbols = program
            .externals
            .iter()
            .map(|external| external.name.as_str())
            .chain(program.functions.iter().map(|function| function.name.as_str()))
            .chain(program.globals.iter().map(|global| global.name.as_str()))
            .collect();
        Self {
            catalog,
            strings: StringTable::new(),
            unsupported: Vec::new(),
            linkage,
            symbols,
        }
    }

    /// Source name, or `anonymous.<index>`, made unique within the module.
    fn function_name(&mut self, id: FunctionId, function: &mir::Function) -> String {
        let base = match function.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("anonymous.{}", id.index()),
        };
        let name = self.symbols.claim(&base);
        if name != base {
            warn!(function = %base, renamed = %name, "function name already taken");
        }
        name
    }

    /// Pointer to the private global holding `text`.
    pub(crate) fn intern_string(&mut self, text: &str) -> LirValue {
        self.strings.intern(text, &mut self.symbols)
    }

    fn lower_function(&mut self, id: FunctionId, function: &mir::Function) -> Result<LirFunction> {
        let name = self.function_name(id, function);
        isel_ensure!(
            !function.basic_blocks.is_empty(),
            Error::EmptyFunction { function: name }
        );
        debug!(
            function = %name,
            blocks = function.basic_blocks.len(),
            temps = function.temp_count,
            "lowering function"
        );

        let catalog = self.catalog;
        let mut builder = FunctionBuilder::new(name.clone(), catalog.function.clone(), self.linkage);
        let context = builder.add_argument("ctx", catalog.context_ptr.clone());
        let mut lowering = FunctionLowering {
            session: self,
            function,
            builder,
            context,
            blocks: BlockMap::new(),
            temps: TempSlots::default(),
            location: StmtLocation {
                function: name,
                block: BlockId::new(0),
                statement: 0,
            },
        };
        lowering.run()?;
        Ok(lowering.builder.finish())
    }
}

/// Lowering context for a single function. Dropped when the function is done,
/// which discards its block and temporary maps.
pub(crate) struct FunctionLowering<'a, 'b> {
    pub(crate) session: &'b mut Session<'a>,
    pub(crate) function: &'b mir::Function,
    pub(crate) builder: FunctionBuilder,
    /// The function's single context-pointer argument.
    pub(crate) context: LirValue,
    pub(crate) blocks: BlockMap,
    pub(crate) temps: TempSlots,
    pub(crate) location: StmtLocation,
}

impl FunctionLowering<'_, '_> {
    fn run(&mut self) -> Result<()> {
        let catalog = self.session.catalog;
        let function = self.function;

        let entry = self.blocks.block_for(BlockId::new(0), &mut self.builder);
        self.builder.position_at_end(entry);
        self.temps = TempSlots::allocate(function.temp_count, &catalog.value, &mut self.builder)?;

        for (idx, block) in function.basic_blocks.iter().enumerate() {
            let id = BlockId::new(idx as u32);
            let output = self.blocks.block_for(id, &mut self.builder);
            self.builder.position_at_end(output);
            self.lower_block(id, block)?;
        }
        Ok(())
    }

    fn lower_block(&mut self, id: BlockId, block: &mir::BasicBlock) -> Result<()> {
        let mut terminated = false;
        let mut skipped = 0;
        for (idx, stmt) in block.statements.iter().enumerate() {
            if terminated {
                skipped += 1;
                continue;
            }
            self.location = StmtLocation {
                function: self.builder.name().to_string(),
                block: id,
                statement: idx,
            };
            self.lower_stmt(stmt)?;
            terminated = stmt.is_terminator();
        }

        if skipped > 0 {
            warn!(
                function = %self.builder.name(),
                block = %id,
                skipped,
                "skipping statements after terminator"
            );
        }
        if !terminated {
            warn!(
                function = %self.builder.name(),
                block = %id,
                "block has no terminator, leaving it unreachable"
            );
        }
        Ok(())
    }
}
