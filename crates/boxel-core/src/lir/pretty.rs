//! Textual dump of a `LirProgram`, used by `boxel lower` and in tests.

use std::fmt::{self, Display, Formatter};

use itertools::Itertools;

use crate::pretty::{escape_string, PrettyCtx, PrettyPrintable};

use super::ty::Ty;
use super::{
    LirBasicBlock, LirConstant, LirExternal, LirFunction, LirGlobal, LirInstruction,
    LirInstructionKind, LirProgram, LirTerminator, LirTypeDefinition, LirValue,
};

impl PrettyPrintable for LirProgram {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
        ctx.writeln(f, format!("lir::Program {} {{", self.name))?;
        ctx.with_indent(|ctx| {
            section(f, ctx, "types", &self.type_definitions, |f, ctx, def| {
                ctx.writeln(f, type_definition_line(def))
            })?;
            section(f, ctx, "externals", &self.externals, |f, ctx, ext| {
                ctx.writeln(f, external_line(ext))
            })?;
            section(f, ctx, "globals", &self.globals, |f, ctx, global| {
                ctx.writeln(f, global_line(global))
            })?;
            for (idx, func) in self.functions.iter().enumerate() {
                if idx == 0 {
                    ctx.writeln(f, "functions:")?;
                } else {
                    writeln!(f)?;
                }
                ctx.with_indent(|ctx| write_function(func, f, ctx))?;
            }
            Ok(())
        })?;
        ctx.writeln(f, "}")
    }
}

/// `name:` followed by one indented entry per item; nothing when `items` is empty.
fn section<T>(
    f: &mut Formatter<'_>,
    ctx: &mut PrettyCtx<'_>,
    name: &str,
    items: &[T],
    mut entry: impl FnMut(&mut Formatter<'_>, &mut PrettyCtx<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    ctx.writeln(f, format!("{name}:"))?;
    ctx.with_indent(|ctx| items.iter().try_for_each(|item| entry(f, ctx, item)))
}

fn type_definition_line(def: &LirTypeDefinition) -> String {
    let body = match &def.ty {
        Ty::Struct { fields, .. } if fields.is_empty() => "opaque".to_string(),
        Ty::Struct { fields, packed: true, .. } => format!("<{{ {} }}>", fields.iter().join(", ")),
        Ty::Struct { fields, .. } => format!("{{ {} }}", fields.iter().join(", ")),
        other => other.to_string(),
    };
    format!("%{} = {}", def.name, body)
}

fn external_line(external: &LirExternal) -> String {
    format!(
        "declare @{}({}) -> {}",
        external.name,
        external.signature.params.iter().join(", "),
        external.signature.return_type
    )
}

fn global_line(global: &LirGlobal) -> String {
    let constness = if global.is_constant { " const" } else { "" };
    let init = global
        .initializer
        .as_ref()
        .map(|value| format!(" = {value}"))
        .unwrap_or_default();
    format!(
        "@{}: {} [linkage: {}]{constness}{init}",
        global.name, global.ty, global.linkage
    )
}

fn write_function(func: &LirFunction, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
    let params = func
        .signature
        .params
        .iter()
        .enumerate()
        .map(|(idx, ty)| format!("arg{idx}: {ty}"))
        .join(", ");
    ctx.writeln(
        f,
        format!(
            "fn {}({params}) -> {} [linkage: {}] {{",
            func.name, func.signature.return_type, func.linkage
        ),
    )?;
    ctx.with_indent(|ctx| {
        section(f, ctx, "locals", &func.locals, |f, ctx, local| {
            let name = local
                .name
                .as_ref()
                .map(|name| format!(" // name: {name}"))
                .unwrap_or_default();
            let arg = if local.is_argument { " // arg" } else { "" };
            ctx.writeln(f, format!("%local{}: {}{name}{arg}", local.id, local.ty))
        })?;
        func.basic_blocks
            .iter()
            .try_for_each(|block| write_block(block, f, ctx))
    })?;
    ctx.writeln(f, "}")
}

fn block_list(ids: &[u32]) -> String {
    ids.iter().map(|id| format!("bb{id}")).join(", ")
}

fn write_block(block: &LirBasicBlock, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
    let mut header = format!("bb{}", block.id);
    if let Some(label) = &block.label {
        header += &format!(" // label: {label}");
    }
    if !block.predecessors.is_empty() {
        header += &format!(" // preds: [{}]", block_list(&block.predecessors));
    }
    if !block.successors.is_empty() {
        header += &format!(" // succs: [{}]", block_list(&block.successors));
    }
    ctx.writeln(f, header + ":")?;
    ctx.with_indent(|ctx| {
        let show_types = ctx.options.show_types;
        for inst in &block.instructions {
            let ty = match &inst.type_hint {
                Some(ty) if show_types => format!(" : {ty}"),
                _ => String::new(),
            };
            ctx.writeln(f, format!("i{}: {}{ty}", inst.id, instruction_text(inst)))?;
        }
        ctx.writeln(f, format!("terminator: {}", block.terminator))
    })
}

fn instruction_text(inst: &LirInstruction) -> String {
    let result = format!("%r{} = ", inst.id);
    match &inst.kind {
        LirInstructionKind::Alloca { ty } => format!("{result}alloca {ty}"),
        LirInstructionKind::Load { address } => format!("{result}load {address}"),
        LirInstructionKind::Store { value, address } => format!("store {value}, {address}"),
        LirInstructionKind::Call { function, args } => {
            let produces_value = inst.type_hint.as_ref().is_some_and(|ty| !ty.is_void());
            format!(
                "{}call {function}({})",
                if produces_value { result.as_str() } else { "" },
                args.iter().join(", ")
            )
        }
    }
}

impl Display for LirTerminator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LirTerminator::Return(None) => f.write_str("ret void"),
            LirTerminator::Return(Some(value)) => write!(f, "ret {value}"),
            LirTerminator::Br(target) => write!(f, "br bb{target}"),
            LirTerminator::CondBr {
                condition,
                if_true,
                if_false,
            } => write!(f, "cond_br {condition}, bb{if_true}, bb{if_false}"),
            LirTerminator::Unreachable => f.write_str("unreachable"),
        }
    }
}

impl Display for LirValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LirValue::Register(id) => write!(f, "%r{id}"),
            LirValue::Constant(constant) => constant.fmt(f),
            LirValue::Global(name, _) | LirValue::Function(name) => write!(f, "@{name}"),
            LirValue::Local(id) => write!(f, "%local{id}"),
        }
    }
}

impl Display for LirConstant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LirConstant::Int(value, ty) => write!(f, "{ty} {value}"),
            LirConstant::Float(value, ty) => write!(f, "{ty} {value:?}"),
            LirConstant::Bool(value) => write!(f, "i1 {value}"),
            LirConstant::String(text) => write!(f, "c\"{}\\00\"", escape_string(text)),
            LirConstant::ZeroInit(ty) => write!(f, "{ty} zeroinitializer"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lir::{Linkage, LirFunctionSignature, LirLocal};
    use crate::pretty::{pretty, PrettyOptions};
    use pretty_assertions::assert_eq;

    fn sample_program() -> LirProgram {
        let value = Ty::named("struct.vm.Value");
        let context = Ty::named("struct.vm.Context");
        let mut program = LirProgram::default();
        program.add_type_definition(LirTypeDefinition {
            name: "struct.vm.Value".into(),
            ty: Ty::Struct {
                fields: vec![Ty::I32, Ty::F64],
                packed: false,
                name: Some("struct.vm.Value".into()),
            },
        });
        program.add_type_definition(LirTypeDefinition {
            name: "struct.vm.Context".into(),
            ty: Ty::named("struct.vm.Context"),
        });
        program.add_external(LirExternal {
            name: "__boxel_return".into(),
            signature: LirFunctionSignature::new(vec![context.ptr_to(), value.clone()], Ty::Void),
        });
        program.add_global(LirGlobal {
            name: ".str".into(),
            ty: Ty::Array(Box::new(Ty::I8), 3),
            initializer: Some(LirConstant::String("hi".into())),
            linkage: Linkage::Private,
            is_constant: true,
        });

        let mut func = LirFunction::new(
            "main",
            LirFunctionSignature::new(vec![context.ptr_to()], Ty::Void),
            Linkage::External,
        );
        func.locals.push(LirLocal {
            id: 0,
            ty: context.ptr_to(),
            name: Some("ctx".into()),
            is_argument: true,
        });
        let mut block = LirBasicBlock::new(0, Some("L0".into()));
        block.add_instruction(
            LirInstruction::new(0, LirInstructionKind::Alloca { ty: value.clone() })
                .with_type(value.ptr_to()),
        );
        block.add_instruction(LirInstruction::new(
            1,
            LirInstructionKind::Store {
                value: LirValue::Constant(LirConstant::ZeroInit(value.clone())),
                address: LirValue::Register(0),
            },
        ));
        block.add_instruction(
            LirInstruction::new(
                2,
                LirInstructionKind::Load {
                    address: LirValue::Register(0),
                },
            )
            .with_type(value.clone()),
        );
        block.add_instruction(
            LirInstruction::new(
                3,
                LirInstructionKind::Call {
                    function: LirValue::Function("__boxel_return".into()),
                    args: vec![LirValue::Local(0), LirValue::Register(2)],
                },
            )
            .with_type(Ty::Void),
        );
        block.set_terminator(LirTerminator::Return(None));
        func.add_basic_block(block);
        program.add_function(func);
        program
    }

    #[test]
    fn renders_program() {
        let text = pretty(&sample_program(), PrettyOptions::default()).to_string();
        let expected = [
            "lir::Program a.out {",
            "    types:",
            "        %struct.vm.Value = { i32, f64 }",
            "        %struct.vm.Context = opaque",
            "    externals:",
            "        declare @__boxel_return(ptr %struct.vm.Context, %struct.vm.Value) -> void",
            "    globals:",
            "        @.str: [3 x i8] [linkage: private] const = c\"hi\\00\"",
            "    functions:",
            "        fn main(arg0: ptr %struct.vm.Context) -> void [linkage: external] {",
            "            locals:",
            "                %local0: ptr %struct.vm.Context // name: ctx // arg",
            "            bb0 // label: L0:",
            "                i0: %r0 = alloca %struct.vm.Value : ptr %struct.vm.Value",
            "                i1: store %struct.vm.Value zeroinitializer, %r0",
            "                i2: %r2 = load %r0 : %struct.vm.Value",
            "                i3: call @__boxel_return(%local0, %r2) : void",
            "                terminator: ret void",
            "        }",
            "}",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn hides_types_when_disabled() {
        let options = PrettyOptions {
            show_types: false,
            ..PrettyOptions::default()
        };
        let text = pretty(&sample_program(), options).to_string();
        assert!(text.contains("i0: %r0 = alloca %struct.vm.Value\n"));
        assert!(!text.contains(" : ptr"));
    }
}
