use std::fmt::{self, Formatter};

use itertools::Itertools;

use crate::pretty::{escape_string, PrettyCtx, PrettyPrintable};

use super::{BasicBlock, BlockId, Expr, Function, Module, Stmt, Temp, TempKind};

impl PrettyPrintable for Module {
    fn fmt_pretty(&self, f: &mut Formatter<'_>, ctx: &mut PrettyCtx<'_>) -> fmt::Result {
        ctx.writeln(f, "mir::Module {")?;
        ctx.with_indent(|ctx| {
            for (idx, function) in self.functions.iter().enumerate() {
                write_function(idx, function, f, ctx)?;
                if idx + 1 < self.functions.len() {
                    writeln!(f)?;
                }
            }
            Ok(())
        })?;
        ctx.writeln(f, "}")
    }
}

fn write_function(
    idx: usize,
    function: &Function,
    f: &mut Formatter<'_>,
    ctx: &mut PrettyCtx<'_>,
) -> fmt::Result {
    let name = function.name.as_deref().unwrap_or("<anonymous>");
    ctx.writeln(
        f,
        format!("fn#{} {} {{ temps: {} }} {{", idx, name, function.temp_count),
    )?;
    ctx.with_indent(|ctx| {
        for (block_idx, block) in function.basic_blocks.iter().enumerate() {
            write_block(BlockId(block_idx as u32), block, f, ctx)?;
        }
        Ok(())
    })?;
    ctx.writeln(f, "}")
}

fn write_block(
    id: BlockId,
    block: &BasicBlock,
    f: &mut Formatter<'_>,
    ctx: &mut PrettyCtx<'_>,
) -> fmt::Result {
    ctx.writeln(f, format!("{}:", id))?;
    ctx.with_indent(|ctx| {
        for stmt in &block.statements {
            ctx.writeln(f, stmt.to_string())?;
        }
        Ok(())
    })
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Stmt::Eval(expr) => write!(f, "eval {}", expr),
            Stmt::Assign { target, source } => write!(f, "{} = {}", target, source),
            Stmt::Jump(target) => write!(f, "jump {}", target),
            Stmt::CondJump {
                cond,
                if_true,
                if_false,
            } => write!(f, "cjump {}, {}, {}", cond, if_true, if_false),
            Stmt::Return(expr) => write!(f, "ret {}", expr),
            Stmt::Enter(expr) => write!(f, "enter {}", expr),
            Stmt::Leave => write!(f, "leave"),
        }
    }
}

impl fmt::Display for Temp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.kind() {
            TempKind::Local(index) => write!(f, "t{}", index),
            TempKind::Argument(number) => write!(f, "arg{}", number),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Constant(value) => write!(f, "{:?}", value),
            Expr::StringLiteral(text) => write!(f, "\"{}\"", escape_string(text)),
            Expr::Temporary(temp) => write!(f, "{}", temp),
            Expr::Name(name) => write!(f, "{}", name),
            Expr::Closure(function) => write!(f, "closure {}", function),
            Expr::UnaryOp(op, operand) => write!(f, "{}({})", op.symbol(), operand),
            Expr::BinaryOp(op, left, right) => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            Expr::Call { callee, args } => write!(f, "call {}({})", callee, args.iter().join(", ")),
            Expr::New { callee, args } => write!(f, "new {}({})", callee, args.iter().join(", ")),
            Expr::Subscript { base, index } => write!(f, "{}[{}]", base, index),
            Expr::Member { base, name } => write!(f, "{}.{}", base, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mir::BinaryOp;
    use crate::pretty::{pretty, PrettyOptions};
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_module_outline() {
        let mut module = Module::new();
        let mut function = Function::new("main", 1);
        let b0 = function.add_block();
        let b1 = function.add_block();
        function.push(
            b0,
            Stmt::Assign {
                target: Expr::local(0),
                source: Expr::binary(BinaryOp::Add, Expr::argument(0), Expr::constant(1.0)),
            },
        );
        function.push(b0, Stmt::Jump(b1));
        function.push(
            b1,
            Stmt::Eval(Expr::call(
                Expr::member(Expr::name("console"), "log"),
                vec![Expr::string("hi\n"), Expr::local(0)],
            )),
        );
        function.push(b1, Stmt::Return(Expr::local(0)));
        module.add_function(function);

        let text = pretty(&module, PrettyOptions::default()).to_string();
        let expected = [
            "mir::Module {",
            "    fn#0 main { temps: 1 } {",
            "        L0:",
            "            t0 = (arg0 + 1.0)",
            "            jump L1",
            "        L1:",
            "            eval call console.log(\"hi\\n\", t0)",
            "            ret t0",
            "    }",
            "}",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }
}
