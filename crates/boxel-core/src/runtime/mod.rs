//! Precompiled runtime definitions: the boxed-value types and helper
//! declarations that lowered code links against.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::lir::{LirExternal, LirFunctionSignature, LirProgram, LirTypeDefinition, Ty};

mod type_ref;

pub use type_ref::{by_value_names, parse_type_ref, referenced_names};

/// Label used in errors for the definition compiled into this crate.
pub const BUNDLED_RUNTIME_PATH: &str = "<bundled>/boxel_runtime.json";

const BUNDLED_RUNTIME: &str = include_str!("../../../../runtime/boxel_runtime.json");

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub types: Vec<RuntimeType>,
    #[serde(default)]
    pub functions: Vec<RuntimeFunction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeType {
    pub name: String,
    /// `None` declares an opaque type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub packed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeFunction {
    pub name: String,
    #[serde(default)]
    pub params: Vec<String>,
    #[serde(default = "void_ref")]
    pub ret: String,
}

fn void_ref() -> String {
    "void".to_string()
}

fn link_error(symbol: &str, reason: impl Into<String>) -> Error {
    Error::RuntimeLink {
        symbol: symbol.to_string(),
        reason: reason.into(),
    }
}

impl RuntimeDefinition {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::RuntimeUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Parse a definition; `origin` only labels errors.
    pub fn from_json(text: &str, origin: impl AsRef<Path>) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| Error::RuntimeMalformed {
            path: origin.as_ref().to_path_buf(),
            message: err.to_string(),
        })
    }

    /// The runtime definition shipped with boxel.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_RUNTIME, BUNDLED_RUNTIME_PATH)
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed runtime>")
    }

    /// Add the definition's types and helper declarations to `program`.
    ///
    /// Everything is validated before `program` is touched, so a failed link
    /// leaves it unchanged. Symbols already present with an identical shape
    /// are skipped.
    pub fn link_into(&self, program: &mut LirProgram) -> Result<()> {
        let types = self.resolve_types(program)?;
        check_by_value_cycles(program, &types)?;
        let externals = self.resolve_functions(program, &types)?;

        let mut new_types = Vec::new();
        for def in types {
            match program.type_definition(&def.name) {
                Some(existing) if existing.ty == def.ty => {}
                Some(existing) => {
                    return Err(link_error(
                        &def.name,
                        format!(
                            "conflicts with existing definition `{}`",
                            describe_body(&existing.ty)
                        ),
                    ))
                }
                None => new_types.push(def),
            }
        }

        let mut new_externals = Vec::new();
        for external in externals {
            if program.function(&external.name).is_some() {
                return Err(link_error(
                    &external.name,
                    "conflicts with a function defined in the module",
                ));
            }
            match program.external(&external.name) {
                Some(existing) if existing.signature == external.signature => {}
                Some(existing) => {
                    return Err(link_error(
                        &external.name,
                        format!("conflicts with existing declaration `{}`", existing.signature),
                    ))
                }
                None => new_externals.push(external),
            }
        }

        debug!(
            runtime = self.display_name(),
            types = new_types.len(),
            helpers = new_externals.len(),
            "linking runtime definition"
        );
        for def in new_types {
            program.add_type_definition(def);
        }
        for external in new_externals {
            program.add_external(external);
        }
        Ok(())
    }

    fn resolve_types(&self, program: &LirProgram) -> Result<Vec<LirTypeDefinition>> {
        let mut seen = HashSet::new();
        for ty in &self.types {
            if !seen.insert(ty.name.as_str()) {
                return Err(link_error(
                    &ty.name,
                    "type is defined more than once in the runtime definition",
                ));
            }
        }

        let mut out = Vec::with_capacity(self.types.len());
        for ty in &self.types {
            let fields = match &ty.fields {
                None => Vec::new(),
                Some(fields) => fields
                    .iter()
                    .map(|field| parse_type_ref(field).map_err(|reason| link_error(&ty.name, reason)))
                    .collect::<Result<Vec<_>>>()?,
            };
            let body = Ty::Struct {
                fields,
                packed: ty.packed,
                name: Some(ty.name.clone()),
            };
            check_known(&ty.name, &body, &seen, program)?;
            out.push(LirTypeDefinition {
                name: ty.name.clone(),
                ty: body,
            });
        }
        Ok(out)
    }

    fn resolve_functions(
        &self,
        program: &LirProgram,
        types: &[LirTypeDefinition],
    ) -> Result<Vec<LirExternal>> {
        let known: HashSet<&str> = types.iter().map(|def| def.name.as_str()).collect();
        let mut seen = HashSet::new();
        let mut out = Vec::with_capacity(self.functions.len());
        for function in &self.functions {
            if !seen.insert(function.name.as_str()) {
                return Err(link_error(
                    &function.name,
                    "helper is declared more than once in the runtime definition",
                ));
            }
            let params = function
                .params
                .iter()
                .map(|param| {
                    parse_type_ref(param).map_err(|reason| link_error(&function.name, reason))
                })
                .collect::<Result<Vec<_>>>()?;
            let return_type =
                parse_type_ref(&function.ret).map_err(|reason| link_error(&function.name, reason))?;
            let signature = LirFunctionSignature::new(params, return_type);
            check_known(&function.name, &signature.ty(), &known, program)?;
            out.push(LirExternal {
                name: function.name.clone(),
                signature,
            });
        }
        Ok(out)
    }
}

fn check_known(
    symbol: &str,
    ty: &Ty,
    known: &HashSet<&str>,
    program: &LirProgram,
) -> Result<()> {
    for name in referenced_names(ty) {
        if !known.contains(name) && program.type_definition(name).is_none() {
            return Err(link_error(symbol, format!("unknown type `%{}`", name)));
        }
    }
    Ok(())
}

fn describe_body(ty: &Ty) -> String {
    match ty {
        Ty::Struct { fields, .. } if fields.is_empty() => "opaque".to_string(),
        Ty::Struct { fields, .. } => {
            let fields: Vec<String> = fields.iter().map(|field| field.to_string()).collect();
            format!("{{ {} }}", fields.join(", "))
        }
        other => other.to_string(),
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

fn check_by_value_cycles(program: &LirProgram, defs: &[LirTypeDefinition]) -> Result<()> {
    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for def in program.type_definitions.iter().chain(defs) {
        let targets = edges.entry(def.name.as_str()).or_default();
        if let Ty::Struct { fields, .. } = &def.ty {
            for field in fields {
                targets.extend(by_value_names(field));
            }
        }
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    for def in defs {
        if let Some(name) = visit(def.name.as_str(), &edges, &mut marks) {
            return Err(link_error(name, "type contains itself by value"));
        }
    }
    Ok(())
}

fn visit<'a>(
    name: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    marks: &mut HashMap<&'a str, Mark>,
) -> Option<&'a str> {
    match marks.get(name) {
        Some(Mark::Done) => return None,
        Some(Mark::Visiting) => return Some(name),
        None => {}
    }
    marks.insert(name, Mark::Visiting);
    for next in edges.get(name).into_iter().flatten() {
        if let Some(cycle) = visit(next, edges, marks) {
            return Some(cycle);
        }
    }
    marks.insert(name, Mark::Done);
    None
}
