//! Target types and runtime helpers resolved once per lowering session.

use boxel_core::lir::{LirFunctionSignature, LirProgram, LirValue, Ty};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Names looked up in the linked runtime definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeNames {
    pub value_type: String,
    pub context_type: String,
    pub string_type: String,
    pub get_argument: String,
    pub init_number: String,
    pub init_string: String,
    #[serde(rename = "return")]
    pub return_value: String,
    pub binary_op: String,
    pub unary_op: String,
    pub get_name: String,
    pub get_member: String,
    pub get_element: String,
}

impl Default for RuntimeNames {
    fn default() -> Self {
        Self {
            value_type: "struct.vm.Value".into(),
            context_type: "struct.vm.Context".into(),
            string_type: "struct.vm.String".into(),
            get_argument: "__boxel_get_argument".into(),
            init_number: "__boxel_init_number".into(),
            init_string: "__boxel_init_string".into(),
            return_value: "__boxel_return".into(),
            binary_op: "__boxel_binary_op".into(),
            unary_op: "__boxel_unary_op".into(),
            get_name: "__boxel_get_name".into(),
            get_member: "__boxel_get_member".into(),
            get_element: "__boxel_get_element".into(),
        }
    }
}

/// A declared runtime helper together with its checked signature.
#[derive(Debug, Clone, PartialEq)]
pub struct HelperRef {
    pub name: String,
    pub signature: LirFunctionSignature,
}

impl HelperRef {
    pub fn callee(&self) -> LirValue {
        LirValue::Function(self.name.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeCatalog {
    pub number: Ty,
    pub value: Ty,
    pub context_ptr: Ty,
    pub string_ptr: Ty,
    /// Signature shared by every lowered function.
    pub function: LirFunctionSignature,

    pub get_argument: HelperRef,
    pub init_number: HelperRef,
    pub init_string: HelperRef,
    pub return_value: HelperRef,

    pub binary_op: Option<HelperRef>,
    pub unary_op: Option<HelperRef>,
    pub get_name: Option<HelperRef>,
    pub get_member: Option<HelperRef>,
    pub get_element: Option<HelperRef>,
}

impl TypeCatalog {
    pub fn resolve(program: &LirProgram, names: &RuntimeNames) -> Result<Self> {
        let number = Ty::F64;
        let value = named_type(program, &names.value_type)?;
        let context_ptr = named_type(program, &names.context_type)?.ptr_to();
        let string_ptr = named_type(program, &names.string_type)?.ptr_to();
        let value_ptr = value.ptr_to();
        let bytes = Ty::I8.ptr_to();
        let sig = LirFunctionSignature::new;

        let catalog = Self {
            function: sig(vec![context_ptr.clone()], Ty::Void),
            get_argument: required_helper(
                program,
                &names.get_argument,
                sig(vec![context_ptr.clone(), Ty::I32], value.clone()),
            )?,
            init_number: required_helper(
                program,
                &names.init_number,
                sig(vec![value_ptr.clone(), number.clone()], Ty::Void),
            )?,
            init_string: required_helper(
                program,
                &names.init_string,
                sig(
                    vec![context_ptr.clone(), value_ptr.clone(), bytes.clone()],
                    Ty::Void,
                ),
            )?,
            return_value: required_helper(
                program,
                &names.return_value,
                sig(vec![context_ptr.clone(), value.clone()], Ty::Void),
            )?,
            binary_op: optional_helper(
                program,
                &names.binary_op,
                sig(
                    vec![
                        context_ptr.clone(),
                        value_ptr.clone(),
                        Ty::I32,
                        value.clone(),
                        value.clone(),
                    ],
                    Ty::Void,
                ),
            )?,
            unary_op: optional_helper(
                program,
                &names.unary_op,
                sig(
                    vec![context_ptr.clone(), value_ptr.clone(), Ty::I32, value.clone()],
                    Ty::Void,
                ),
            )?,
            get_name: optional_helper(
                program,
                &names.get_name,
                sig(
                    vec![context_ptr.clone(), value_ptr.clone(), bytes.clone()],
                    Ty::Void,
                ),
            )?,
            get_member: optional_helper(
                program,
                &names.get_member,
                sig(
                    vec![context_ptr.clone(), value_ptr.clone(), value.clone(), bytes],
                    Ty::Void,
                ),
            )?,
            get_element: optional_helper(
                program,
                &names.get_element,
                sig(
                    vec![context_ptr.clone(), value_ptr, value.clone(), value.clone()],
                    Ty::Void,
                ),
            )?,
            number,
            value,
            context_ptr,
            string_ptr,
        };

        debug!(
            value = %catalog.value,
            optional = catalog.available_optional_helpers().count(),
            "resolved type catalog"
        );
        Ok(catalog)
    }

    /// Optional dispatch helpers keyed by role, `None` where the runtime lacks one.
    pub fn optional_helpers(&self) -> [(&'static str, Option<&HelperRef>); 5] {
        [
            ("binary_op", self.binary_op.as_ref()),
            ("unary_op", self.unary_op.as_ref()),
            ("get_name", self.get_name.as_ref()),
            ("get_member", self.get_member.as_ref()),
            ("get_element", self.get_element.as_ref()),
        ]
    }

    fn available_optional_helpers(&self) -> impl Iterator<Item = &HelperRef> {
        [
            &self.binary_op,
            &self.unary_op,
            &self.get_name,
            &self.get_member,
            &self.get_element,
        ]
        .into_iter()
        .flatten()
    }
}

fn named_type(program: &LirProgram, name: &str) -> Result<Ty> {
    match program.type_definition(name) {
        Some(_) => Ok(Ty::named(name)),
        None => Err(Error::MissingRuntimeType {
            name: name.to_string(),
        }),
    }
}

fn required_helper(
    program: &LirProgram,
    name: &str,
    expected: LirFunctionSignature,
) -> Result<HelperRef> {
    optional_helper(program, name, expected)?.ok_or_else(|| Error::MissingRuntimeHelper {
        name: name.to_string(),
    })
}

fn optional_helper(
    program: &LirProgram,
    name: &str,
    expected: LirFunctionSignature,
) -> Result<Option<HelperRef>> {
    let Some(external) = program.external(name) else {
        return Ok(None);
    };
    if external.signature != expected {
        return Err(Error::HelperSignature {
            name: name.to_string(),
            expected: expected.to_string(),
            found: external.signature.to_string(),
        });
    }
    Ok(Some(HelperRef {
        name: name.to_string(),
        signature: expected,
    }))
}
