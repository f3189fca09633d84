use std::fmt::{self, Formatter};

use itertools::Itertools;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ty {
    I1,
    I8,
    I32,
    I64,
    F64,
    Ptr(Box<Ty>),
    Array(Box<Ty>, u64),
    /// A named struct with no fields refers to the type definition of that
    /// name; bodies live in `LirProgram::type_definitions`.
    Struct {
        fields: Vec<Ty>,
        packed: bool,
        name: Option<String>,
    },
    Function {
        return_type: Box<Ty>,
        param_types: Vec<Ty>,
        is_variadic: bool,
    },
    Void,
}

impl Ty {
    /// Reference to the named type definition `name`.
    pub fn named(name: impl Into<String>) -> Self {
        Ty::Struct {
            fields: Vec::new(),
            packed: false,
            name: Some(name.into()),
        }
    }

    pub fn ptr_to(&self) -> Ty {
        Ty::Ptr(Box::new(self.clone()))
    }

    pub fn pointee(&self) -> Option<&Ty> {
        match self {
            Ty::Ptr(inner) => Some(inner),
            _ => None,
        }
    }

    pub fn function(return_type: Ty, param_types: Vec<Ty>) -> Self {
        Ty::Function {
            return_type: Box::new(return_type),
            param_types,
            is_variadic: false,
        }
    }

    pub fn struct_name(&self) -> Option<&str> {
        match self {
            Ty::Struct { name, .. } => name.as_deref(),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        matches!(self, Ty::Ptr(_))
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Ty::I1)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Ty::I1 => write!(f, "i1"),
            Ty::I8 => write!(f, "i8"),
            Ty::I32 => write!(f, "i32"),
            Ty::I64 => write!(f, "i64"),
            Ty::F64 => write!(f, "f64"),
            Ty::Void => write!(f, "void"),
            Ty::Ptr(inner) => write!(f, "ptr {}", inner),
            Ty::Array(inner, count) => write!(f, "[{} x {}]", count, inner),
            Ty::Struct {
                fields,
                packed,
                name,
            } => match name {
                Some(name) => write!(f, "%{}", name),
                None if *packed => write!(f, "<{{ {} }}>", fields.iter().join(", ")),
                None => write!(f, "{{ {} }}", fields.iter().join(", ")),
            },
            Ty::Function {
                return_type,
                param_types,
                is_variadic,
            } => {
                let mut params = param_types.iter().map(|ty| ty.to_string()).collect_vec();
                if *is_variadic {
                    params.push("...".into());
                }
                write!(f, "fn({}) -> {}", params.join(", "), return_type)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_textual_syntax() {
        let value = Ty::named("struct.vm.Value");
        assert_eq!(value.ptr_to().to_string(), "ptr %struct.vm.Value");
        assert_eq!(Ty::Array(Box::new(Ty::I8), 6).to_string(), "[6 x i8]");
        assert_eq!(
            Ty::function(Ty::Void, vec![Ty::named("ctx").ptr_to(), Ty::I32]).to_string(),
            "fn(ptr %ctx, i32) -> void"
        );
        let anonymous = Ty::Struct {
            fields: vec![Ty::I32, Ty::F64],
            packed: true,
            name: None,
        };
        assert_eq!(anonymous.to_string(), "<{ i32, f64 }>");
    }

    #[test]
    fn pointee_unwraps_one_level() {
        let ptr = Ty::F64.ptr_to().ptr_to();
        assert_eq!(ptr.pointee(), Some(&Ty::Ptr(Box::new(Ty::F64))));
        assert_eq!(Ty::F64.pointee(), None);
    }
}
