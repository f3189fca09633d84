//! Textual type references used by runtime definitions.
//!
//! ```text
//! ty := i1 | i8 | i32 | i64 | f64 | void | ptr <ty> | [<n> x <ty>] | %<name>
//! ```

use crate::lir::Ty;

/// Parse a type reference. Named references become [`Ty::named`].
pub fn parse_type_ref(text: &str) -> Result<Ty, String> {
    let text = text.trim();
    if text.is_empty() {
        return Err("empty type reference".to_string());
    }
    if let Some(rest) = text.strip_prefix("ptr ") {
        return parse_type_ref(rest).map(|inner| Ty::Ptr(Box::new(inner)));
    }
    if let Some(body) = text.strip_prefix('[') {
        let body = body
            .strip_suffix(']')
            .ok_or_else(|| format!("unterminated array type `{}`", text))?;
        let (count, element) = body
            .split_once(" x ")
            .ok_or_else(|| format!("array type `{}` is missing ` x `", text))?;
        let count = count
            .trim()
            .parse::<u64>()
            .map_err(|_| format!("invalid array length in `{}`", text))?;
        return parse_type_ref(element).map(|inner| Ty::Array(Box::new(inner), count));
    }
    if let Some(name) = text.strip_prefix('%') {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(format!("invalid type name `{}`", text));
        }
        return Ok(Ty::named(name));
    }
    match text {
        "i1" => Ok(Ty::I1),
        "i8" => Ok(Ty::I8),
        "i32" => Ok(Ty::I32),
        "i64" => Ok(Ty::I64),
        "f64" => Ok(Ty::F64),
        "void" => Ok(Ty::Void),
        other => Err(format!("unknown type `{}`", other)),
    }
}

/// Names of all type definitions `ty` mentions, in order of appearance.
pub fn referenced_names(ty: &Ty) -> Vec<&str> {
    let mut out = Vec::new();
    collect_names(ty, &mut out, true);
    out
}

/// Names `ty` contains by value (not behind a pointer).
pub fn by_value_names(ty: &Ty) -> Vec<&str> {
    let mut out = Vec::new();
    collect_names(ty, &mut out, false);
    out
}

fn collect_names<'a>(ty: &'a Ty, out: &mut Vec<&'a str>, through_pointers: bool) {
    match ty {
        Ty::Ptr(inner) => {
            if through_pointers {
                collect_names(inner, out, through_pointers);
            }
        }
        Ty::Array(inner, _) => collect_names(inner, out, through_pointers),
        Ty::Struct { fields, name, .. } => {
            if let Some(name) = name {
                out.push(name);
            }
            for field in fields {
                collect_names(field, out, through_pointers);
            }
        }
        Ty::Function {
            return_type,
            param_types,
            ..
        } => {
            collect_names(return_type, out, through_pointers);
            for param in param_types {
                collect_names(param, out, through_pointers);
            }
        }
        Ty::I1 | Ty::I8 | Ty::I32 | Ty::I64 | Ty::F64 | Ty::Void => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_references() {
        assert_eq!(
            parse_type_ref("ptr [4 x %struct.vm.Value]"),
            Ok(Ty::Ptr(Box::new(Ty::Array(
                Box::new(Ty::named("struct.vm.Value")),
                4
            ))))
        );
        assert_eq!(parse_type_ref(" ptr ptr i8 "), Ok(Ty::I8.ptr_to().ptr_to()));
    }

    #[test]
    fn rejects_malformed_references() {
        assert!(parse_type_ref("").is_err());
        assert!(parse_type_ref("u32").is_err());
        assert!(parse_type_ref("[x x i8]").is_err());
        assert!(parse_type_ref("[4 i8]").is_err());
        assert!(parse_type_ref("%").is_err());
    }

    #[test]
    fn pointers_hide_by_value_names() {
        let ty = Ty::Struct {
            fields: vec![Ty::named("a").ptr_to(), Ty::Array(Box::new(Ty::named("b")), 2)],
            packed: false,
            name: None,
        };
        assert_eq!(referenced_names(&ty), vec!["a", "b"]);
        assert_eq!(by_value_names(&ty), vec!["b"]);
    }
}
