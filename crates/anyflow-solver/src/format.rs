//! Rendering types as TypeScript-like strings for diagnostics.

use crate::db::TypeDatabase;
use crate::types::*;
use anyflow_common::limits::MAX_FORMAT_DEPTH;

/// Formats types for diagnostic messages.
///
/// Deferred definitions print by name and are never expanded, so cyclic
/// types render finitely.
pub struct TypeFormatter<'a, D: TypeDatabase + ?Sized> {
    db: &'a D,
    depth: u32,
}

impl<'a, D: TypeDatabase + ?Sized> TypeFormatter<'a, D> {
    pub fn new(db: &'a D) -> Self {
        TypeFormatter { db, depth: 0 }
    }

    pub fn format(&mut self, id: TypeId) -> String {
        if self.depth >= MAX_FORMAT_DEPTH {
            return "...".to_string();
        }
        self.depth += 1;
        let text = self.format_inner(id);
        self.depth -= 1;
        text
    }

    fn format_inner(&mut self, id: TypeId) -> String {
        if id.is_none() {
            return "<none>".to_string();
        }
        let Some(data) = self.db.lookup(id) else {
            return "<unresolved>".to_string();
        };

        match data {
            TypeData::Intrinsic(kind) => kind.name().to_string(),
            TypeData::Literal(LiteralValue::String(atom)) => {
                format!("\"{}\"", self.db.resolve_atom(atom))
            }
            TypeData::Literal(LiteralValue::Number(value)) => value.0.to_string(),
            TypeData::Literal(LiteralValue::Boolean(value)) => value.to_string(),
            TypeData::Array(element) => {
                let inner = self.format(element);
                if self.needs_parens_in_array(element) {
                    format!("({inner})[]")
                } else {
                    format!("{inner}[]")
                }
            }
            TypeData::ReadonlyType(inner) => format!("readonly {}", self.format(inner)),
            TypeData::Tuple(list) => {
                let elements = self.format_list(list, ", ");
                format!("[{elements}]")
            }
            TypeData::Union(list) => self.format_list(list, " | "),
            TypeData::Intersection(list) => self.format_list(list, " & "),
            TypeData::Reference(name) | TypeData::TypeParameter(name) => {
                self.db.resolve_atom(name).to_string()
            }
            TypeData::Application(app_id) => match self.db.type_application(app_id) {
                Some(app) => {
                    let base = self.format(app.base);
                    let args: Vec<String> = app.args.iter().map(|&arg| self.format(arg)).collect();
                    format!("{base}<{}>", args.join(", "))
                }
                None => "<unresolved>".to_string(),
            },
            TypeData::Function(shape_id) => match self.db.function_shape(shape_id) {
                Some(shape) => self.format_signature(&shape.signature(), " => "),
                None => "<unresolved>".to_string(),
            },
            TypeData::Callable(shape_id) => match self.db.callable_shape(shape_id) {
                Some(shape) if shape.call_signatures.is_empty() => "{}".to_string(),
                Some(shape) => {
                    let sigs: Vec<String> = shape
                        .call_signatures
                        .iter()
                        .map(|sig| self.format_signature(sig, ": "))
                        .collect();
                    format!("{{ {}; }}", sigs.join("; "))
                }
                None => "<unresolved>".to_string(),
            },
            TypeData::Lazy(def) => match self.db.definition(def) {
                Some(info) => self.db.resolve_atom(info.name).to_string(),
                None => "<unresolved>".to_string(),
            },
            TypeData::Error => "error".to_string(),
        }
    }

    fn format_list(&mut self, list: TypeListId, separator: &str) -> String {
        let Some(members) = self.db.type_list(list) else {
            return "<unresolved>".to_string();
        };
        let parts: Vec<String> = members.iter().map(|&member| self.format(member)).collect();
        parts.join(separator)
    }

    fn format_signature(&mut self, sig: &CallSignature, arrow: &str) -> String {
        let mut out = String::new();
        if !sig.type_params.is_empty() {
            let names: Vec<String> = sig
                .type_params
                .iter()
                .map(|&name| self.db.resolve_atom(name).to_string())
                .collect();
            out.push('<');
            out.push_str(&names.join(", "));
            out.push('>');
        }

        let params: Vec<String> = sig
            .params
            .iter()
            .enumerate()
            .map(|(index, param)| {
                let name = match param.name {
                    Some(name) => self.db.resolve_atom(name).to_string(),
                    None => format!("arg{index}"),
                };
                let rest = if param.rest { "..." } else { "" };
                let optional = if param.optional { "?" } else { "" };
                format!("{rest}{name}{optional}: {}", self.format(param.type_id))
            })
            .collect();
        out.push('(');
        out.push_str(&params.join(", "));
        out.push(')');
        out.push_str(arrow);
        out.push_str(&self.format(sig.return_type));
        out
    }

    fn needs_parens_in_array(&self, element: TypeId) -> bool {
        matches!(
            self.db.lookup(element),
            Some(TypeData::Union(_) | TypeData::Intersection(_) | TypeData::Function(_))
        )
    }
}

#[cfg(test)]
#[path = "../tests/format_tests.rs"]
mod tests;
