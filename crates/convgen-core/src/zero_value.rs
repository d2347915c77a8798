//! Zero values for every type descriptor.

use crate::{Expr, NamedKind, TypeDesc};

/// The zero value of `ty` as an expression.
///
/// Numeric scalars are `0`, `bool` is `false`, `string` is `""`, reference-like
/// types are `nil`, structs are the empty composite literal and anything else
/// falls back to `*new(T)`.
pub fn zero_value(ty: &TypeDesc) -> Expr {
    match ty {
        TypeDesc::Scalar(name) => match name.as_str() {
            "bool" => Expr::lit("false"),
            "string" => Expr::lit("\"\""),
            "any" | "error" | "interface{}" => Expr::Nil,
            _ if ty.is_numeric() => Expr::lit("0"),
            "uintptr" | "complex64" | "complex128" => Expr::lit("0"),
            _ => new_zero(ty),
        },
        TypeDesc::Pointer(_) | TypeDesc::Slice(_) | TypeDesc::Function { .. } => Expr::Nil,
        TypeDesc::Named { kind, .. } => match kind {
            NamedKind::Struct => Expr::composite(ty.clone(), Vec::new()),
            NamedKind::Interface => Expr::Nil,
            NamedKind::Opaque => new_zero(ty),
        },
    }
}

/// Whether values of `ty` can be compared against their zero literal with `==`.
pub fn is_comparable_scalar(ty: &TypeDesc) -> bool {
    match ty {
        TypeDesc::Scalar(name) => {
            ty.is_numeric() || matches!(name.as_str(), "bool" | "string" | "uintptr")
        }
        _ => false,
    }
}

fn new_zero(ty: &TypeDesc) -> Expr {
    Expr::call("new", vec![Expr::Path(ty.to_string())]).deref()
}
