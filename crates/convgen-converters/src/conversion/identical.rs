//! Identity conversion.

use convgen_core::{Block, ConversionError, EmitContext, Symbol, TypeDesc};
use convgen_registry::{Converter, LookupContext};

use super::assign;

/// Converts between structurally identical types with a plain assignment.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdenticalConverter;

impl Converter for IdenticalConverter {
    fn can_convert(&self, _: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        target.is_identical(source)
    }

    fn emit(
        &self,
        _: &LookupContext<'_>,
        _: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        Ok(assign(target, source.expr()))
    }

    fn short_form(&self) -> String {
        "T -> T".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuiltinKind;
    use crate::testing::{registry, render};

    #[test]
    fn identical_wins_for_equal_types() {
        let registry = registry(&BuiltinKind::ALL);
        let types = [
            TypeDesc::scalar("string"),
            TypeDesc::scalar("int32"),
            TypeDesc::pointer(TypeDesc::scalar("int")),
            TypeDesc::slice(TypeDesc::struct_type("example.com/model", "User")),
            TypeDesc::struct_type("database/sql", "NullString"),
        ];
        for ty in &types {
            let resolved = registry.resolve(ty, ty).unwrap();
            assert!(resolved.is::<IdenticalConverter>(), "{ty}");
        }
    }

    #[test]
    fn emits_plain_assignment() {
        let registry = registry(&[BuiltinKind::Identical]);
        let ty = TypeDesc::scalar("string");
        let code = render(
            &registry,
            Symbol::field("t", "Name", ty.clone()),
            Symbol::field("s", "Name", ty),
        );
        assert_eq!(code, "t.Name = s.Name\n");
    }

    #[test]
    fn different_named_kinds_are_not_identical() {
        let registry = registry(&[BuiltinKind::Identical]);
        let strukt = TypeDesc::struct_type("example.com/model", "User");
        let iface = TypeDesc::interface("example.com/model", "User");
        assert!(registry.resolve(&strukt, &iface).is_err());
    }
}
