//! Element-wise slice conversion.

use convgen_core::{Block, ConversionError, EmitContext, Expr, Stmt, Symbol, TypeDesc};
use convgen_registry::{Converter, LookupContext};

use super::{assign, hop_failed};

/// `[]A -> []B` when some other converter handles `A -> B`.
///
/// A nil source stays nil; anything else, including an empty slice, gets a
/// fresh `make` of the same length.
#[derive(Debug, Default, Clone, Copy)]
pub struct SliceConverter;

impl Converter for SliceConverter {
    fn can_convert(&self, lookup: &LookupContext<'_>, target: &TypeDesc, source: &TypeDesc) -> bool {
        match (target.element(), source.element()) {
            (Some(to), Some(from)) => lookup.look_up(to, from).is_ok(),
            _ => false,
        }
    }

    fn emit(
        &self,
        lookup: &LookupContext<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block, ConversionError> {
        let (Some(to), Some(from)) = (target.ty.element(), source.ty.element()) else {
            return Err(ConversionError::not_found(&target.ty, &source.ty));
        };
        let element = lookup
            .look_up(to, from)
            .map_err(hop_failed("slice", target, source))?;

        let index = ctx.fresh_index();
        let body = element
            .emit(
                ctx,
                &target.element(&index, to.clone()),
                &source.element(&index, from.clone()),
            )
            .map_err(hop_failed("slice", target, source))?;

        let mut filled = assign(
            target,
            Expr::make(target.ty.clone(), source.expr().length()),
        );
        filled.push(Stmt::for_range(index, source.expr(), body));

        if target.has_known_zero() {
            return Ok(Block::of(Stmt::if_then(source.expr().not_nil(), filled)));
        }
        Ok(Block::of(Stmt::if_else(
            source.expr().is_nil(),
            assign(target, Expr::Nil),
            filled,
        )))
    }

    fn short_form(&self) -> String {
        "[]A -> []B".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuiltinKind;
    use crate::testing::{registry, render};
    use convgen_core::NumericKind;
    use pretty_assertions::assert_eq;

    const SLICES: [BuiltinKind; 4] = [
        BuiltinKind::Identical,
        BuiltinKind::PointerWrap,
        BuiltinKind::Slice,
        BuiltinKind::Numeric,
    ];

    fn ints(kind: NumericKind) -> TypeDesc {
        TypeDesc::slice(TypeDesc::numeric(kind))
    }

    #[test]
    fn converts_elements_in_a_loop() {
        let registry = registry(&SLICES);
        let target = ints(NumericKind::Int64);
        let source = ints(NumericKind::Int32);
        assert!(registry.resolve(&target, &source).unwrap().is::<SliceConverter>());

        let code = render(
            &registry,
            Symbol::field("t", "IDs", target),
            Symbol::field("s", "IDs", source),
        );
        let expected = "\
if s.IDs == nil {
\tt.IDs = nil
} else {
\tt.IDs = make([]int64, len(s.IDs))
\tfor i0 := range s.IDs {
\t\tt.IDs[i0] = int64(s.IDs[i0])
\t}
}
";
        assert_eq!(code, expected);
    }

    #[test]
    fn empty_source_still_allocates() {
        // only the nil check assigns nil; an empty slice takes the make branch
        let registry = registry(&SLICES);
        let code = render(
            &registry,
            Symbol::variable("t", ints(NumericKind::Int)),
            Symbol::variable("s", ints(NumericKind::Uint)),
        );
        let nil_branch = code.find("t = nil").unwrap();
        let make_branch = code.find("t = make([]int, len(s))").unwrap();
        assert!(nil_branch < make_branch);
        assert!(code.starts_with("if s == nil {"));
    }

    #[test]
    fn known_zero_target_only_fills() {
        let registry = registry(&SLICES);
        let code = render(
            &registry,
            Symbol::temporary("v0", ints(NumericKind::Int64)),
            Symbol::variable("s", ints(NumericKind::Int8)),
        );
        assert!(code.starts_with("if s != nil {\n\tv0 = make([]int64, len(s))\n"));
        assert!(!code.contains("nil\n"));
    }

    #[test]
    fn nested_slices_need_another_kind() {
        let registry = registry(&SLICES);
        let target = TypeDesc::slice(ints(NumericKind::Int64));
        let source = TypeDesc::slice(ints(NumericKind::Int32));
        // the inner `[]int32 -> []int64` would need the slice converter again
        assert!(registry.resolve(&target, &source).is_err());
        // identical nested slices never reach it
        assert!(registry.resolve(&target, &target).unwrap().is::<crate::IdenticalConverter>());
    }

    #[test]
    fn elements_may_bridge_through_other_converters() {
        let registry = registry(&SLICES);
        let target = TypeDesc::slice(TypeDesc::pointer(TypeDesc::scalar("string")));
        let source = TypeDesc::slice(TypeDesc::scalar("string"));
        let code = render(
            &registry,
            Symbol::variable("t", target),
            Symbol::variable("s", source),
        );
        assert!(code.contains("\t\tt[i0] = &s[i0]\n"), "{code}");
    }

    #[test]
    fn unconvertible_elements_fail() {
        let registry = registry(&SLICES);
        let target = TypeDesc::slice(TypeDesc::scalar("string"));
        let source = TypeDesc::slice(TypeDesc::scalar("bool"));
        assert!(matches!(
            registry.resolve(&target, &source),
            Err(ConversionError::NoConverterFound { .. })
        ));
    }
}
