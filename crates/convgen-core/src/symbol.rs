//! Symbol - a typed read/write endpoint of a conversion.

use bitflags::bitflags;

use crate::{Expr, TypeDesc};

bitflags! {
    /// Facts about a symbol the emitters can exploit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SymbolFlags: u8 {
        /// A temporary introduced by the emitter, not a user field.
        const TEMPORARY = 1 << 0;
        /// The location is known to hold its zero value before assignment.
        const KNOWN_ZERO = 1 << 1;
    }
}

/// A named, typed value location.
///
/// Without a `field` this is a bare variable (`anchor`); with one it is a field
/// access (`anchor.field`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub anchor: String,
    pub field: Option<String>,
    pub ty: TypeDesc,
    pub flags: SymbolFlags,
}

impl Symbol {
    /// A bare variable.
    pub fn variable(anchor: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            anchor: anchor.into(),
            field: None,
            ty,
            flags: SymbolFlags::empty(),
        }
    }

    /// A field access `anchor.field`.
    pub fn field(anchor: impl Into<String>, field: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            anchor: anchor.into(),
            field: Some(field.into()),
            ty,
            flags: SymbolFlags::empty(),
        }
    }

    /// A freshly declared temporary. Declared variables start at their zero value.
    pub fn temporary(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            anchor: name.into(),
            field: None,
            ty,
            flags: SymbolFlags::TEMPORARY | SymbolFlags::KNOWN_ZERO,
        }
    }

    /// Replace the flags.
    pub fn with_flags(mut self, flags: SymbolFlags) -> Self {
        self.flags = flags;
        self
    }

    /// The element at `index` of this slice symbol.
    pub fn element(&self, index: &str, element_ty: TypeDesc) -> Self {
        Self::variable(format!("{}[{}]", self.path(), index), element_ty)
    }

    /// Source-level access path.
    pub fn path(&self) -> String {
        match &self.field {
            Some(field) => format!("{}.{}", self.anchor, field),
            None => self.anchor.clone(),
        }
    }

    /// The access path as an expression.
    pub fn expr(&self) -> Expr {
        Expr::Path(self.path())
    }

    pub fn is_temporary(&self) -> bool {
        self.flags.contains(SymbolFlags::TEMPORARY)
    }

    pub fn has_known_zero(&self) -> bool {
        self.flags.contains(SymbolFlags::KNOWN_ZERO)
    }
}
