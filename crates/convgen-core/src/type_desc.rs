//! TypeDesc - structural type descriptors.
//!
//! A [`TypeDesc`] is an immutable value describing a type's identity and shape.
//! Two descriptors are identical iff their tags and all payloads match
//! recursively. There is no implicit widening at this layer; converting an
//! `int8` into an `int64` is a converter's job.
//!
//! # Example
//!
//! ```
//! use convgen_core::TypeDesc;
//!
//! let a = TypeDesc::slice(TypeDesc::pointer(TypeDesc::scalar("int32")));
//! let b = TypeDesc::slice(TypeDesc::pointer(TypeDesc::scalar("int32")));
//! assert_eq!(a, b);
//! assert_eq!(a.to_string(), "[]*int32");
//! ```

use std::fmt::{self, Display, Formatter};

use crate::{NumericKind, TypeHash};

/// What a named type is declared as.
///
/// Supplied by the type provider; participates in identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKind {
    /// A struct type. Zero value is the empty composite literal.
    Struct,
    /// An interface type. Zero value is `nil`.
    Interface,
    /// Any other declared type (defined basic types, maps, channels, ...).
    Opaque,
}

/// A type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDesc {
    /// A predeclared scalar type (`int32`, `string`, `bool`, `any`, ...).
    Scalar(String),
    /// Pointer to the inner type.
    Pointer(Box<TypeDesc>),
    /// Slice of the inner type.
    Slice(Box<TypeDesc>),
    /// A declared type qualified by its import path.
    Named {
        /// Import path (e.g. `database/sql`). Empty for the generated package.
        package: String,
        /// Type name (e.g. `NullString`).
        name: String,
        /// Declaration kind.
        kind: NamedKind,
    },
    /// A function signature.
    Function {
        /// Parameter types, in order.
        params: Vec<TypeDesc>,
        /// Result types, in order.
        results: Vec<TypeDesc>,
    },
}

impl TypeDesc {
    /// Create a scalar type.
    pub fn scalar(name: impl Into<String>) -> Self {
        TypeDesc::Scalar(name.into())
    }

    /// Create a pointer to `inner`.
    pub fn pointer(inner: TypeDesc) -> Self {
        TypeDesc::Pointer(Box::new(inner))
    }

    /// Create a slice of `inner`.
    pub fn slice(inner: TypeDesc) -> Self {
        TypeDesc::Slice(Box::new(inner))
    }

    /// Create a named type of the given kind.
    pub fn named(package: impl Into<String>, name: impl Into<String>, kind: NamedKind) -> Self {
        TypeDesc::Named {
            package: package.into(),
            name: name.into(),
            kind,
        }
    }

    /// Create a named struct type.
    pub fn struct_type(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::named(package, name, NamedKind::Struct)
    }

    /// Create a named interface type.
    pub fn interface(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self::named(package, name, NamedKind::Interface)
    }

    /// Create a function signature.
    pub fn function(params: Vec<TypeDesc>, results: Vec<TypeDesc>) -> Self {
        TypeDesc::Function { params, results }
    }

    /// Create the descriptor for a numeric kind.
    pub fn numeric(kind: NumericKind) -> Self {
        TypeDesc::Scalar(kind.name().to_string())
    }

    /// Structural identity. Equivalent to `==`, spelled out for call sites that
    /// read as type-system checks.
    #[inline]
    pub fn is_identical(&self, other: &TypeDesc) -> bool {
        self == other
    }

    /// The pointee if this is a pointer.
    pub fn pointee(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Pointer(inner) => Some(inner),
            _ => None,
        }
    }

    /// The element type if this is a slice.
    pub fn element(&self) -> Option<&TypeDesc> {
        match self {
            TypeDesc::Slice(inner) => Some(inner),
            _ => None,
        }
    }

    /// Parameter and result lists if this is a function.
    pub fn signature(&self) -> Option<(&[TypeDesc], &[TypeDesc])> {
        match self {
            TypeDesc::Function { params, results } => Some((params, results)),
            _ => None,
        }
    }

    /// The numeric kind of a numeric scalar.
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            TypeDesc::Scalar(name) => NumericKind::from_name(name),
            _ => None,
        }
    }

    /// Whether this is one of the twelve numeric scalars.
    pub fn is_numeric(&self) -> bool {
        self.numeric_kind().is_some()
    }

    /// Whether this type behaves like an interface.
    ///
    /// Taking the address of an interface value changes its meaning, so the
    /// pointer converters refuse these.
    pub fn is_interface_like(&self) -> bool {
        match self {
            TypeDesc::Scalar(name) => matches!(name.as_str(), "any" | "error" | "interface{}"),
            TypeDesc::Named { kind, .. } => *kind == NamedKind::Interface,
            _ => false,
        }
    }

    /// Whether the zero value of this type is `nil`.
    pub fn is_nillable(&self) -> bool {
        match self {
            TypeDesc::Pointer(_) | TypeDesc::Slice(_) | TypeDesc::Function { .. } => true,
            _ => self.is_interface_like(),
        }
    }

    /// Structural hash of this descriptor.
    pub fn type_hash(&self) -> TypeHash {
        TypeHash::of_desc(self)
    }
}

/// Local alias for an import path: its last `/`-separated segment.
///
/// ```
/// use convgen_core::package_alias;
///
/// assert_eq!(package_alias("database/sql"), "sql");
/// assert_eq!(package_alias("time"), "time");
/// ```
pub fn package_alias(package: &str) -> &str {
    package.rsplit('/').next().unwrap_or(package)
}

impl Display for TypeDesc {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            TypeDesc::Scalar(name) => write!(f, "{name}"),
            TypeDesc::Pointer(inner) => write!(f, "*{inner}"),
            TypeDesc::Slice(inner) => write!(f, "[]{inner}"),
            TypeDesc::Named { package, name, .. } => {
                if package.is_empty() {
                    write!(f, "{name}")
                } else {
                    write!(f, "{}.{}", package_alias(package), name)
                }
            }
            TypeDesc::Function { params, results } => {
                write!(f, "func(")?;
                write_list(f, params)?;
                write!(f, ")")?;
                match results.len() {
                    0 => Ok(()),
                    1 => write!(f, " {}", results[0]),
                    _ => {
                        write!(f, " (")?;
                        write_list(f, results)?;
                        write!(f, ")")
                    }
                }
            }
        }
    }
}

fn write_list(f: &mut Formatter<'_>, types: &[TypeDesc]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}
