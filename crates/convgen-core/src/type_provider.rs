//! Type introspection boundary.
//!
//! Extracting types from source code is not this crate's job. Converters that
//! need descriptors of well-known types or signatures of bridge functions ask a
//! [`TypeProvider`] during initialization. [`TypeTable`] is an in-memory provider
//! for embedders that already have the descriptors at hand.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::{TypeDesc, package_alias};

/// Reference to a package-level function, `import/path.Name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    pub package: String,
    pub name: String,
}

impl FunctionRef {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Parse `import/path.Name`.
    ///
    /// The name follows the last `.` after the last `/`, so dotted hosts in
    /// import paths are kept intact. A bare `Name` refers to the generated
    /// package. Returns `None` for an empty name, or for an import path with no
    /// `.Name` after its last segment.
    ///
    /// ```
    /// use convgen_core::FunctionRef;
    ///
    /// let f = FunctionRef::parse("example.com/conv.ParseID").unwrap();
    /// assert_eq!(f.package, "example.com/conv");
    /// assert_eq!(f.name, "ParseID");
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let last_segment_start = s.rfind('/').map_or(0, |i| i + 1);
        let (package, name) = match s[last_segment_start..].rfind('.') {
            Some(dot) => {
                let dot = last_segment_start + dot;
                (&s[..dot], &s[dot + 1..])
            }
            None if s.contains('/') => return None,
            None => ("", s),
        };
        if name.is_empty() {
            return None;
        }
        Some(Self::new(package, name))
    }

    /// Callee spelling at a call site, `alias.Name`.
    pub fn callee(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", package_alias(&self.package), self.name)
        }
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.package, self.name)
        }
    }
}

/// Supplies descriptors for types and functions the converters refer to by name.
pub trait TypeProvider {
    /// Descriptor of the named type `package.name`.
    fn named_type(&self, package: &str, name: &str) -> Option<TypeDesc>;

    /// Signature of a package-level function, as a [`TypeDesc::Function`].
    fn function(&self, func: &FunctionRef) -> Option<TypeDesc>;
}

/// In-memory [`TypeProvider`].
#[derive(Debug, Default, Clone)]
pub struct TypeTable {
    types: FxHashMap<(String, String), TypeDesc>,
    functions: FxHashMap<FunctionRef, TypeDesc>,
}

impl TypeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named type. Non-named descriptors are ignored.
    pub fn add_type(&mut self, ty: TypeDesc) -> &mut Self {
        if let TypeDesc::Named { package, name, .. } = &ty {
            self.types.insert((package.clone(), name.clone()), ty.clone());
        }
        self
    }

    /// Register a function signature.
    pub fn add_function(
        &mut self,
        func: FunctionRef,
        params: Vec<TypeDesc>,
        results: Vec<TypeDesc>,
    ) -> &mut Self {
        self.functions
            .insert(func, TypeDesc::function(params, results));
        self
    }
}

impl TypeProvider for TypeTable {
    fn named_type(&self, package: &str, name: &str) -> Option<TypeDesc> {
        self.types
            .get(&(package.to_string(), name.to_string()))
            .cloned()
    }

    fn function(&self, func: &FunctionRef) -> Option<TypeDesc> {
        self.functions.get(func).cloned()
    }
}
