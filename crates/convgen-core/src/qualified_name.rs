use std::fmt;

/// Qualified name of a converter implementation.
///
/// Priority patterns are matched against the `Display` form, which keeps the
/// `::` separators of the Rust type path it comes from.
///
/// ```
/// use convgen_core::QualifiedName;
///
/// struct SliceConverter;
///
/// let name = QualifiedName::of::<SliceConverter>();
/// assert_eq!(name.simple_name(), "SliceConverter");
/// assert!(name.to_string().ends_with("::SliceConverter"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName {
    /// Module path segments, outermost first.
    pub namespace: Vec<String>,
    pub name: String,
}

impl QualifiedName {
    /// Qualified name of a Rust type. Generic arguments stay in the simple name.
    pub fn of<T: ?Sized>() -> Self {
        let path = std::any::type_name::<T>();
        let (path, generics) = path.split_at(path.find('<').unwrap_or(path.len()));
        let mut segments: Vec<String> = path
            .split("::")
            .filter(|segment| !segment.is_empty())
            .map(str::to_string)
            .collect();
        let mut name = segments.pop().unwrap_or_default();
        name.push_str(generics);
        Self {
            namespace: segments,
            name,
        }
    }

    pub fn simple_name(&self) -> &str {
        &self.name
    }

    /// The module path, `::`-joined.
    pub fn namespace_string(&self) -> String {
        self.namespace.join("::")
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.namespace {
            write!(f, "{segment}::")?;
        }
        f.write_str(&self.name)
    }
}
