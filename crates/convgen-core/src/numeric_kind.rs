//! Numeric scalar kinds.

use std::fmt;

/// One of the twelve numeric scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NumericKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

impl NumericKind {
    /// All kinds, most preferred first.
    ///
    /// Bridge searches walk this order and stop at the first kind that works,
    /// so wide signed integers are tried before unsigned ones and floats last.
    pub const PREFERRED: [NumericKind; 12] = [
        NumericKind::Int64,
        NumericKind::Int,
        NumericKind::Int32,
        NumericKind::Int16,
        NumericKind::Int8,
        NumericKind::Uint64,
        NumericKind::Uint,
        NumericKind::Uint32,
        NumericKind::Uint16,
        NumericKind::Uint8,
        NumericKind::Float64,
        NumericKind::Float32,
    ];

    /// Source-level spelling of the kind.
    pub const fn name(self) -> &'static str {
        match self {
            NumericKind::Int => "int",
            NumericKind::Int8 => "int8",
            NumericKind::Int16 => "int16",
            NumericKind::Int32 => "int32",
            NumericKind::Int64 => "int64",
            NumericKind::Uint => "uint",
            NumericKind::Uint8 => "uint8",
            NumericKind::Uint16 => "uint16",
            NumericKind::Uint32 => "uint32",
            NumericKind::Uint64 => "uint64",
            NumericKind::Float32 => "float32",
            NumericKind::Float64 => "float64",
        }
    }

    /// Parse a scalar name. `byte` and `rune` are treated as their aliases.
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "int" => NumericKind::Int,
            "int8" => NumericKind::Int8,
            "int16" => NumericKind::Int16,
            "int32" | "rune" => NumericKind::Int32,
            "int64" => NumericKind::Int64,
            "uint" => NumericKind::Uint,
            "uint8" | "byte" => NumericKind::Uint8,
            "uint16" => NumericKind::Uint16,
            "uint32" => NumericKind::Uint32,
            "uint64" => NumericKind::Uint64,
            "float32" => NumericKind::Float32,
            "float64" => NumericKind::Float64,
            _ => return None,
        };
        Some(kind)
    }

    pub const fn is_float(self) -> bool {
        matches!(self, NumericKind::Float32 | NumericKind::Float64)
    }

    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            NumericKind::Int
                | NumericKind::Int8
                | NumericKind::Int16
                | NumericKind::Int32
                | NumericKind::Int64
        )
    }
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
