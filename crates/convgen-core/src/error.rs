//! Conversion errors.
//!
//! Both variants are recoverable: a failed field is reported and the run
//! continues. Callers treat [`ConversionError::EmissionFailed`] exactly like
//! [`ConversionError::NoConverterFound`].

use thiserror::Error;

use crate::TypeDesc;

/// Failure to resolve or emit a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// No registered rule, direct or bridged, converts `from` into `to`.
    #[error("no converter found for {from} -> {to}")]
    NoConverterFound { to: TypeDesc, from: TypeDesc },

    /// A converter accepted the pair but one of its emission steps produced no code.
    #[error("converter `{converter}` accepted {from} -> {to} but emitted no code")]
    EmissionFailed {
        converter: String,
        to: TypeDesc,
        from: TypeDesc,
    },
}

impl ConversionError {
    pub fn not_found(to: &TypeDesc, from: &TypeDesc) -> Self {
        ConversionError::NoConverterFound {
            to: to.clone(),
            from: from.clone(),
        }
    }

    pub fn emission_failed(converter: impl Into<String>, to: &TypeDesc, from: &TypeDesc) -> Self {
        ConversionError::EmissionFailed {
            converter: converter.into(),
            to: to.clone(),
            from: from.clone(),
        }
    }

    /// The requested target type.
    pub fn target(&self) -> &TypeDesc {
        match self {
            ConversionError::NoConverterFound { to, .. } => to,
            ConversionError::EmissionFailed { to, .. } => to,
        }
    }

    /// The requested source type.
    pub fn source_type(&self) -> &TypeDesc {
        match self {
            ConversionError::NoConverterFound { from, .. } => from,
            ConversionError::EmissionFailed { from, .. } => from,
        }
    }
}
