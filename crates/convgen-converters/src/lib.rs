//! Built-in converters for convgen.
//!
//! ## Modules
//!
//! - [`conversion`]: the general converters (identical, pointer, slice,
//!   numeric, function)
//! - [`orchestrator`]: the eight-route policy shared by adapters around a
//!   special type
//! - [`adapters`]: `database/sql` null wrappers and protobuf well-known types
//! - [`interceptor`]: decorators over a converter's emitted code
//! - [`builtins`]: the catalogue of built-in kinds and their default priorities

pub mod adapters;
pub mod builtins;
pub mod conversion;
pub mod interceptor;
pub mod orchestrator;

#[cfg(test)]
pub(crate) mod testing;

pub use adapters::{ProtoWrapperConverter, SqlNullConverter};
pub use builtins::{BuiltinKind, register_builtins};
pub use conversion::{
    FunctionConverter, IdenticalConverter, NumericConverter, PointerUnwrapConverter,
    PointerWrapConverter, SliceConverter,
};
pub use interceptor::{DirectEmit, FieldInterceptor, NilCollapseInterceptor};
pub use orchestrator::{
    GeneratedTypeOrchestrator, Orchestrator, Primitive, Route, RouteSet, Routing,
    StandardConversionOrchestrator,
};
