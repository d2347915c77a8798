//! EmitContext - per-pass emission state.

use crate::{Block, Stmt, Symbol, TypeDesc};

/// Tracks fresh names and trace annotations during one emission pass.
///
/// One context covers one generated function body, so temporaries `v0, v1, …`
/// and loop indices `i0, i1, …` are unique within that body.
#[derive(Debug, Default)]
pub struct EmitContext {
    next_temp: u32,
    next_index: u32,
    trace: bool,
}

impl EmitContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable trace comments.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    pub fn is_tracing(&self) -> bool {
        self.trace
    }

    /// Allocate a fresh temporary name.
    pub fn fresh_temp_name(&mut self) -> String {
        let name = format!("v{}", self.next_temp);
        self.next_temp += 1;
        name
    }

    /// Allocate a fresh loop index name.
    pub fn fresh_index(&mut self) -> String {
        let name = format!("i{}", self.next_index);
        self.next_index += 1;
        name
    }

    /// Allocate a temporary of type `ty` and declare it in `block`.
    pub fn declare_temp(&mut self, ty: TypeDesc, block: &mut Block) -> Symbol {
        let name = self.fresh_temp_name();
        block.push(Stmt::declare(name.clone(), ty.clone()));
        Symbol::temporary(name, ty)
    }

    /// Push a trace annotation when tracing is enabled.
    pub fn annotate(&self, block: &mut Block, text: impl FnOnce() -> String) {
        if self.trace {
            block.push(Stmt::comment(text()));
        }
    }

    /// Number of temporaries allocated so far.
    pub fn temp_count(&self) -> u32 {
        self.next_temp
    }
}
