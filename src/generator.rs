//! Generator - one configured generation run.
//!
//! Owns the converter registry, drives its lifecycle from a
//! [`GeneratorConfig`] and maps struct fields through it.

use std::fmt;

use tracing::{debug, info};

use convgen_converters::{DirectEmit, FieldInterceptor, NilCollapseInterceptor, register_builtins};
use convgen_core::{Block, ConversionError, EmitContext, FunctionRef, Symbol, TypeDesc, TypeProvider};
use convgen_registry::{
    Converter, ConverterDescription, ConverterId, ConverterRegistry, InitEnv, RegistryError,
    Resolved,
};

use crate::config::GeneratorConfig;
use crate::error::{Error, Result};

/// A named, typed struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeDesc,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A target field no converter could produce, with the reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unconvertible {
    pub field: String,
    pub reason: ConversionError,
}

/// What happened to each target field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingSummary {
    pub converted: Vec<String>,
    pub unconvertible: Vec<Unconvertible>,
    /// Target fields with no source field of the same name.
    pub unmatched: Vec<String>,
}

impl MappingSummary {
    pub fn is_complete(&self) -> bool {
        self.unconvertible.is_empty() && self.unmatched.is_empty()
    }
}

impl fmt::Display for MappingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} converted, {} unconvertible, {} unmatched",
            self.converted.len(),
            self.unconvertible.len(),
            self.unmatched.len()
        )?;
        for failure in &self.unconvertible {
            write!(f, "\n  {}: {}", failure.field, failure.reason)?;
        }
        Ok(())
    }
}

/// The code for a struct mapping and its summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingOutput {
    pub block: Block,
    pub summary: MappingSummary,
}

/// A generation run: configuration plus the registry built from it.
pub struct Generator {
    config: GeneratorConfig,
    bridge_functions: Vec<FunctionRef>,
    registry: ConverterRegistry,
}

impl Generator {
    /// Build the registry for `config` with every enabled built-in registered.
    ///
    /// The generator stays in the setup phase until [`Generator::init`].
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        let bridge_functions = config.bridge_function_refs()?;
        let mut registry = ConverterRegistry::new().with_lookup_cache(config.lookup_cache);
        registry.set_max_lookup_depth(config.max_lookup_depth);
        register_builtins(&mut registry, config.enabled.iter().copied())?;
        debug!(
            builtins = registry.len(),
            bridges = bridge_functions.len(),
            "generator configured"
        );
        Ok(Self {
            config,
            bridge_functions,
            registry,
        })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Add a user converter after the built-ins.
    pub fn register<C: Converter>(&mut self, converter: C) -> Result<ConverterId> {
        Ok(self.registry.register(converter)?)
    }

    pub fn register_with_priority<C: Converter>(
        &mut self,
        converter: C,
        priority: i64,
    ) -> Result<ConverterId> {
        Ok(self.registry.register_with_priority(converter, priority)?)
    }

    /// Apply the priority patterns and initialize every converter, ending setup.
    pub fn init(&mut self, types: &dyn TypeProvider) -> Result<()> {
        if !self.config.priority_patterns.is_empty() {
            self.registry
                .reprioritize_by_patterns(&self.config.priority_patterns)?;
        }
        self.registry
            .init_all(&InitEnv::new(types, &self.bridge_functions))?;
        info!(converters = self.registry.len(), "generator ready");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.registry.is_ready()
    }

    /// Drop user converters and cached lookups and return to setup with the
    /// configured built-ins registered again.
    pub fn reset(&mut self) -> Result<()> {
        self.registry.clear();
        register_builtins(&mut self.registry, self.config.enabled.iter().copied())?;
        Ok(())
    }

    /// A fresh emission context honouring the `trace` setting.
    pub fn emit_context(&self) -> EmitContext {
        EmitContext::new().with_trace(self.config.trace)
    }

    /// The first converter, in priority order, for `source -> target`.
    pub fn resolve(&self, target: &TypeDesc, source: &TypeDesc) -> Result<Resolved<'_>> {
        if !self.is_ready() {
            return Err(RegistryError::NotInitialized.into());
        }
        Ok(self.registry.resolve(target, source)?)
    }

    /// Emit a resolved conversion through the configured interceptor.
    pub fn emit(
        &self,
        resolved: &Resolved<'_>,
        ctx: &mut EmitContext,
        target: &Symbol,
        source: &Symbol,
    ) -> Result<Block> {
        Ok(self.interceptor().intercept(resolved, ctx, target, source)?)
    }

    /// Resolve and emit in one step.
    pub fn convert(&self, ctx: &mut EmitContext, target: &Symbol, source: &Symbol) -> Result<Block> {
        let resolved = self.resolve(&target.ty, &source.ty)?;
        self.emit(&resolved, ctx, target, source)
    }

    /// Every converter in resolution order.
    pub fn describe(&self) -> Vec<ConverterDescription> {
        self.registry.describe()
    }

    /// Convert every field of `source` into the same-named field of `target`.
    ///
    /// Fields that cannot be converted are reported in the summary and left out
    /// of the block; only lifecycle misuse fails the whole mapping.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn map_fields(
        &self,
        target: &str,
        target_fields: &[Field],
        source: &str,
        source_fields: &[Field],
    ) -> Result<MappingOutput> {
        if !self.is_ready() {
            return Err(RegistryError::NotInitialized.into());
        }
        let mut ctx = self.emit_context();
        let mut block = Block::new();
        let mut summary = MappingSummary::default();

        for field in target_fields {
            let Some(from) = source_fields.iter().find(|f| f.name == field.name) else {
                debug!(field = %field.name, "no source field");
                summary.unmatched.push(field.name.clone());
                continue;
            };
            let to = Symbol::field(target, &field.name, field.ty.clone());
            let from = Symbol::field(source, &from.name, from.ty.clone());
            match self.convert(&mut ctx, &to, &from) {
                Ok(code) => {
                    block.append(code);
                    summary.converted.push(field.name.clone());
                }
                Err(Error::Conversion(reason)) => {
                    debug!(field = %field.name, %reason, "field not converted");
                    summary.unconvertible.push(Unconvertible {
                        field: field.name.clone(),
                        reason,
                    });
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            converted = summary.converted.len(),
            unconvertible = summary.unconvertible.len(),
            unmatched = summary.unmatched.len(),
            "mapped {source} -> {target}"
        );
        Ok(MappingOutput { block, summary })
    }

    fn interceptor(&self) -> &'static dyn FieldInterceptor {
        if self.config.nil_collapse {
            &NilCollapseInterceptor
        } else {
            &DirectEmit
        }
    }
}

impl fmt::Debug for Generator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("config", &self.config)
            .field("converters", &self.registry.len())
            .field("ready", &self.is_ready())
            .finish()
    }
}
