//! Route collaborator.
//!
//! The routing engine proper is external; this module defines the slice of
//! a route the option compiler works against: a path pattern with `{name}`
//! placeholders, the declared option map, the compiled spec cache, and the
//! pre-handler hook list.

use crate::option::{OptionDecl, OptionSpec};
use async_trait::async_trait;
use indexmap::IndexMap;
use peitho_core::{PeithoResult, RequestContext, ValueBag};
use std::sync::Arc;

/// A hook invoked before a route's own handler runs.
#[async_trait]
pub trait PreHandler: Send + Sync {
    /// Processes the request, yielding the validated value bag the handler
    /// consumes, or the error to surface instead.
    async fn before(&self, ctx: &RequestContext) -> PeithoResult<ValueBag>;
}

/// Compiled-option cache states of a route.
#[derive(Clone, Default)]
enum CompiledOptions {
    /// Not compiled yet.
    #[default]
    Pending,
    /// Compiled: the route declares no options and has no placeholders.
    None,
    /// Compiled to an immutable spec list.
    Specs(Arc<[OptionSpec]>),
}

/// A route with declared options.
///
/// Declaration order is preserved: extraction runs in this order, which is
/// what lets an OPTIONS-sourced option read a value a sibling wrote earlier
/// in the same pass.
///
/// # Example
///
/// ```
/// use peitho_options::{OptionDecl, Route};
///
/// let route = Route::new("/orgs/{orgId}/users/{userId}")
///     .option("limit", OptionDecl::new().source("query").type_name("integer"));
///
/// assert_eq!(route.placeholders(), ["orgId", "userId"]);
/// ```
pub struct Route {
    pattern: String,
    placeholders: Vec<String>,
    declared: IndexMap<String, OptionDecl>,
    compiled: CompiledOptions,
    before: Vec<Arc<dyn PreHandler>>,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern)
            .field("placeholders", &self.placeholders)
            .field("declared", &self.declared.keys().collect::<Vec<_>>())
            .field("is_compiled", &self.is_compiled())
            .finish_non_exhaustive()
    }
}

impl Route {
    /// Creates a route from a path pattern, capturing `{name}` segments as
    /// placeholders.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let placeholders = parse_placeholders(&pattern);
        Self {
            pattern,
            placeholders,
            declared: IndexMap::new(),
            compiled: CompiledOptions::Pending,
            before: Vec::new(),
        }
    }

    /// Declares an option on this route.
    #[must_use]
    pub fn option(mut self, name: impl Into<String>, decl: OptionDecl) -> Self {
        self.declared.insert(name.into(), decl);
        self
    }

    /// Replaces the declared option map, e.g. with one deserialized from
    /// configuration.
    #[must_use]
    pub fn options(mut self, declared: IndexMap<String, OptionDecl>) -> Self {
        self.declared = declared;
        self
    }

    /// Returns the path pattern.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns the placeholder names in pattern order.
    #[must_use]
    pub fn placeholders(&self) -> &[String] {
        &self.placeholders
    }

    /// Returns the declared option map.
    #[must_use]
    pub fn declared_options(&self) -> &IndexMap<String, OptionDecl> {
        &self.declared
    }

    /// Returns true once compilation has run, whether or not it produced
    /// specs.
    #[must_use]
    pub fn is_compiled(&self) -> bool {
        !matches!(self.compiled, CompiledOptions::Pending)
    }

    /// Returns the compiled specs, if compilation produced any.
    #[must_use]
    pub fn compiled_specs(&self) -> Option<&Arc<[OptionSpec]>> {
        match &self.compiled {
            CompiledOptions::Specs(specs) => Some(specs),
            _ => None,
        }
    }

    /// Marks the route compiled with no options.
    pub(crate) fn mark_no_options(&mut self) {
        self.compiled = CompiledOptions::None;
    }

    /// Caches the compiled spec list.
    pub(crate) fn set_compiled(&mut self, specs: Arc<[OptionSpec]>) {
        self.compiled = CompiledOptions::Specs(specs);
    }

    /// Attaches a pre-handler to run before the route's own logic.
    pub fn add_before(&mut self, hook: Arc<dyn PreHandler>) {
        self.before.push(hook);
    }

    /// Returns the attached pre-handlers in attachment order.
    #[must_use]
    pub fn before_hooks(&self) -> &[Arc<dyn PreHandler>] {
        &self.before
    }
}

/// Extracts `{name}` placeholder names from a path pattern.
fn parse_placeholders(pattern: &str) -> Vec<String> {
    pattern
        .split('/')
        .filter_map(|segment| {
            segment
                .strip_prefix('{')
                .and_then(|s| s.strip_suffix('}'))
                .map(String::from)
        })
        .collect()
}
