//! Binder facade.
//!
//! [`Binder`] ties the pieces together: it owns a registry handle, compiles
//! routes at registration time, and performs the per-request
//! extraction/validation flow. Compiling a route also attaches the flow as
//! a pre-handler hook so route execution chains can invoke it without
//! holding the binder.

use crate::compiler;
use crate::option::OptionSpec;
use crate::pipeline;
use crate::registry::{self, TypeRegistry};
use crate::route::{PreHandler, Route};
use async_trait::async_trait;
use peitho_core::{PeithoResult, RequestContext, ValueBag};
use std::sync::Arc;

/// Compiles route option schemas and binds request values against them.
///
/// # Example
///
/// ```
/// use peitho_options::{Binder, OptionDecl, Route};
/// use peitho_core::{RequestContext, Value};
/// use http::Method;
///
/// # tokio_test::block_on(async {
/// let binder = Binder::new();
/// let mut route = Route::new("/users/{id}")
///     .option("id", OptionDecl::new().type_name("integer"));
/// binder.compile_route(&mut route).unwrap();
///
/// let ctx = RequestContext::builder()
///     .method(Method::GET)
///     .uri("/users/42".parse().unwrap())
///     .path_param("id", "42")
///     .build();
///
/// let bag = binder.handle_request(&route, &ctx).await.unwrap();
/// assert_eq!(bag.get("id"), Some(&Value::Int(42)));
/// # });
/// ```
#[derive(Clone)]
pub struct Binder {
    registry: Arc<TypeRegistry>,
}

impl Default for Binder {
    fn default() -> Self {
        Self::new()
    }
}

impl Binder {
    /// Creates a binder using the shared process-wide registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: registry::global(),
        }
    }

    /// Creates a binder with an isolated registry.
    #[must_use]
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the registry this binder resolves types against.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Compiles a route's declared options and attaches the binding
    /// pre-handler.
    ///
    /// Idempotent: a route that is already compiled is left untouched, and
    /// the pre-handler is not attached a second time.
    ///
    /// # Errors
    ///
    /// Returns a schema error when a declaration names an unknown type or
    /// source.
    pub fn compile_route(&self, route: &mut Route) -> PeithoResult<()> {
        if route.is_compiled() {
            return Ok(());
        }

        match compiler::compile(&self.registry, route.placeholders(), route.declared_options())? {
            None => route.mark_no_options(),
            Some(specs) => {
                let specs: Arc<[OptionSpec]> = specs.into();
                tracing::debug!(
                    pattern = route.pattern(),
                    options = specs.len(),
                    "Compiled route options"
                );
                route.set_compiled(Arc::clone(&specs));
                route.add_before(Arc::new(BindOptions { specs }));
            }
        }
        Ok(())
    }

    /// Compiles every route in a collection.
    ///
    /// Routes added to a registry after startup go through
    /// [`Binder::compile_route`] individually.
    pub fn compile_all<'a, I>(&self, routes: I) -> PeithoResult<()>
    where
        I: IntoIterator<Item = &'a mut Route>,
    {
        for route in routes {
            self.compile_route(route)?;
        }
        Ok(())
    }

    /// Runs the per-request binding flow against a compiled route.
    ///
    /// A route without options yields an empty bag. Otherwise the result is
    /// the validated value bag, an aggregated validation error, or a fatal
    /// payload error.
    pub async fn handle_request(
        &self,
        route: &Route,
        ctx: &RequestContext,
    ) -> PeithoResult<ValueBag> {
        match route.compiled_specs() {
            Some(specs) => pipeline::bind(specs, ctx).await,
            None => Ok(ValueBag::new()),
        }
    }
}

/// The pre-handler attached to compiled routes.
struct BindOptions {
    specs: Arc<[OptionSpec]>,
}

#[async_trait]
impl PreHandler for BindOptions {
    async fn before(&self, ctx: &RequestContext) -> PeithoResult<ValueBag> {
        pipeline::bind(&self.specs, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionDecl;

    #[test]
    fn test_compile_route_is_idempotent() {
        let binder = Binder::with_registry(Arc::new(TypeRegistry::with_builtins()));
        let mut route = Route::new("/users/{id}");

        binder.compile_route(&mut route).unwrap();
        assert!(route.is_compiled());
        assert_eq!(route.before_hooks().len(), 1);
        let specs = Arc::clone(route.compiled_specs().unwrap());

        binder.compile_route(&mut route).unwrap();
        assert_eq!(route.before_hooks().len(), 1);
        assert!(Arc::ptr_eq(&specs, route.compiled_specs().unwrap()));
    }

    #[test]
    fn test_route_without_options_compiles_to_none() {
        let binder = Binder::with_registry(Arc::new(TypeRegistry::with_builtins()));
        let mut route = Route::new("/health");

        binder.compile_route(&mut route).unwrap();
        assert!(route.is_compiled());
        assert!(route.compiled_specs().is_none());
        assert!(route.before_hooks().is_empty());
    }

    #[test]
    fn test_schema_error_leaves_route_uncompiled() {
        let binder = Binder::with_registry(Arc::new(TypeRegistry::with_builtins()));
        let mut route =
            Route::new("/x").option("w", OptionDecl::new().type_name("widget"));

        assert!(binder.compile_route(&mut route).is_err());
        assert!(!route.is_compiled());
        assert!(route.before_hooks().is_empty());
    }

    #[tokio::test]
    async fn test_handle_request_without_options_yields_empty_bag() {
        let binder = Binder::with_registry(Arc::new(TypeRegistry::with_builtins()));
        let mut route = Route::new("/health");
        binder.compile_route(&mut route).unwrap();

        let ctx = RequestContext::builder()
            .method(http::Method::GET)
            .uri(http::Uri::from_static("/health"))
            .build();

        let bag = binder.handle_request(&route, &ctx).await.unwrap();
        assert!(bag.values().is_empty());
    }

    #[tokio::test]
    async fn test_attached_pre_handler_matches_handle_request() {
        let binder = Binder::with_registry(Arc::new(TypeRegistry::with_builtins()));
        let mut route = Route::new("/users/{id}")
            .option("id", OptionDecl::new().type_name("integer"));
        binder.compile_route(&mut route).unwrap();

        let ctx = RequestContext::builder()
            .method(http::Method::GET)
            .uri(http::Uri::from_static("/users/9"))
            .path_param("id", "9")
            .build();

        let via_binder = binder.handle_request(&route, &ctx).await.unwrap();
        let via_hook = route.before_hooks()[0].before(&ctx).await.unwrap();

        assert_eq!(via_binder.get("id"), via_hook.get("id"));
    }
}
