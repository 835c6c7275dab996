//! Type coercion registry.
//!
//! Maps upper-cased type names to coercion functions. Unknown names consult
//! an ordered chain of fallback resolvers; the first non-null result is
//! memoized under the name, so later route compilations hit the map
//! directly.
//!
//! The registry is an explicit value: [`global`] returns the shared
//! process-wide instance, while tests and embedders construct isolated
//! registries with [`TypeRegistry::with_builtins`] or
//! [`TypeRegistry::empty`].

use crate::coerce;
use crate::option::OptionSpec;
use parking_lot::RwLock;
use peitho_core::{Value, ValueBag};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A coercion function.
///
/// Receives the raw value, the compiled spec (for directives such as
/// `empty_null`), and the full value bag so it can record a soft error
/// scoped to the option. Null inputs pass through unchanged by convention.
pub type CoerceFn = Arc<dyn Fn(Value, &OptionSpec, &mut ValueBag) -> Value + Send + Sync>;

/// A fallback resolver for type names the registry does not know.
///
/// Resolvers must be deterministic: the first resolution of a name may race
/// between requests, and last write wins in the memo.
pub type TypeResolver = Arc<dyn Fn(&str) -> Option<CoerceFn> + Send + Sync>;

/// Registry of type names to coercion functions.
///
/// # Example
///
/// ```
/// use peitho_options::TypeRegistry;
/// use peitho_core::Value;
/// use std::sync::Arc;
///
/// let registry = TypeRegistry::with_builtins();
/// registry.register("csv", Arc::new(|value, _spec, _bag| {
///     match value {
///         Value::String(s) => {
///             Value::Array(s.split(',').map(Value::from).collect())
///         }
///         other => other,
///     }
/// }));
///
/// assert!(registry.contains("CSV"));
/// assert!(registry.contains("integer"));
/// ```
pub struct TypeRegistry {
    types: RwLock<HashMap<String, CoerceFn>>,
    resolvers: RwLock<Vec<TypeResolver>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl TypeRegistry {
    /// Creates a registry with no registered types.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            types: RwLock::new(HashMap::new()),
            resolvers: RwLock::new(Vec::new()),
        }
    }

    /// Creates a registry pre-populated with the built-in types
    /// (boolean, string, number, integer, buffer, object).
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::empty();
        coerce::install_builtins(&registry);
        registry
    }

    /// Registers a coercion function under `name`.
    ///
    /// Names are stored upper-cased; registration is case-insensitive.
    pub fn register(&self, name: &str, coerce: CoerceFn) {
        self.types.write().insert(name.to_uppercase(), coerce);
    }

    /// Registers several coercion functions at once.
    pub fn register_types<I>(&self, types: I)
    where
        I: IntoIterator<Item = (String, CoerceFn)>,
    {
        let mut map = self.types.write();
        for (name, coerce) in types {
            map.insert(name.to_uppercase(), coerce);
        }
    }

    /// Appends a fallback resolver to the chain.
    pub fn add_resolver(&self, resolver: TypeResolver) {
        self.resolvers.write().push(resolver);
    }

    /// Returns true when `name` is registered (memoized names included).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.read().contains_key(&name.to_uppercase())
    }

    /// Resolves `name` to a coercion function.
    ///
    /// Looks up the memo first; on a miss, walks the resolver chain in
    /// registration order and memoizes the first non-null result under the
    /// upper-cased name.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<CoerceFn> {
        let key = name.to_uppercase();
        if let Some(found) = self.types.read().get(&key) {
            return Some(Arc::clone(found));
        }

        let resolved = self
            .resolvers
            .read()
            .iter()
            .find_map(|resolver| resolver(name))?;

        self.types.write().insert(key, Arc::clone(&resolved));
        Some(resolved)
    }
}

/// Returns the shared process-wide registry, created on first use with the
/// built-in types installed.
#[must_use]
pub fn global() -> Arc<TypeRegistry> {
    static GLOBAL: OnceLock<Arc<TypeRegistry>> = OnceLock::new();
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(TypeRegistry::with_builtins())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn passthrough() -> CoerceFn {
        Arc::new(|value, _spec, _bag| value)
    }

    #[test]
    fn test_register_is_case_insensitive() {
        let registry = TypeRegistry::empty();
        registry.register("email", passthrough());

        assert!(registry.contains("EMAIL"));
        assert!(registry.contains("email"));
        assert!(registry.resolve("Email").is_some());
    }

    #[test]
    fn test_builtins_present() {
        let registry = TypeRegistry::with_builtins();
        for name in ["boolean", "string", "number", "integer", "buffer", "object"] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
    }

    #[test]
    fn test_resolver_chain_order() {
        let registry = TypeRegistry::empty();
        registry.add_resolver(Arc::new(|name| {
            (name == "first").then(passthrough)
        }));
        registry.add_resolver(Arc::new(|_name| Some(passthrough())));

        assert!(registry.resolve("first").is_some());
        assert!(registry.resolve("anything").is_some());
    }

    #[test]
    fn test_resolution_memoizes() {
        let registry = TypeRegistry::empty();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        registry.add_resolver(Arc::new(move |name| {
            counter.fetch_add(1, Ordering::SeqCst);
            (name == "email").then(passthrough)
        }));

        assert!(registry.resolve("email").is_some());
        assert!(registry.resolve("email").is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_without_resolvers() {
        let registry = TypeRegistry::with_builtins();
        assert!(registry.resolve("widget").is_none());
    }

    #[test]
    fn test_register_types_bulk() {
        let registry = TypeRegistry::empty();
        registry.register_types(vec![
            ("a".to_string(), passthrough()),
            ("b".to_string(), passthrough()),
        ]);

        assert!(registry.contains("A"));
        assert!(registry.contains("B"));
    }

    #[test]
    fn test_isolated_registries_do_not_share_state() {
        let one = TypeRegistry::empty();
        let two = TypeRegistry::empty();
        one.register("only-here", passthrough());

        assert!(one.contains("only-here"));
        assert!(!two.contains("only-here"));
    }
}
