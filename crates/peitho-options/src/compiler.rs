//! Option compilation.
//!
//! Turns a route's declared option map and placeholder list into the
//! normalized spec list used per request. Runs once per route; unknown
//! type or source names are schema errors surfaced at registration time,
//! never per request.

use crate::option::{OptionDecl, OptionSpec};
use crate::registry::{CoerceFn, TypeRegistry};
use crate::source::SourceKind;
use indexmap::IndexMap;
use peitho_core::{PeithoError, PeithoResult};

/// Compiles declared options against the placeholder list.
///
/// Placeholders missing from the declared map are synthesized as empty
/// declarations: a placeholder is an implicit PATH option unless
/// overridden. Returns `None` when the route ends up with no options at
/// all.
pub(crate) fn compile(
    registry: &TypeRegistry,
    placeholders: &[String],
    declared: &IndexMap<String, OptionDecl>,
) -> PeithoResult<Option<Vec<OptionSpec>>> {
    let mut merged = declared.clone();
    for placeholder in placeholders {
        if !merged.contains_key(placeholder) {
            merged.insert(placeholder.clone(), OptionDecl::new());
        }
    }

    if merged.is_empty() {
        return Ok(None);
    }

    let mut specs = Vec::with_capacity(merged.len());
    for (name, decl) in &merged {
        specs.push(build_spec(registry, name, decl)?);
    }
    Ok(Some(specs))
}

/// Builds one compiled spec from its declaration.
fn build_spec(
    registry: &TypeRegistry,
    name: &str,
    decl: &OptionDecl,
) -> PeithoResult<OptionSpec> {
    let property = decl.property.clone().unwrap_or_else(|| name.to_string());
    let target_property = decl
        .target_property
        .clone()
        .unwrap_or_else(|| name.to_string());
    let property_not_name = target_property != name;

    let (type_name, coerce, array) = parse_type(registry, decl.type_name.as_deref())?;

    let source = match decl.source.as_deref() {
        None => SourceKind::Path,
        Some(declared) => SourceKind::from_name(declared)
            .ok_or_else(|| PeithoError::schema(format!("Invalid option source: {declared}")))?,
    };

    let mut spec = OptionSpec {
        name: name.to_string(),
        property,
        target_property,
        property_not_name,
        source,
        type_name,
        coerce,
        array,
        required: decl.required,
        default: decl.default.clone(),
        empty_null: decl.empty_null,
        force_lower_case: decl.force_lower_case,
        force_upper_case: decl.force_upper_case,
        limit: decl.limit,
        header: decl.header.clone(),
    };
    source.init(&mut spec);
    Ok(spec)
}

/// Parses a declared type string.
///
/// A `T[]` suffix sets the array flag and strips to `T`; an empty
/// remaining name means no coercion. Anything else must resolve through
/// the registry.
fn parse_type(
    registry: &TypeRegistry,
    raw: Option<&str>,
) -> PeithoResult<(Option<String>, Option<CoerceFn>, bool)> {
    let Some(raw) = raw else {
        return Ok((None, None, false));
    };

    let (base, array) = match raw.strip_suffix("[]") {
        Some(stripped) => (stripped, true),
        None => (raw, false),
    };

    if base.is_empty() {
        return Ok((None, None, array));
    }

    let coerce = registry
        .resolve(base)
        .ok_or_else(|| PeithoError::schema(format!("Invalid option type: {base}")))?;
    Ok((Some(base.to_uppercase()), Some(coerce), array))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> TypeRegistry {
        TypeRegistry::with_builtins()
    }

    #[test]
    fn test_placeholders_synthesize_implicit_options() {
        let declared = IndexMap::new();
        let placeholders = vec!["orgId".to_string(), "userId".to_string()];

        let specs = compile(&registry(), &placeholders, &declared)
            .unwrap()
            .unwrap();

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "orgId");
        assert_eq!(specs[0].source, SourceKind::Path);
        assert!(specs[0].coerce.is_none());
        assert!(!specs[0].required);
    }

    #[test]
    fn test_declared_placeholder_not_duplicated() {
        let mut declared = IndexMap::new();
        declared.insert("id".to_string(), OptionDecl::new().type_name("integer"));
        let placeholders = vec!["id".to_string()];

        let specs = compile(&registry(), &placeholders, &declared)
            .unwrap()
            .unwrap();

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].type_name.as_deref(), Some("INTEGER"));
    }

    #[test]
    fn test_no_options_and_no_placeholders() {
        let result = compile(&registry(), &[], &IndexMap::new()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_array_suffix_parsing() {
        let mut declared = IndexMap::new();
        declared.insert(
            "tags".to_string(),
            OptionDecl::new().source("query").type_name("string[]"),
        );

        let specs = compile(&registry(), &[], &declared).unwrap().unwrap();
        assert!(specs[0].array);
        assert_eq!(specs[0].type_name.as_deref(), Some("STRING"));
        assert!(specs[0].coerce.is_some());
    }

    #[test]
    fn test_bare_array_suffix_means_untyped_sequence() {
        let mut declared = IndexMap::new();
        declared.insert("items".to_string(), OptionDecl::new().type_name("[]"));

        let specs = compile(&registry(), &[], &declared).unwrap().unwrap();
        assert!(specs[0].array);
        assert!(specs[0].type_name.is_none());
        assert!(specs[0].coerce.is_none());
    }

    #[test]
    fn test_unknown_type_is_schema_error() {
        let mut declared = IndexMap::new();
        declared.insert("w".to_string(), OptionDecl::new().type_name("widget"));

        let err = compile(&registry(), &[], &declared).unwrap_err();
        assert_eq!(err.to_string(), "Schema error: Invalid option type: widget");
    }

    #[test]
    fn test_unknown_source_is_schema_error() {
        let mut declared = IndexMap::new();
        declared.insert("c".to_string(), OptionDecl::new().source("cookie"));

        let err = compile(&registry(), &[], &declared).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Schema error: Invalid option source: cookie"
        );
    }

    #[test]
    fn test_property_and_target_resolution() {
        let mut declared = IndexMap::new();
        declared.insert(
            "user".to_string(),
            OptionDecl::new()
                .source("query")
                .property("user_id")
                .target_property("userId"),
        );
        declared.insert("plain".to_string(), OptionDecl::new().source("query"));

        let specs = compile(&registry(), &[], &declared).unwrap().unwrap();

        assert_eq!(specs[0].property, "user_id");
        assert_eq!(specs[0].target_property, "userId");
        assert!(specs[0].property_not_name);

        assert_eq!(specs[1].property, "plain");
        assert_eq!(specs[1].target_property, "plain");
        assert!(!specs[1].property_not_name);
    }

    #[test]
    fn test_header_source_init_runs() {
        let mut declared = IndexMap::new();
        declared.insert(
            "apiKey".to_string(),
            OptionDecl::new().source("header").property("X-Api-Key"),
        );

        let specs = compile(&registry(), &[], &declared).unwrap().unwrap();
        assert_eq!(specs[0].header.as_deref(), Some("x-api-key"));
    }

    #[test]
    fn test_custom_type_via_resolver_chain() {
        let registry = registry();
        registry.add_resolver(std::sync::Arc::new(|name| {
            (name == "email").then(|| {
                std::sync::Arc::new(|value, _spec: &OptionSpec, _bag: &mut peitho_core::ValueBag| value)
                    as CoerceFn
            })
        }));

        let mut declared = IndexMap::new();
        declared.insert("contact".to_string(), OptionDecl::new().type_name("email"));

        let specs = compile(&registry, &[], &declared).unwrap().unwrap();
        assert_eq!(specs[0].type_name.as_deref(), Some("EMAIL"));
        assert!(registry.contains("EMAIL"));
    }
}
