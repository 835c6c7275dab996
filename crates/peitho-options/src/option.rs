//! Declared and compiled option descriptors.
//!
//! A route owner authors [`OptionDecl`]s — by hand or deserialized from
//! configuration. Compilation turns each declaration into an immutable
//! [`OptionSpec`] with its source strategy and coercion function resolved,
//! so no string dispatch happens per request.

use crate::registry::CoerceFn;
use crate::source::SourceKind;
use peitho_core::Value;
use serde::{Deserialize, Serialize};

/// A declared option on a route, before compilation.
///
/// All fields are optional; an empty declaration describes a required-less,
/// uncoerced PATH parameter. Declarations deserialize from camelCase keys
/// so route schemas can live in JSON configuration:
///
/// ```
/// use peitho_options::OptionDecl;
///
/// let decl: OptionDecl = serde_json::from_str(
///     r#"{"type": "string[]", "source": "query", "required": true}"#,
/// ).unwrap();
/// assert_eq!(decl.type_name.as_deref(), Some("string[]"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OptionDecl {
    /// Source-side lookup key; defaults to the declared name.
    pub property: Option<String>,
    /// Destination key in the value bag; defaults to the declared name.
    pub target_property: Option<String>,
    /// Source strategy name (case-insensitive); defaults to `path`.
    pub source: Option<String>,
    /// Type name, optionally suffixed `[]` for an array of that type.
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    /// Record a `Required` error when the value is absent.
    pub required: bool,
    /// Value used when the input is absent; written verbatim, not coerced.
    pub default: Option<Value>,
    /// Coerce an empty string to null (string type).
    pub empty_null: bool,
    /// Fold the coerced string to lower case (string type).
    pub force_lower_case: bool,
    /// Fold the coerced string to upper case (string type).
    pub force_upper_case: bool,
    /// Byte limit handed to the payload read (body source).
    pub limit: Option<usize>,
    /// Header name to read; defaults to the property, lower-cased
    /// (header source).
    pub header: Option<String>,
}

impl OptionDecl {
    /// Creates an empty declaration (all defaults).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source-side lookup key.
    #[must_use]
    pub fn property(mut self, property: impl Into<String>) -> Self {
        self.property = Some(property.into());
        self
    }

    /// Sets the destination key in the value bag.
    #[must_use]
    pub fn target_property(mut self, target: impl Into<String>) -> Self {
        self.target_property = Some(target.into());
        self
    }

    /// Sets the source strategy by name.
    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the declared type name, e.g. `"integer"` or `"string[]"`.
    #[must_use]
    pub fn type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    /// Marks the option required.
    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value for an absent input.
    #[must_use]
    pub fn default_value(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Coerces an empty string input to null.
    #[must_use]
    pub fn empty_null(mut self) -> Self {
        self.empty_null = true;
        self
    }

    /// Folds the coerced string to lower case.
    #[must_use]
    pub fn force_lower_case(mut self) -> Self {
        self.force_lower_case = true;
        self
    }

    /// Folds the coerced string to upper case.
    #[must_use]
    pub fn force_upper_case(mut self) -> Self {
        self.force_upper_case = true;
        self
    }

    /// Bounds the payload read in bytes.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Names the header to read.
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }
}

/// A compiled option, immutable once its route is compiled.
///
/// Source and coercion are resolved; per-request processing only walks the
/// spec list and dispatches on the already-resolved strategy and function.
#[derive(Clone)]
pub struct OptionSpec {
    /// Declared key in the route's option map; also the fallback input key.
    pub name: String,
    /// Source-side lookup key.
    pub property: String,
    /// Destination key in the value bag.
    pub target_property: String,
    /// True when `target_property` differs from `name`, enabling the
    /// alternate-key fallback during validation.
    pub property_not_name: bool,
    /// Extraction strategy.
    pub source: SourceKind,
    /// Resolved type name, upper-cased; `None` means no coercion.
    pub type_name: Option<String>,
    /// Resolved coercion function.
    pub coerce: Option<CoerceFn>,
    /// Input normalizes to a sequence of the declared type.
    pub array: bool,
    /// Absent input records a `Required` error.
    pub required: bool,
    /// Value written verbatim when the input is absent.
    pub default: Option<Value>,
    /// Empty string coerces to null.
    pub empty_null: bool,
    /// Coerced string folds to lower case.
    pub force_lower_case: bool,
    /// Coerced string folds to upper case.
    pub force_upper_case: bool,
    /// Byte limit handed to the payload read.
    pub limit: Option<usize>,
    /// Resolved header name (header source only).
    pub header: Option<String>,
}

impl std::fmt::Debug for OptionSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionSpec")
            .field("name", &self.name)
            .field("property", &self.property)
            .field("target_property", &self.target_property)
            .field("source", &self.source)
            .field("type_name", &self.type_name)
            .field("array", &self.array)
            .field("required", &self.required)
            .finish_non_exhaustive()
    }
}
