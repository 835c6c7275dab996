//! # Peitho
//!
//! **Declarative route option binding and validation**
//!
//! Peitho lets a route declare the inputs its handler needs — path
//! parameters, query values, headers, body payloads, connection properties,
//! values produced by earlier middleware — and binds them into a single
//! validated, typed value bag. Handlers never touch raw transport objects.
//!
//! ## Quick Start
//!
//! ```rust
//! use peitho::prelude::*;
//! use http::Method;
//!
//! # tokio_test::block_on(async {
//! let binder = Binder::new();
//!
//! let mut route = Route::new("/users/{id}")
//!     .option("id", OptionDecl::new().type_name("integer"))
//!     .option(
//!         "page",
//!         OptionDecl::new()
//!             .source("query")
//!             .type_name("integer")
//!             .default_value(1i64),
//!     );
//! binder.compile_route(&mut route)?;
//!
//! let ctx = RequestContext::builder()
//!     .method(Method::GET)
//!     .uri("/users/42".parse().unwrap())
//!     .path_param("id", "42")
//!     .build();
//!
//! let bag = binder.handle_request(&route, &ctx).await?;
//! assert_eq!(bag.get("id"), Some(&Value::Int(42)));
//! assert_eq!(bag.get("page"), Some(&Value::Int(1)));
//! # Ok::<(), PeithoError>(())
//! # }).unwrap();
//! ```
//!
//! ## Architecture
//!
//! Per request, a compiled route flows through three phases:
//!
//! ```text
//! Extraction → Payload jobs (concurrent) → Validation/Coercion → handler
//!                     │                          │
//!                     └── hard failure           └── aggregate error
//! ```
//!
//! Compilation happens once per route; unknown type or source names fail
//! registration, never a request.

#![doc(html_root_url = "https://docs.rs/peitho/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use peitho_core as core;

// Re-export the binding machinery
pub use peitho_options as options;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use peitho::prelude::*;
/// ```
pub mod prelude {
    pub use peitho_core::{
        BufferedPayload, ErrorCategory, FieldError, Params, PayloadSource, PeithoError,
        PeithoResult, RequestContext, Value, ValueBag,
    };

    pub use peitho_options::{
        parse_options, Binder, OptionDecl, OptionSpec, PreHandler, Route, SourceKind,
        TypeRegistry,
    };
}
