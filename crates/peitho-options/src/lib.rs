//! # Peitho Options
//!
//! Declarative option compilation, extraction, and validation for routes.
//!
//! Handlers declare *what* they need and *where* it comes from; Peitho
//! performs extraction, type coercion, defaulting, required-field checking,
//! and error aggregation uniformly, so handler code never touches raw
//! transport objects.
//!
//! ## Overview
//!
//! | Piece | Role |
//! |-------|------|
//! | [`OptionDecl`] | Declared option on a route (hand-written or from config) |
//! | [`OptionSpec`] | Compiled, immutable descriptor with source and coercer resolved |
//! | [`SourceKind`] | Where a raw value originates (path, query, header, body, …) |
//! | [`TypeRegistry`] | Type name → coercion function, with fallback resolvers |
//! | [`Binder`] | Compiles routes and binds requests against them |
//!
//! ## Example
//!
//! ```
//! use peitho_options::{Binder, OptionDecl, Route};
//! use peitho_core::{RequestContext, Value};
//! use http::Method;
//!
//! # tokio_test::block_on(async {
//! let binder = Binder::new();
//!
//! let mut route = Route::new("/orgs/{orgId}/members")
//!     .option("orgId", OptionDecl::new().type_name("string"))
//!     .option(
//!         "limit",
//!         OptionDecl::new()
//!             .source("query")
//!             .type_name("integer")
//!             .default_value(25i64),
//!     );
//! binder.compile_route(&mut route).unwrap();
//!
//! let ctx = RequestContext::builder()
//!     .method(Method::GET)
//!     .uri("/orgs/acme/members".parse().unwrap())
//!     .path_param("orgId", "acme")
//!     .build();
//!
//! let bag = binder.handle_request(&route, &ctx).await.unwrap();
//! assert_eq!(bag.get("orgId"), Some(&Value::from("acme")));
//! assert_eq!(bag.get("limit"), Some(&Value::Int(25)));
//! # });
//! ```
//!
//! ## Error model
//!
//! Validation problems (missing required values, coercion failures,
//! malformed payload content) accumulate across *all* declared options and
//! surface as one aggregate error, so clients see every problem in a single
//! report. Schema mistakes (unknown type or source names) fail at route
//! compilation, and payload transport failures abort the request
//! immediately.

#![doc(html_root_url = "https://docs.rs/peitho-options/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod coerce;
mod compiler;
mod option;
mod pipeline;
mod registry;
mod route;
mod source;

pub use binder::Binder;
pub use option::{OptionDecl, OptionSpec};
pub use pipeline::parse_options;
pub use registry::{global as global_registry, CoerceFn, TypeRegistry, TypeResolver};
pub use route::{PreHandler, Route};
pub use source::SourceKind;

// Re-export the core vocabulary used at every call site
pub use peitho_core::{
    FieldError, Params, PeithoError, PeithoResult, RequestContext, Value, ValueBag,
};
