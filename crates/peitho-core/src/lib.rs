//! # Peitho Core
//!
//! Core types for the Peitho option binding toolkit.
//!
//! This crate defines the vocabulary shared between the binding pipeline
//! and its collaborators:
//!
//! - [`PeithoError`] — classified errors with HTTP status mapping
//! - [`Value`] — the dynamic value union carried through the pipeline
//! - [`Params`] — captured path parameters
//! - [`RequestContext`] — the transport boundary, built per request
//! - [`PayloadSource`] — async access to the raw request payload
//! - [`ValueBag`] — the per-request accumulator of values, soft errors,
//!   and pending payload jobs
//!
//! The compilation and per-request binding machinery lives in
//! `peitho-options`.

#![doc(html_root_url = "https://docs.rs/peitho-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bag;
mod context;
mod error;
mod params;
mod value;

pub use bag::{Job, JobOutcome, ValueBag};
pub use context::{
    BufferedPayload, PayloadSource, PropertyMap, RequestContext, RequestContextBuilder,
};
pub use error::{ErrorCategory, FieldError, PeithoError, PeithoResult};
pub use params::Params;
pub use value::Value;
