//! Extraction source strategies.
//!
//! Every compiled option reads its raw value from exactly one source. The
//! set is closed: source names resolve to a [`SourceKind`] once at compile
//! time and per-request processing dispatches on the enum, never on
//! strings.
//!
//! All sources except [`SourceKind::Body`] read synchronously. Body reads
//! enqueue an asynchronous job on the value bag; the aggregation phase runs
//! all queued jobs concurrently and merges their outcomes.

use crate::option::OptionSpec;
use bytes::Bytes;
use peitho_core::{FieldError, JobOutcome, RequestContext, Value, ValueBag};
use std::fmt;

/// Where an option's raw value originates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Path parameter captured from a route placeholder. The default.
    Path,
    /// Parsed query-string entry.
    Query,
    /// Request header, looked up case-insensitively.
    Header,
    /// Request payload, read asynchronously.
    Body,
    /// Value an earlier middleware stored on the request context.
    Rest,
    /// Value already present on the value bag, written earlier in the same
    /// extraction pass.
    Options,
    /// Property of the connection sub-object.
    Connection,
    /// Property of the url sub-object.
    Url,
    /// Property of the request sub-object.
    Request,
    /// Property of the response sub-object.
    Response,
}

impl SourceKind {
    /// Resolves a declared source name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_uppercase().as_str() {
            "PATH" => Some(Self::Path),
            "QUERY" => Some(Self::Query),
            "HEADER" => Some(Self::Header),
            "BODY" => Some(Self::Body),
            "REST" => Some(Self::Rest),
            "OPTIONS" => Some(Self::Options),
            "CONNECTION" => Some(Self::Connection),
            "URL" => Some(Self::Url),
            "REQUEST" => Some(Self::Request),
            "RESPONSE" => Some(Self::Response),
            _ => None,
        }
    }

    /// Returns the canonical source name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Path => "PATH",
            Self::Query => "QUERY",
            Self::Header => "HEADER",
            Self::Body => "BODY",
            Self::Rest => "REST",
            Self::Options => "OPTIONS",
            Self::Connection => "CONNECTION",
            Self::Url => "URL",
            Self::Request => "REQUEST",
            Self::Response => "RESPONSE",
        }
    }

    /// One-time spec initialization at compile time.
    ///
    /// Header sources default the header name to the property, lower-cased.
    pub(crate) fn init(&self, spec: &mut OptionSpec) {
        if *self == Self::Header && spec.header.is_none() {
            spec.header = Some(spec.property.to_lowercase());
        }
    }

    /// Reads the raw value for `spec` from the request, writing it to the
    /// bag under the spec's target property or enqueuing a payload job.
    ///
    /// A source that finds nothing writes nothing; absence is resolved by
    /// the default/required rules during validation.
    pub(crate) fn read(&self, spec: &OptionSpec, ctx: &RequestContext, bag: &mut ValueBag) {
        let value = match self {
            Self::Path => ctx.path_params().get(&spec.property).map(Value::from),
            Self::Query => ctx.query_value(&spec.property).cloned(),
            Self::Header => spec
                .header
                .as_deref()
                .and_then(|name| ctx.header(name))
                .map(Value::from),
            Self::Rest => ctx.extension(&spec.property).cloned(),
            Self::Options => bag.get(&spec.property).cloned(),
            Self::Connection => ctx.connection().get(&spec.property).cloned(),
            Self::Url => ctx.url().get(&spec.property).cloned(),
            Self::Request => ctx.request().get(&spec.property).cloned(),
            Self::Response => ctx.response().get(&spec.property).cloned(),
            Self::Body => {
                enqueue_payload_job(spec, ctx, bag);
                return;
            }
        };

        if let Some(value) = value {
            bag.insert(spec.target_property.clone(), value);
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How payload bytes are interpreted, fixed by the declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadShape {
    /// Raw bytes, for buffer-typed options.
    Raw,
    /// UTF-8 text, for string-typed and untyped options.
    Text,
    /// Structurally parsed JSON, for everything else.
    Json,
}

impl PayloadShape {
    fn for_spec(spec: &OptionSpec) -> Self {
        match spec.type_name.as_deref() {
            Some("BUFFER") => Self::Raw,
            Some("STRING") | None => Self::Text,
            Some(_) => Self::Json,
        }
    }
}

/// Queues the asynchronous payload read for a body-sourced option.
///
/// The job owns everything it needs; it shares no state with sibling jobs.
/// Interpretation failures complete the job with a soft error scoped to the
/// option, while transport failures surface as the job's `Err` and abort
/// the request.
fn enqueue_payload_job(spec: &OptionSpec, ctx: &RequestContext, bag: &mut ValueBag) {
    let payload = ctx.payload();
    let name = spec.name.clone();
    let target = spec.target_property.clone();
    let limit = spec.limit;
    let shape = PayloadShape::for_spec(spec);

    bag.add_job(Box::pin(async move {
        let bytes = payload.read(limit).await?;
        if bytes.is_empty() {
            return Ok(JobOutcome::Absent);
        }
        Ok(match interpret_payload(bytes, shape) {
            Ok(value) => JobOutcome::Resolved { target, value },
            Err(message) => JobOutcome::SoftError(FieldError::new(name, message)),
        })
    }));
}

/// Interprets collected payload bytes according to the declared type.
fn interpret_payload(bytes: Bytes, shape: PayloadShape) -> Result<Value, String> {
    match shape {
        PayloadShape::Raw => Ok(Value::Bytes(bytes)),
        PayloadShape::Text => match String::from_utf8(bytes.to_vec()) {
            Ok(text) => Ok(Value::String(text)),
            Err(_) => Err("Invalid request body".to_string()),
        },
        PayloadShape::Json => match serde_json::from_slice::<serde_json::Value>(&bytes) {
            Ok(json) => Ok(Value::from(json)),
            Err(_) => Err("Invalid request body".to_string()),
        },
    }
}
