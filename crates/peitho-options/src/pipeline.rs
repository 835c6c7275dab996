//! Per-request binding pipeline.
//!
//! Three phases over the compiled spec list:
//!
//! 1. **Extraction** — each spec's source reads its raw value into the bag,
//!    or enqueues an asynchronous payload job.
//! 2. **Aggregation** — queued jobs run concurrently; the pipeline waits
//!    for all of them. A transport failure aborts the request; soft errors
//!    accumulate without affecting sibling jobs.
//! 3. **Validation** — default/required rules, array normalization, and
//!    type coercion, uniformly for every spec regardless of source.
//!
//! Soft errors collected anywhere merge into one aggregate validation
//! error, so a caller sees every problem in a single report.

use crate::option::OptionSpec;
use futures_util::future::try_join_all;
use peitho_core::{PeithoResult, RequestContext, Value, ValueBag};

/// Runs the full extraction/aggregation/validation flow for one request.
pub(crate) async fn bind(specs: &[OptionSpec], ctx: &RequestContext) -> PeithoResult<ValueBag> {
    let mut bag = ValueBag::new();

    extract(specs, ctx, &mut bag);
    if bag.has_errors() {
        return Err(bag.aggregate_error());
    }

    if bag.has_jobs() {
        run_jobs(&mut bag).await?;
        if bag.has_errors() {
            return Err(bag.aggregate_error());
        }
    }

    parse_options(&mut bag, specs)?;
    Ok(bag)
}

/// Extraction pass: reads every spec's source in declaration order.
///
/// Order matters only for OPTIONS-sourced specs, which may read values
/// written by earlier specs in the same pass.
pub(crate) fn extract(specs: &[OptionSpec], ctx: &RequestContext, bag: &mut ValueBag) {
    for spec in specs {
        spec.source.read(spec, ctx, bag);
    }
}

/// Aggregation pass: drains the job queue and runs all jobs concurrently.
///
/// Waits for every job to finish. The first hard failure aborts the join
/// and surfaces as the request's fatal error; completed outcomes merge
/// into the bag afterwards.
pub(crate) async fn run_jobs(bag: &mut ValueBag) -> PeithoResult<()> {
    let jobs = bag.take_jobs();
    if jobs.is_empty() {
        return Ok(());
    }

    tracing::trace!(jobs = jobs.len(), "Running payload jobs");
    let outcomes = match try_join_all(jobs).await {
        Ok(outcomes) => outcomes,
        Err(err) => {
            tracing::warn!(error = %err, "Payload job failed");
            return Err(err);
        }
    };

    for outcome in outcomes {
        bag.apply_outcome(outcome);
    }
    Ok(())
}

/// Validation pass over a pre-populated bag.
///
/// Reusable outside a request, e.g. to validate programmatic or RPC input
/// against the same compiled schema. Applies default/required rules, array
/// normalization, and coercion for every spec, then merges any soft errors
/// into one aggregate validation error.
pub fn parse_options(bag: &mut ValueBag, specs: &[OptionSpec]) -> PeithoResult<()> {
    for spec in specs {
        validate_spec(spec, bag);
    }

    if bag.has_errors() {
        return Err(bag.aggregate_error());
    }
    Ok(())
}

/// Applies one spec's validation and coercion rules to the bag.
fn validate_spec(spec: &OptionSpec, bag: &mut ValueBag) {
    let mut value = bag.remove(&spec.target_property);
    if value.is_none() && spec.property_not_name {
        value = bag.remove(&spec.name);
    }

    let Some(value) = value else {
        if let Some(default) = &spec.default {
            bag.insert(spec.target_property.clone(), default.clone());
        } else if spec.required {
            bag.add_error(&spec.name, "Required");
        }
        return;
    };

    let value = if let Some(coerce) = &spec.coerce {
        if spec.array {
            let items = value.into_array();
            if items.is_empty() && spec.required {
                bag.add_error(&spec.name, "Required");
                return;
            }
            let coerced = items
                .into_iter()
                .map(|item| coerce(item, spec, bag))
                .collect();
            Value::Array(coerced)
        } else {
            coerce(value, spec, bag)
        }
    } else if spec.array {
        let items = value.into_array();
        if items.is_empty() && spec.required {
            bag.add_error(&spec.name, "Required");
            return;
        }
        Value::Array(items)
    } else {
        value
    };

    bag.insert(spec.target_property.clone(), value);
}
