//! Per-request value accumulator.
//!
//! A [`ValueBag`] is created when a request enters the binding pipeline and
//! discarded once the handler has been invoked or an error surfaced. It
//! collects three things: resolved key→value entries, soft validation
//! errors, and pending asynchronous payload jobs. All three capabilities
//! are built in from construction.

use crate::{FieldError, PeithoError, PeithoResult, Value};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Result of one completed asynchronous payload job.
///
/// A job either produced a value for a destination key or recorded a soft
/// error scoped to its option. Transport failures are returned as the
/// job's `Err` instead and abort the request.
#[derive(Debug)]
pub enum JobOutcome {
    /// The payload was read and interpreted; store `value` under `target`.
    Resolved {
        /// Destination key in the bag.
        target: String,
        /// Interpreted payload value.
        value: Value,
    },
    /// The payload bytes could not be interpreted for this option.
    SoftError(FieldError),
    /// The payload was empty; default/required rules decide later.
    Absent,
}

/// A queued asynchronous unit of work, typically a payload read.
pub type Job = Pin<Box<dyn Future<Output = PeithoResult<JobOutcome>> + Send + 'static>>;

/// Mutable accumulator of resolved values, soft errors, and pending jobs
/// for one request.
///
/// # Example
///
/// ```
/// use peitho_core::{Value, ValueBag};
///
/// let mut bag = ValueBag::new();
/// bag.insert("id", Value::Int(42));
/// bag.add_error("tags", "Required");
///
/// assert_eq!(bag.get("id"), Some(&Value::Int(42)));
/// assert!(bag.has_errors());
/// ```
#[derive(Default)]
pub struct ValueBag {
    values: HashMap<String, Value>,
    errors: Vec<FieldError>,
    jobs: Vec<Job>,
}

impl std::fmt::Debug for ValueBag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueBag")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("pending_jobs", &self.jobs.len())
            .finish()
    }
}

impl ValueBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a bag pre-populated with the given entries.
    ///
    /// Used when validating programmatic input against a compiled schema
    /// outside of a request.
    #[must_use]
    pub fn from_values(values: HashMap<String, Value>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Stores a value under `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Returns the value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Removes and returns the value stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Returns true when a value is stored under `key`.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Returns the resolved entries.
    #[must_use]
    pub fn values(&self) -> &HashMap<String, Value> {
        &self.values
    }

    /// Consumes the bag, returning the resolved entries.
    #[must_use]
    pub fn into_values(self) -> HashMap<String, Value> {
        self.values
    }

    /// Records a soft error scoped to the named option.
    ///
    /// Soft errors never stop processing of sibling options; they are
    /// aggregated into one validation error at the end of the pipeline.
    pub fn add_error(&mut self, option: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(option, message));
    }

    /// Returns the soft errors recorded so far, in order.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns true when any soft error has been recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Merges all recorded soft errors into one aggregate validation error.
    #[must_use]
    pub fn aggregate_error(&mut self) -> PeithoError {
        PeithoError::validation(std::mem::take(&mut self.errors))
    }

    /// Queues an asynchronous job for the aggregation phase.
    pub fn add_job(&mut self, job: Job) {
        self.jobs.push(job);
    }

    /// Returns true when jobs are queued.
    #[must_use]
    pub fn has_jobs(&self) -> bool {
        !self.jobs.is_empty()
    }

    /// Drains the job queue for execution.
    #[must_use]
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut self.jobs)
    }

    /// Merges one completed job outcome into the bag.
    pub fn apply_outcome(&mut self, outcome: JobOutcome) {
        match outcome {
            JobOutcome::Resolved { target, value } => {
                self.values.insert(target, value);
            }
            JobOutcome::SoftError(error) => self.errors.push(error),
            JobOutcome::Absent => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut bag = ValueBag::new();
        bag.insert("a", Value::from("x"));

        assert!(bag.contains("a"));
        assert_eq!(bag.get("a"), Some(&Value::from("x")));
        assert_eq!(bag.remove("a"), Some(Value::from("x")));
        assert!(!bag.contains("a"));
    }

    #[test]
    fn test_errors_accumulate_in_order() {
        let mut bag = ValueBag::new();
        assert!(!bag.has_errors());

        bag.add_error("first", "Required");
        bag.add_error("second", "Invalid number: x");

        let err = bag.aggregate_error();
        assert_eq!(err.to_string(), "first: Required. second: Invalid number: x");
        assert!(!bag.has_errors());
    }

    #[test]
    fn test_jobs_drain() {
        let mut bag = ValueBag::new();
        assert!(!bag.has_jobs());

        bag.add_job(Box::pin(async {
            Ok(JobOutcome::Resolved {
                target: "payload".to_string(),
                value: Value::Null,
            })
        }));
        assert!(bag.has_jobs());

        let jobs = bag.take_jobs();
        assert_eq!(jobs.len(), 1);
        assert!(!bag.has_jobs());
    }

    #[test]
    fn test_apply_outcome() {
        let mut bag = ValueBag::new();

        bag.apply_outcome(JobOutcome::Resolved {
            target: "body".to_string(),
            value: Value::from("text"),
        });
        bag.apply_outcome(JobOutcome::SoftError(FieldError::new(
            "payload",
            "Invalid request body",
        )));

        assert_eq!(bag.get("body"), Some(&Value::from("text")));
        assert_eq!(bag.errors().len(), 1);
    }

    #[test]
    fn test_from_values() {
        let mut values = HashMap::new();
        values.insert("id".to_string(), Value::from("42"));

        let bag = ValueBag::from_values(values);
        assert_eq!(bag.get("id"), Some(&Value::from("42")));
        assert!(!bag.has_errors());
    }
}
