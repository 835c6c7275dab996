//! Path parameter storage.
//!
//! Parameters captured from a route's path placeholders are stored as
//! (name, value) pairs with a small-vector optimization, since almost every
//! route has four or fewer placeholders.

use smallvec::SmallVec;

/// Number of parameters stored inline before spilling to the heap.
const INLINE_PARAMS: usize = 4;

/// Path parameters captured for one request.
///
/// # Example
///
/// ```
/// use peitho_core::Params;
///
/// let mut params = Params::new();
/// params.push("userId", "42");
///
/// assert_eq!(params.get("userId"), Some("42"));
/// assert_eq!(params.get("orgId"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a captured parameter.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value captured for `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true when `name` was captured.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.inner.iter().any(|(n, _)| n == name)
    }

    /// Returns true when no parameters were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of captured parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates over (name, value) pairs in capture order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_get() {
        let mut params = Params::new();
        params.push("id", "123");
        params.push("section", "posts");

        assert_eq!(params.get("id"), Some("123"));
        assert_eq!(params.get("section"), Some("posts"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_contains() {
        let mut params = Params::new();
        assert!(!params.contains("id"));
        params.push("id", "1");
        assert!(params.contains("id"));
    }

    #[test]
    fn test_iter_preserves_capture_order() {
        let mut params = Params::new();
        params.push("a", "1");
        params.push("b", "2");

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_spills_past_inline_capacity() {
        let mut params = Params::new();
        for i in 0..8 {
            params.push(format!("k{i}"), format!("v{i}"));
        }

        assert_eq!(params.len(), 8);
        assert_eq!(params.get("k6"), Some("v6"));
    }

    #[test]
    fn test_from_iterator() {
        let params: Params = vec![("x".to_string(), "1".to_string())]
            .into_iter()
            .collect();
        assert_eq!(params.get("x"), Some("1"));
    }
}
