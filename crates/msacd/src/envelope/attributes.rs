//! Attribute lists captured from request elements.

use crate::connection::ConnectionError;

/// Attributes of one element, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes {
    entries: Vec<(String, String)>,
}

impl Attributes {
    /// Appends an attribute. Duplicate detection is the parser's job.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push((name.into(), value.into()));
    }

    /// Returns the raw value of `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns `name` parsed as a signed integer.
    ///
    /// Surrounding whitespace and a leading sign are accepted. A value that
    /// does not parse is treated the same as a missing one.
    #[must_use]
    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.get(name).and_then(|value| value.trim().parse().ok())
    }

    /// Returns `name` parsed as `true`/`false`, ignoring case and
    /// surrounding whitespace.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        let value = self.get(name)?.trim();
        if value.eq_ignore_ascii_case("true") {
            Some(true)
        } else if value.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }

    /// Returns `name` or a protocol error naming the owning element.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Protocol`] when the attribute is absent.
    pub fn require(&self, element: &str, name: &str) -> Result<&str, ConnectionError> {
        self.get(name)
            .ok_or_else(|| ConnectionError::missing_attribute(element, name))
    }

    /// Returns `name` as an integer or a protocol error.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectionError::Protocol`] when the attribute is absent or
    /// not an integer.
    pub fn require_i32(&self, element: &str, name: &str) -> Result<i32, ConnectionError> {
        self.get_i32(name)
            .ok_or_else(|| ConnectionError::missing_attribute(element, name))
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the element carried no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(name, value)` pairs in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<N, V> FromIterator<(N, V)> for Attributes
where
    N: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut attributes = Self::default();
        for (name, value) in iter {
            attributes.insert(name, value);
        }
        attributes
    }
}
