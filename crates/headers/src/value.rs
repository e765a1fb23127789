//! Multi-value header text fields.
//!
//! A [`HeaderValues`] holds the ordered text values of a single header
//! identity. Absence is represented by the owning collection's presence bit,
//! never by the field itself, so the common single-value case stores exactly
//! one `String` with no surrounding allocation.

use std::fmt;
use std::slice;

/// An ordered sequence of zero, one, or many text values for one header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderValues(Inner);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
enum Inner {
    #[default]
    Empty,
    One(String),
    Many(Vec<String>),
}

impl HeaderValues {
    pub fn new() -> Self {
        Self(Inner::Empty)
    }

    /// A field holding a single value.
    pub fn one(value: impl Into<String>) -> Self {
        Self(Inner::One(value.into()))
    }

    pub fn len(&self) -> usize {
        match &self.0 {
            Inner::Empty => 0,
            Inner::One(_) => 1,
            Inner::Many(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.0, Inner::Empty)
    }

    /// True when the field carries no usable value: zero values, or a single
    /// empty string. Setting such a field is defined as removal.
    pub(crate) fn is_unset(&self) -> bool {
        match &self.0 {
            Inner::Empty => true,
            Inner::One(value) => value.is_empty(),
            Inner::Many(values) => values.is_empty(),
        }
    }

    pub fn first(&self) -> Option<&str> {
        self.as_slice().first().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.as_slice().get(index).map(String::as_str)
    }

    /// The value when the field holds exactly one.
    pub(crate) fn single(&self) -> Option<&str> {
        match &self.0 {
            Inner::One(value) => Some(value),
            _ => None,
        }
    }

    /// Appends a value, preserving arrival order.
    pub fn push(&mut self, value: String) {
        match &mut self.0 {
            Inner::Empty => self.0 = Inner::One(value),
            Inner::One(_) => {
                let Inner::One(first) = std::mem::take(&mut self.0) else { unreachable!() };
                self.0 = Inner::Many(vec![first, value]);
            }
            Inner::Many(values) => values.push(value),
        }
    }

    pub(crate) fn take(&mut self) -> Self {
        std::mem::take(self)
    }

    pub(crate) fn into_first(self) -> Option<String> {
        match self.0 {
            Inner::Empty => None,
            Inner::One(value) => Some(value),
            Inner::Many(values) => values.into_iter().next(),
        }
    }

    pub fn as_slice(&self) -> &[String] {
        match &self.0 {
            Inner::Empty => &[],
            Inner::One(value) => slice::from_ref(value),
            Inner::Many(values) => values,
        }
    }

    pub fn iter(&self) -> ValuesIter<'_> {
        ValuesIter(self.as_slice().iter())
    }
}

impl fmt::Display for HeaderValues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(value)?;
        }
        Ok(())
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        Self(Inner::One(value))
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        Self(Inner::One(value.to_owned()))
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        match values.len() {
            0 => Self(Inner::Empty),
            1 => Self(Inner::One(values.into_iter().next().unwrap_or_default())),
            _ => Self(Inner::Many(values)),
        }
    }
}

impl FromIterator<String> for HeaderValues {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Self::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a> IntoIterator for &'a HeaderValues {
    type Item = &'a str;
    type IntoIter = ValuesIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the values of a field, in arrival order.
#[derive(Debug)]
pub struct ValuesIter<'a>(slice::Iter<'a, String>);

impl<'a> Iterator for ValuesIter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(String::as_str)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl ExactSizeIterator for ValuesIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_arrival_order() {
        let mut values = HeaderValues::new();
        values.push("first".to_owned());
        values.push("second".to_owned());
        values.push("third".to_owned());

        assert_eq!(values.len(), 3);
        assert_eq!(values.iter().collect::<Vec<_>>(), ["first", "second", "third"]);
        assert_eq!(values.first(), Some("first"));
        assert_eq!(values.get(2), Some("third"));
    }

    #[test]
    fn single_only_for_exactly_one_value() {
        assert_eq!(HeaderValues::new().single(), None);
        assert_eq!(HeaderValues::one("v").single(), Some("v"));

        let mut values = HeaderValues::one("a");
        values.push("b".to_owned());
        assert_eq!(values.single(), None);
    }

    #[test]
    fn empty_string_counts_as_unset() {
        assert!(HeaderValues::new().is_unset());
        assert!(HeaderValues::one("").is_unset());
        assert!(!HeaderValues::one("x").is_unset());
        assert!(HeaderValues::from(Vec::<String>::new()).is_unset());
    }

    #[test]
    fn display_joins_with_comma() {
        let mut values = HeaderValues::one("gzip");
        values.push("br".to_owned());
        assert_eq!(values.to_string(), "gzip, br");
    }
}
