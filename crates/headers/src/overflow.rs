//! Fallback storage for header identities without a dedicated slot.
//!
//! The map preserves insertion order and looks names up case-insensitively.
//! It is created lazily by the owning collection on the first unknown header
//! and cleared on recycle, so a request touching only known headers never
//! pays for it.

use crate::value::HeaderValues;

#[derive(Debug, Default)]
pub(crate) struct OverflowMap {
    entries: Vec<(String, HeaderValues)>,
}

impl OverflowMap {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|(key, _)| key.eq_ignore_ascii_case(name))
    }

    /// Appends one value under `name`, creating the entry at the tail when the
    /// name is new. The name keeps the spelling of its first arrival.
    pub(crate) fn append(&mut self, name: String, value: String) {
        match self.position(&name) {
            Some(index) => self.entries[index].1.push(value),
            None => self.entries.push((name, HeaderValues::one(value))),
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&HeaderValues> {
        self.position(name).map(|index| &self.entries[index].1)
    }

    /// Replaces the values for `name`, keeping its original position, or
    /// inserts a new entry at the tail.
    pub(crate) fn set(&mut self, name: &str, values: HeaderValues) {
        match self.position(name) {
            Some(index) => self.entries[index].1 = values,
            None => self.entries.push((name.to_owned(), values)),
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn entries(&self) -> &[(String, HeaderValues)] {
        &self.entries
    }
}
