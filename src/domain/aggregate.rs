use std::collections::BTreeMap;

use crate::domain::bug::Bug;

/// Bugs of every configured query, keyed by descriptor key. Only ever built
/// complete; a failed descriptor yields no aggregate at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    bugs: BTreeMap<String, Vec<Bug>>,
}

impl Aggregate {
    pub fn new(bugs: BTreeMap<String, Vec<Bug>>) -> Self {
        Self { bugs }
    }

    pub fn get(&self, key: &str) -> &[Bug] {
        self.bugs.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bugs.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.bugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bugs.is_empty()
    }

    pub fn total_bugs(&self) -> usize {
        self.bugs.values().map(Vec::len).sum()
    }
}
