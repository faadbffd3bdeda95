use std::collections::{BTreeMap, BTreeSet};

/// Every distinct error message seen during the run, keyed by source file name.
///
/// Entries only ever grow; a key exists only once at least one message was merged into it.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: BTreeMap<String, BTreeSet<String>>,
}

impl ErrorAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union `messages` into the set stored under `name`
    pub fn merge<I>(&mut self, name: &str, messages: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut messages = messages.into_iter().peekable();
        if messages.peek().is_none() {
            return;
        }
        self.errors
            .entry(name.to_string())
            .or_default()
            .extend(messages);
    }

    /// All merged errors so far
    pub fn snapshot(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.errors
    }

    /// Sum of the unique messages across all files
    pub fn total(&self) -> usize {
        self.errors.values().map(BTreeSet::len).sum()
    }

    /// Number of file names with at least one error
    pub fn files(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}
