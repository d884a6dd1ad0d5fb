use std::collections::BTreeMap;

/// Numeric variables a dice formula can reference as `@path`.
///
/// Keys are dotted paths without the leading `@`, e.g.
/// `abilities.strength.value`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollData {
    values: BTreeMap<String, i64>,
}

impl RollData {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a variable.
    pub fn insert(&mut self, path: impl Into<String>, value: i64) {
        self.values.insert(path.into(), value);
    }

    /// Builder-style insert.
    pub fn with(mut self, path: impl Into<String>, value: i64) -> Self {
        self.insert(path, value);
        self
    }

    /// Look up a variable by path.
    pub fn get(&self, path: &str) -> Option<i64> {
        self.values.get(path).copied()
    }

    /// Number of variables in the context.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no variables are defined.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
