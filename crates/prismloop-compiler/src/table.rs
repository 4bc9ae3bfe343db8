use std::collections::BTreeMap;
use std::sync::Arc;

/// Failures reported by a probability-table collaborator. The compiler
/// passes them through unchanged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TableError {
    #[error("No table entry for {assignment}")]
    MissingEntry { assignment: String },

    #[error("Probability {value} for {assignment} is outside [0, 1]")]
    OutOfRange { assignment: String, value: f64 },

    #[error("Table fit failed: {reason}")]
    Fit { reason: String },
}

/// Lookup side of a fitted conditional probability table, keyed by named
/// variable assignments (`[("gt", 1), ("obs", 0)]`).
pub trait ProbabilityTable: Send + Sync {
    fn get_value(&self, assignment: &[(&str, i64)]) -> Result<f64, TableError>;
}

/// A table that can be fitted from sample tuples.
pub trait FitTable: ProbabilityTable {
    fn fit(&mut self, samples: &[Vec<i64>]) -> Result<(), TableError>;
}

impl<T: ProbabilityTable + ?Sized> ProbabilityTable for Arc<T> {
    fn get_value(&self, assignment: &[(&str, i64)]) -> Result<f64, TableError> {
        (**self).get_value(assignment)
    }
}

impl<T: ProbabilityTable + ?Sized> ProbabilityTable for &T {
    fn get_value(&self, assignment: &[(&str, i64)]) -> Result<f64, TableError> {
        (**self).get_value(assignment)
    }
}

/// Precomputed probabilities held in memory.
///
/// Keys are order-insensitive: `[("gt", 1), ("obs", 0)]` and
/// `[("obs", 0), ("gt", 1)]` address the same entry.
#[derive(Debug, Clone, Default)]
pub struct StaticTable {
    entries: BTreeMap<Vec<(String, i64)>, f64>,
}

impl StaticTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, assignment: &[(&str, i64)], probability: f64) -> Result<(), TableError> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(TableError::OutOfRange {
                assignment: describe(assignment),
                value: probability,
            });
        }
        self.entries.insert(key(assignment), probability);
        Ok(())
    }

    pub fn with(mut self, assignment: &[(&str, i64)], probability: f64) -> Result<Self, TableError> {
        self.insert(assignment, probability)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ProbabilityTable for StaticTable {
    fn get_value(&self, assignment: &[(&str, i64)]) -> Result<f64, TableError> {
        self.entries
            .get(&key(assignment))
            .copied()
            .ok_or_else(|| TableError::MissingEntry {
                assignment: describe(assignment),
            })
    }
}

fn key(assignment: &[(&str, i64)]) -> Vec<(String, i64)> {
    let mut key: Vec<(String, i64)> = assignment
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect();
    key.sort();
    key
}

fn describe(assignment: &[(&str, i64)]) -> String {
    assignment
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_key_order() {
        let table = StaticTable::new().with(&[("gt", 1), ("obs", 0)], 0.2).unwrap();
        assert_eq!(table.get_value(&[("obs", 0), ("gt", 1)]), Ok(0.2));
    }

    #[test]
    fn test_missing_entry() {
        let table = StaticTable::new();
        assert_eq!(
            table.get_value(&[("gt", 1)]),
            Err(TableError::MissingEntry {
                assignment: "gt=1".to_string()
            })
        );
    }

    #[test]
    fn test_probability_outside_unit_interval_is_rejected() {
        let mut table = StaticTable::new();
        assert!(matches!(
            table.insert(&[("gt", 0)], 1.5),
            Err(TableError::OutOfRange { .. })
        ));
        assert!(table.is_empty());
    }
}
