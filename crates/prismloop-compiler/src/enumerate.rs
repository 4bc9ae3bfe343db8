//! Cartesian-product enumeration over bounded variables.
//!
//! The product is produced by an odometer: the last variable in the list
//! advances on every step and carries into the one before it, so the first
//! variable varies slowest. Only each variable's enumeration range is
//! visited, never its full declared range.

use std::fmt;

use prismloop_ir::expr::Guard;
use prismloop_ir::types::BoundedVariable;

use crate::expand::ExpandError;

/// One joint assignment, ordered like the enumerated variable list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JointAssignment {
    pairs: Vec<(String, i64)>,
}

impl JointAssignment {
    pub fn get(&self, name: &str) -> Option<i64> {
        self.pairs
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, value)| *value)
    }

    pub fn value_at(&self, index: usize) -> Option<i64> {
        self.pairs.get(index).map(|(_, value)| *value)
    }

    /// Like [`value_at`](Self::value_at), for logic that enumerates its own
    /// inputs and therefore always has a value at `index`.
    pub fn require(&self, index: usize) -> Result<i64, ExpandError> {
        self.value_at(index).ok_or_else(|| ExpandError::Unassigned {
            assignment: self.to_string(),
            index,
        })
    }

    pub fn pairs(&self) -> &[(String, i64)] {
        &self.pairs
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.pairs.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `v1=a1 & v2=a2 & ...`
    pub fn to_guard(&self) -> Guard {
        self.iter()
            .fold(Guard::new(), |guard, (name, value)| guard.and_eq(name, value))
    }
}

impl fmt::Display for JointAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_guard())
    }
}

/// Iterator over every joint assignment of a variable list.
#[derive(Debug, Clone)]
pub struct Enumeration<'a> {
    vars: Vec<&'a BoundedVariable>,
    current: Vec<i64>,
    remaining: u64,
}

/// Enumerate the product of the variables' enumeration ranges.
///
/// An empty list, or any variable with an empty range, yields nothing.
pub fn enumerate<'a, I>(vars: I) -> Enumeration<'a>
where
    I: IntoIterator<Item = &'a BoundedVariable>,
{
    let vars: Vec<&BoundedVariable> = vars.into_iter().collect();
    let remaining = assignment_count(vars.iter().copied());
    let current = vars.iter().map(|v| v.enum_range().0).collect();
    Enumeration {
        vars,
        current,
        remaining,
    }
}

/// Number of assignments [`enumerate`] would produce.
pub fn assignment_count<'a, I>(vars: I) -> u64
where
    I: IntoIterator<Item = &'a BoundedVariable>,
{
    let mut count: Option<u64> = None;
    for var in vars {
        count = Some(count.unwrap_or(1).saturating_mul(var.enum_len()));
    }
    count.unwrap_or(0)
}

impl Enumeration<'_> {
    fn advance(&mut self) {
        for (slot, var) in self.current.iter_mut().zip(&self.vars).rev() {
            let (low, high) = var.enum_range();
            if *slot < high {
                *slot += 1;
                return;
            }
            *slot = low;
        }
    }
}

impl Iterator for Enumeration<'_> {
    type Item = JointAssignment;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let pairs = self
            .vars
            .iter()
            .zip(&self.current)
            .map(|(var, value)| (var.name().to_string(), *value))
            .collect();
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(JointAssignment { pairs })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        // u64::MAX doubles as the saturated count of a larger product.
        match usize::try_from(self.remaining) {
            Ok(n) if self.remaining < u64::MAX => (n, Some(n)),
            _ => (usize::MAX, None),
        }
    }
}
