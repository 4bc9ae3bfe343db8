use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::Bound;

// ── Guards ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Atom {
    /// `var=value`
    Eq { var: String, value: i64 },
    /// `var < bound`
    Lt { var: String, bound: Bound },
    /// Hand-written condition, emitted verbatim.
    Raw { text: String },
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Eq { var, value } => write!(f, "{var}={value}"),
            Atom::Lt { var, bound } => write!(f, "{var} < {bound}"),
            Atom::Raw { text } => f.write_str(text),
        }
    }
}

/// Conjunction of atoms. The empty guard is `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Guard {
    atoms: Vec<Atom>,
}

impl Guard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_atoms(atoms: Vec<Atom>) -> Self {
        Self { atoms }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new().and(Atom::Raw { text: text.into() })
    }

    pub fn and(mut self, atom: Atom) -> Self {
        self.atoms.push(atom);
        self
    }

    pub fn and_eq(self, var: impl Into<String>, value: i64) -> Self {
        self.and(Atom::Eq {
            var: var.into(),
            value,
        })
    }

    pub fn and_lt(self, var: impl Into<String>, bound: impl Into<Bound>) -> Self {
        self.and(Atom::Lt {
            var: var.into(),
            bound: bound.into(),
        })
    }

    pub fn push(&mut self, atom: Atom) {
        self.atoms.push(atom);
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.atoms.is_empty() {
            return f.write_str("true");
        }
        for (i, atom) in self.atoms.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{atom}")?;
        }
        Ok(())
    }
}

// ── Updates ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Assignment {
    /// `(var'=value)`
    Set { var: String, value: i64 },
    /// `(var'=var+by)`
    Offset { var: String, by: i64 },
    /// Hand-written assignment, emitted verbatim.
    Raw { text: String },
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Assignment::Set { var, value } => write!(f, "({var}'={value})"),
            Assignment::Offset { var, by } if *by < 0 => {
                write!(f, "({var}'={var}-{})", by.unsigned_abs())
            }
            Assignment::Offset { var, by } => write!(f, "({var}'={var}+{by})"),
            Assignment::Raw { text } => f.write_str(text),
        }
    }
}

/// Conjunction of next-state assignments. The empty update is `true`,
/// which leaves every variable unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Update {
    assignments: Vec<Assignment>,
}

impl Update {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(var: impl Into<String>, value: i64) -> Self {
        Self::new().and_set(var, value)
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new().and(Assignment::Raw { text: text.into() })
    }

    pub fn and(mut self, assignment: Assignment) -> Self {
        self.assignments.push(assignment);
        self
    }

    pub fn and_set(self, var: impl Into<String>, value: i64) -> Self {
        self.and(Assignment::Set {
            var: var.into(),
            value,
        })
    }

    pub fn and_offset(self, var: impl Into<String>, by: i64) -> Self {
        self.and(Assignment::Offset {
            var: var.into(),
            by,
        })
    }

    pub fn push(&mut self, assignment: Assignment) {
        self.assignments.push(assignment);
    }

    pub fn assignments(&self) -> &[Assignment] {
        &self.assignments
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl fmt::Display for Update {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.assignments.is_empty() {
            return f.write_str("true");
        }
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{assignment}")?;
        }
        Ok(())
    }
}
