//! Perceiver logic: transition probabilities read from a fitted
//! probability table keyed by true and estimated state.
//!
//! A perceiver turns the true value of a state variable into a distribution
//! over an estimate variable. The correlated variant also conditions on the
//! previous estimation error and records the new one. Branches at or below
//! the optional `min_filter` threshold are dropped to keep the generated
//! state space small; surviving probabilities are never renormalized.

use serde::{Deserialize, Serialize};

use prismloop_ir::expr::Update;
use prismloop_ir::transition::{Outcome, Transition};
use prismloop_ir::types::{BoundedVariable, ProgramCounter};

use crate::component::{Bindings, ComponentLogic};
use crate::expand::{define_by_enumeration, ExpandError};
use crate::table::{ProbabilityTable, TableError};

/// Column names used when reading the probability table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumns {
    pub truth: String,
    pub estimate: String,
    pub prior_error: String,
}

impl Default for TableColumns {
    fn default() -> Self {
        Self {
            truth: "gt".to_string(),
            estimate: "obs".to_string(),
            prior_error: "pe".to_string(),
        }
    }
}

fn keep(probability: f64, min_filter: Option<f64>) -> bool {
    min_filter.map_or(true, |min| probability > min)
}

/// Outcomes `(estimate'=e)` for every `e` in the estimate's enumeration
/// range, weighted by `read(truth, e)`.
pub fn perceive<R>(
    read: R,
    truth: i64,
    estimate: &BoundedVariable,
    min_filter: Option<f64>,
) -> Result<Vec<Outcome>, TableError>
where
    R: Fn(i64, i64) -> Result<f64, TableError>,
{
    let mut outcomes = Vec::new();
    for est in estimate.enum_values() {
        let probability = read(truth, est)?;
        if keep(probability, min_filter) {
            outcomes.push(Outcome::new(Update::set(estimate.name(), est), probability));
        }
    }
    Ok(outcomes)
}

/// Outcomes `(estimate'=e) & (error'=truth-e)` weighted by
/// `read(truth, prior_error, e)`.
pub fn perceive_correlated<R>(
    read: R,
    truth: i64,
    prior_error: i64,
    estimate: &BoundedVariable,
    error: &BoundedVariable,
    min_filter: Option<f64>,
) -> Result<Vec<Outcome>, TableError>
where
    R: Fn(i64, i64, i64) -> Result<f64, TableError>,
{
    let mut outcomes = Vec::new();
    for est in estimate.enum_values() {
        let probability = read(truth, prior_error, est)?;
        if keep(probability, min_filter) {
            let update = Update::set(estimate.name(), est).and_set(error.name(), truth - est);
            outcomes.push(Outcome::new(update, probability));
        }
    }
    Ok(outcomes)
}

// ── Component logic ──────────────────────────────────────────────────

/// Reads input 0 (true state) and writes output 0 (estimate).
pub struct Perceiver<T> {
    table: T,
    columns: TableColumns,
    min_filter: Option<f64>,
}

impl<T: ProbabilityTable> Perceiver<T> {
    pub fn new(table: T) -> Self {
        Self {
            table,
            columns: TableColumns::default(),
            min_filter: None,
        }
    }

    pub fn with_columns(mut self, columns: TableColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_min_filter(mut self, min_filter: f64) -> Self {
        self.min_filter = Some(min_filter);
        self
    }
}

impl<T: ProbabilityTable> ComponentLogic for Perceiver<T> {
    fn expand(&self, bindings: &Bindings<'_>, pc: ProgramCounter) -> Result<Vec<Transition>, ExpandError> {
        let truth = bindings.input(0)?;
        let estimate = bindings.output(0)?;
        let columns = &self.columns;
        let read = |t: i64, e: i64| {
            self.table
                .get_value(&[(columns.truth.as_str(), t), (columns.estimate.as_str(), e)])
        };
        define_by_enumeration([truth], pc, |assignment| {
            let t = assignment.require(0)?;
            Ok(perceive(&read, t, estimate, self.min_filter)?)
        })
    }
}

/// Reads input 0 (true state) and input 1 (previous error), writes
/// output 0 (estimate) and stores the new error back into input 1.
pub struct CorrelatedPerceiver<T> {
    table: T,
    columns: TableColumns,
    min_filter: Option<f64>,
}

impl<T: ProbabilityTable> CorrelatedPerceiver<T> {
    pub fn new(table: T) -> Self {
        Self {
            table,
            columns: TableColumns::default(),
            min_filter: None,
        }
    }

    pub fn with_columns(mut self, columns: TableColumns) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_min_filter(mut self, min_filter: f64) -> Self {
        self.min_filter = Some(min_filter);
        self
    }
}

impl<T: ProbabilityTable> ComponentLogic for CorrelatedPerceiver<T> {
    fn expand(&self, bindings: &Bindings<'_>, pc: ProgramCounter) -> Result<Vec<Transition>, ExpandError> {
        let truth = bindings.input(0)?;
        let error = bindings.input(1)?;
        let estimate = bindings.output(0)?;
        let columns = &self.columns;
        let read = |t: i64, pe: i64, e: i64| {
            self.table.get_value(&[
                (columns.truth.as_str(), t),
                (columns.prior_error.as_str(), pe),
                (columns.estimate.as_str(), e),
            ])
        };
        define_by_enumeration([truth, error], pc, |assignment| {
            let (t, pe) = (assignment.require(0)?, assignment.require(1)?);
            Ok(perceive_correlated(&read, t, pe, estimate, error, self.min_filter)?)
        })
    }
}
