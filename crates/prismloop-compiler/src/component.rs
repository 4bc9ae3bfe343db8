use std::fmt;

use prismloop_ir::transition::{Outcome, Transition};
use prismloop_ir::types::{BoundedVariable, ProgramCounter};

use crate::enumerate::JointAssignment;
use crate::expand::{define_by_enumeration, ExpandError};

// ── Bindings ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingRole {
    Input,
    Output,
    Failure,
}

impl fmt::Display for BindingRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingRole::Input => "input",
            BindingRole::Output => "output",
            BindingRole::Failure => "failure label",
        })
    }
}

/// Resolved arguments handed to a component's logic, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct Bindings<'a> {
    pub inputs: Vec<&'a BoundedVariable>,
    pub outputs: Vec<&'a BoundedVariable>,
    pub failures: Vec<ProgramCounter>,
}

impl<'a> Bindings<'a> {
    pub fn input(&self, index: usize) -> Result<&'a BoundedVariable, ExpandError> {
        lookup(&self.inputs, index, BindingRole::Input).copied()
    }

    pub fn output(&self, index: usize) -> Result<&'a BoundedVariable, ExpandError> {
        lookup(&self.outputs, index, BindingRole::Output).copied()
    }

    pub fn failure(&self, index: usize) -> Result<ProgramCounter, ExpandError> {
        lookup(&self.failures, index, BindingRole::Failure).copied()
    }
}

fn lookup<T>(items: &[T], index: usize, role: BindingRole) -> Result<&T, ExpandError> {
    items.get(index).ok_or(ExpandError::MissingBinding {
        role,
        index,
        available: items.len(),
    })
}

// ── Component logic ──────────────────────────────────────────────────

/// Behaviour of a component: given its resolved bindings, produce the
/// transition block for program counter `pc`.
///
/// Implementations must be pure; the assembler may call them from several
/// threads and in any order.
pub trait ComponentLogic: Send + Sync {
    fn expand(&self, bindings: &Bindings<'_>, pc: ProgramCounter) -> Result<Vec<Transition>, ExpandError>;
}

/// A named unit contributing one block of transitions at one program
/// counter value.
pub struct Component {
    pub name: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub failure_labels: Vec<String>,
    logic: Box<dyn ComponentLogic>,
}

impl Component {
    pub fn new(name: impl Into<String>, logic: impl ComponentLogic + 'static) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            failure_labels: Vec::new(),
            logic: Box::new(logic),
        }
    }

    pub fn reads<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn writes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.outputs.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn may_fail_with<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.failure_labels.extend(labels.into_iter().map(Into::into));
        self
    }

    pub fn expand(&self, bindings: &Bindings<'_>, pc: ProgramCounter) -> Result<Vec<Transition>, ExpandError> {
        self.logic.expand(bindings, pc)
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("failure_labels", &self.failure_labels)
            .finish_non_exhaustive()
    }
}

// ── Provided logic variants ──────────────────────────────────────────

/// Enumerates the component's inputs and asks a function for the outcomes
/// of each joint assignment. Table lookups and binding accessors both
/// propagate with `?`.
pub struct EnumeratedLogic<F> {
    outcomes_for: F,
}

impl<F> EnumeratedLogic<F>
where
    F: Fn(&JointAssignment, &Bindings<'_>) -> Result<Vec<Outcome>, ExpandError> + Send + Sync,
{
    pub fn new(outcomes_for: F) -> Self {
        Self { outcomes_for }
    }
}

impl<F> ComponentLogic for EnumeratedLogic<F>
where
    F: Fn(&JointAssignment, &Bindings<'_>) -> Result<Vec<Outcome>, ExpandError> + Send + Sync,
{
    fn expand(&self, bindings: &Bindings<'_>, pc: ProgramCounter) -> Result<Vec<Transition>, ExpandError> {
        define_by_enumeration(bindings.inputs.iter().copied(), pc, |assignment| {
            (self.outcomes_for)(assignment, bindings)
        })
    }
}

/// Hand-written transitions. Each is stamped with the component's program
/// counter unless it was stamped already.
#[derive(Debug, Clone, Default)]
pub struct FixedLogic {
    transitions: Vec<Transition>,
}

impl FixedLogic {
    pub fn new(transitions: Vec<Transition>) -> Self {
        Self { transitions }
    }
}

impl ComponentLogic for FixedLogic {
    fn expand(&self, _bindings: &Bindings<'_>, pc: ProgramCounter) -> Result<Vec<Transition>, ExpandError> {
        Ok(self
            .transitions
            .iter()
            .cloned()
            .map(|t| t.stamped(pc))
            .collect())
    }
}
