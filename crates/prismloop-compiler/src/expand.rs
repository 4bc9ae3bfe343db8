use prismloop_ir::transition::{Outcome, Transition};
use prismloop_ir::types::{BoundedVariable, DeclError, ProgramCounter};

use crate::component::BindingRole;
use crate::enumerate::{enumerate, JointAssignment};
use crate::table::TableError;

#[derive(Debug, thiserror::Error)]
pub enum ExpandError {
    #[error("Probability table error: {0}")]
    Table(#[from] TableError),

    #[error("Declaration error: {0}")]
    Decl(#[from] DeclError),

    #[error("Assignment '{assignment}' has no value at position {index}")]
    Unassigned { assignment: String, index: usize },

    #[error("Logic needs {role} #{index} but only {available} bound")]
    MissingBinding {
        role: BindingRole,
        index: usize,
        available: usize,
    },
}

/// Expand `outcomes_for` into one transition per enumerated assignment of
/// `vars`, each stamped with `pc`.
///
/// Assignments for which `outcomes_for` returns nothing contribute no
/// transition; keeping every reachable state covered is up to the caller.
/// Table failures convert into [`ExpandError::Table`] through `?`.
pub fn define_by_enumeration<'a, I, F>(
    vars: I,
    pc: ProgramCounter,
    mut outcomes_for: F,
) -> Result<Vec<Transition>, ExpandError>
where
    I: IntoIterator<Item = &'a BoundedVariable>,
    F: FnMut(&JointAssignment) -> Result<Vec<Outcome>, ExpandError>,
{
    let mut transitions = Vec::new();
    for assignment in enumerate(vars) {
        let outcomes = outcomes_for(&assignment)?;
        if outcomes.is_empty() {
            tracing::debug!(%pc, assignment = %assignment, "no outcomes, assignment skipped");
            continue;
        }
        let transition = Transition::new(assignment.to_guard(), outcomes)?.stamped(pc);
        transitions.push(transition);
    }
    Ok(transitions)
}
