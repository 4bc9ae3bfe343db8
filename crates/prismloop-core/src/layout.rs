//! Program-counter allocation.
//!
//! ```text
//! 0 ..= m-1     components, in declaration order
//! m             loop control
//! m+1 ..= max   failure labels, in declaration order
//! ```

use prismloop_ir::expr::{Guard, Update};
use prismloop_ir::transition::Transition;
use prismloop_ir::types::{
    BoundedVariable, DeclError, ProgramCounter, LOOP_BOUND, LOOP_COUNTER, PROGRAM_COUNTER,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcLayout {
    components: u32,
    failures: u32,
}

impl PcLayout {
    pub fn new(components: usize, failures: usize) -> Self {
        Self {
            components: u32::try_from(components).unwrap_or(u32::MAX),
            failures: u32::try_from(failures).unwrap_or(u32::MAX),
        }
    }

    pub fn component_pc(&self, index: usize) -> Option<ProgramCounter> {
        let index = u32::try_from(index).ok()?;
        (index < self.components).then_some(ProgramCounter(index))
    }

    pub fn component_pcs(&self) -> impl Iterator<Item = ProgramCounter> {
        (0..self.components).map(ProgramCounter)
    }

    /// The loop-control slot; equals the number of components.
    pub fn loop_pc(&self) -> ProgramCounter {
        ProgramCounter(self.components)
    }

    pub fn first_failure_pc(&self) -> ProgramCounter {
        self.loop_pc().next()
    }

    pub fn failure_pcs(&self) -> impl Iterator<Item = ProgramCounter> {
        let first = self.first_failure_pc().value();
        (first..first + self.failures).map(ProgramCounter)
    }

    pub fn pc_max(&self) -> ProgramCounter {
        ProgramCounter(self.components + self.failures)
    }

    /// Every allocated value, in ascending order.
    pub fn all(&self) -> Vec<ProgramCounter> {
        self.component_pcs()
            .chain(std::iter::once(self.loop_pc()))
            .chain(self.failure_pcs())
            .collect()
    }

    /// `pc : [0..max] init 0; // program counter`
    pub fn pc_variable(&self) -> Result<BoundedVariable, DeclError> {
        Ok(
            BoundedVariable::new(PROGRAM_COUNTER, 0, i64::from(self.pc_max().value()), 0)?
                .with_description("program counter"),
        )
    }

    /// `k : [0..N] init 1; // loop counter`
    pub fn loop_counter(&self) -> Result<BoundedVariable, DeclError> {
        Ok(BoundedVariable::symbolic(LOOP_COUNTER, 0, LOOP_BOUND, 1)?.with_description("loop counter"))
    }

    /// `[] pc=m & k < N -> 1 : (pc'=0) & (k'=k+1);`
    ///
    /// Once `k` reaches `N`, or control sits on a failure label, no guard
    /// matches and the state is absorbing.
    pub fn loop_step(&self) -> Transition {
        Transition::certain(
            Guard::new()
                .and_eq(PROGRAM_COUNTER, i64::from(self.loop_pc().value()))
                .and_lt(LOOP_COUNTER, LOOP_BOUND),
            Update::set(PROGRAM_COUNTER, 0).and_offset(LOOP_COUNTER, 1),
        )
    }
}
