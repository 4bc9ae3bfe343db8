//! Data model for looping PRISM DTMC modules: bounded variables, guard and
//! update expressions, transitions and their line-oriented printer.

pub mod expr;
pub mod parse;
pub mod printer;
pub mod transition;
pub mod types;

pub use expr::{Assignment, Atom, Guard, Update};
pub use transition::{Outcome, Stamp, Transition};
pub use types::{Bound, BoundedVariable, DeclError, ProgramCounter};
