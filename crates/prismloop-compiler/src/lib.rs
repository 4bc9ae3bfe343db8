//! Expansion of declarative components into guarded probabilistic
//! transitions: enumeration, component logic, perceivers and name
//! resolution.

pub mod check;
pub mod component;
pub mod enumerate;
pub mod expand;
pub mod perceiver;
pub mod resolve;
pub mod table;

pub use component::{Bindings, Component, ComponentLogic, EnumeratedLogic, FixedLogic};
pub use enumerate::{assignment_count, enumerate, JointAssignment};
pub use expand::{define_by_enumeration, ExpandError};
pub use table::{ProbabilityTable, StaticTable, TableError};
