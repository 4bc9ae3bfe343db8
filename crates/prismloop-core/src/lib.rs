//! Assembly of looping PRISM DTMC modules: program-counter layout, the
//! state-machine lifecycle, artifact rendering and delivery, and the
//! model-checker interface.

pub mod checker;
pub mod config;
pub mod layout;
pub mod machine;
pub mod render;
pub mod sink;

pub use checker::{CheckRequest, CheckerError, ModelChecker, Verdict};
pub use config::{AssemblyConfig, ProbabilityCheck};
pub use layout::PcLayout;
pub use machine::{AssemblyError, Lifecycle, LoopingStateMachine, MaterializeOutcome};
pub use render::{Artifact, ComponentBlock};
pub use sink::{ArtifactSink, Destination, FileSink, MemorySink};
