//! Artifact text for one looping DTMC module.

use std::fmt;

use prismloop_ir::printer::compose_lines;
use prismloop_ir::transition::Transition;
use prismloop_ir::types::{BoundedVariable, ProgramCounter, LOOP_BOUND};

use crate::layout::PcLayout;

pub const LOOP_LOGIC: &str = "Loop Logic";

/// One component's transitions, in the order they are emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentBlock {
    pub name: String,
    pub pc: ProgramCounter,
    pub transitions: Vec<Transition>,
}

/// Everything that goes into the module text.
#[derive(Debug, Clone)]
pub struct ModuleParts<'a> {
    pub module_name: &'a str,
    pub generated_at: Option<String>,
    pub legend: Vec<(ProgramCounter, String)>,
    /// State variables followed by `pc` and `k`.
    pub variables: Vec<BoundedVariable>,
    pub blocks: &'a [ComponentBlock],
    pub loop_step: Transition,
    pub indent: &'a str,
}

/// `pc → name` for every allocated program counter, ascending.
pub fn legend(
    layout: &PcLayout,
    component_names: &[&str],
    failure_labels: &[String],
) -> Vec<(ProgramCounter, String)> {
    let mut legend: Vec<(ProgramCounter, String)> = layout
        .component_pcs()
        .zip(component_names)
        .map(|(pc, name)| (pc, name.to_string()))
        .collect();
    legend.push((layout.loop_pc(), LOOP_LOGIC.to_string()));
    legend.extend(layout.failure_pcs().zip(failure_labels.iter().cloned()));
    legend
}

impl fmt::Display for ModuleParts<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = self.indent;

        writeln!(f, "// {}", self.module_name)?;
        writeln!(f, "// Prism Looping State Machine")?;
        if let Some(generated_at) = &self.generated_at {
            writeln!(f, "// Generated: {generated_at}")?;
        }
        writeln!(f, "// PC values:")?;
        for (pc, name) in &self.legend {
            writeln!(f, "//   {pc} : {name}")?;
        }
        writeln!(f)?;

        writeln!(f, "dtmc")?;
        writeln!(f)?;
        writeln!(f, "const {LOOP_BOUND};")?;
        writeln!(f)?;
        writeln!(f, "module {}", self.module_name)?;
        writeln!(f)?;

        f.write_str(&compose_lines(indent, &self.variables))?;
        writeln!(f)?;

        for block in self.blocks {
            writeln!(f, "{indent}// {}", block.name)?;
            f.write_str(&compose_lines(indent, &block.transitions))?;
            writeln!(f)?;
        }

        writeln!(f, "{indent}// {LOOP_LOGIC}")?;
        writeln!(f, "{indent}{}", self.loop_step)?;
        writeln!(f)?;
        writeln!(f, "endmodule")
    }
}

/// A rendered module plus what it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    pub module_name: String,
    pub version: String,
    pub layout: PcLayout,
    pub legend: Vec<(ProgramCounter, String)>,
    pub blocks: Vec<ComponentBlock>,
    pub text: String,
}

impl Artifact {
    /// `<module>-<version>.pm`
    pub fn file_name(&self) -> String {
        format!("{}-{}.pm", self.module_name, self.version)
    }

    /// Component transitions plus the loop step.
    pub fn transition_count(&self) -> usize {
        self.blocks.iter().map(|b| b.transitions.len()).sum::<usize>() + 1
    }
}
