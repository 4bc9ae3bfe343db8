use std::collections::{HashMap, HashSet};

use prismloop_ir::types::{BoundedVariable, ProgramCounter, RESERVED_NAMES};

use crate::component::{Bindings, Component};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelDefinitionError {
    #[error("Duplicate state variable '{name}'")]
    DuplicateVariable { name: String },

    #[error("Duplicate failure label '{label}'")]
    DuplicateFailureLabel { label: String },

    #[error("'{name}' is reserved for the generated loop machinery")]
    ReservedName { name: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ResolveError {
    #[error("Component '{component}' reads unknown variable '{name}'")]
    UnknownInput { component: String, name: String },

    #[error("Component '{component}' writes unknown variable '{name}'")]
    UnknownOutput { component: String, name: String },

    #[error("Component '{component}' raises unknown failure label '{label}'")]
    UnknownFailureLabel { component: String, label: String },
}

/// Index of a declared state variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A component's names, resolved to handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentHandles {
    pub inputs: Vec<VarId>,
    pub outputs: Vec<VarId>,
    pub failures: Vec<ProgramCounter>,
}

/// Name → handle lookup built once per model.
#[derive(Debug)]
pub struct SymbolTable<'a> {
    variables: &'a [BoundedVariable],
    by_name: HashMap<&'a str, VarId>,
    failure_pcs: HashMap<&'a str, ProgramCounter>,
}

/// Check that variable names and failure labels are unique and stay clear
/// of the reserved names.
pub fn validate_declarations(
    variables: &[BoundedVariable],
    failure_labels: &[String],
) -> Result<(), Vec<ModelDefinitionError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for var in variables {
        if RESERVED_NAMES.contains(&var.name()) {
            errors.push(ModelDefinitionError::ReservedName {
                name: var.name().to_string(),
            });
        } else if !seen.insert(var.name()) {
            errors.push(ModelDefinitionError::DuplicateVariable {
                name: var.name().to_string(),
            });
        }
    }

    let mut seen = HashSet::new();
    for label in failure_labels {
        if !seen.insert(label.as_str()) {
            errors.push(ModelDefinitionError::DuplicateFailureLabel {
                label: label.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

impl<'a> SymbolTable<'a> {
    /// Failure labels are numbered consecutively from `first_failure_pc`.
    pub fn build(
        variables: &'a [BoundedVariable],
        failure_labels: &'a [String],
        first_failure_pc: ProgramCounter,
    ) -> Result<Self, Vec<ModelDefinitionError>> {
        validate_declarations(variables, failure_labels)?;

        let by_name = variables
            .iter()
            .enumerate()
            .map(|(i, var)| (var.name(), VarId(i)))
            .collect();
        let failure_pcs = failure_labels
            .iter()
            .zip(first_failure_pc.value()..)
            .map(|(label, pc)| (label.as_str(), ProgramCounter(pc)))
            .collect();

        Ok(Self {
            variables,
            by_name,
            failure_pcs,
        })
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.by_name.get(name).copied()
    }

    pub fn variable(&self, id: VarId) -> &'a BoundedVariable {
        &self.variables[id.0]
    }

    pub fn failure_pc(&self, label: &str) -> Option<ProgramCounter> {
        self.failure_pcs.get(label).copied()
    }

    /// Resolve every name the component declares, reporting all unknown
    /// names at once.
    pub fn resolve(&self, component: &Component) -> Result<ComponentHandles, Vec<ResolveError>> {
        let mut errors = Vec::new();

        let inputs = self.resolve_vars(&component.inputs, &mut errors, |name| {
            ResolveError::UnknownInput {
                component: component.name.clone(),
                name,
            }
        });
        let outputs = self.resolve_vars(&component.outputs, &mut errors, |name| {
            ResolveError::UnknownOutput {
                component: component.name.clone(),
                name,
            }
        });
        let mut failures = Vec::with_capacity(component.failure_labels.len());
        for label in &component.failure_labels {
            match self.failure_pc(label) {
                Some(pc) => failures.push(pc),
                None => errors.push(ResolveError::UnknownFailureLabel {
                    component: component.name.clone(),
                    label: label.clone(),
                }),
            }
        }

        if errors.is_empty() {
            Ok(ComponentHandles {
                inputs,
                outputs,
                failures,
            })
        } else {
            Err(errors)
        }
    }

    /// Turn resolved handles into the plain values component logic receives.
    pub fn bind(&self, handles: &ComponentHandles) -> Bindings<'a> {
        Bindings {
            inputs: handles.inputs.iter().map(|id| self.variable(*id)).collect(),
            outputs: handles.outputs.iter().map(|id| self.variable(*id)).collect(),
            failures: handles.failures.clone(),
        }
    }

    fn resolve_vars(
        &self,
        names: &[String],
        errors: &mut Vec<ResolveError>,
        unknown: impl Fn(String) -> ResolveError,
    ) -> Vec<VarId> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names {
            match self.lookup(name) {
                Some(id) => ids.push(id),
                None => errors.push(unknown(name.clone())),
            }
        }
        ids
    }
}
