use std::collections::BTreeMap;
use std::path::Path;

use rayon::prelude::*;

use prismloop_compiler::check::{check_probabilities, ProbabilityIssue};
use prismloop_compiler::component::{Bindings, Component};
use prismloop_compiler::expand::ExpandError;
use prismloop_compiler::resolve::{validate_declarations, ModelDefinitionError, ResolveError, SymbolTable};
use prismloop_ir::parse::ModelDeclaration;
use prismloop_ir::types::{BoundedVariable, DeclError, ProgramCounter, LOOP_BOUND};

use crate::checker::{CheckRequest, CheckerError, ModelChecker, Verdict};
use crate::config::{AssemblyConfig, ProbabilityCheck};
use crate::layout::PcLayout;
use crate::render::{legend, Artifact, ComponentBlock, ModuleParts};
use crate::sink::{ArtifactSink, Destination, FileSink};

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("Invalid model definition: {}", join(.0))]
    Definition(Vec<ModelDefinitionError>),

    #[error("Unresolved names: {}", join(.0))]
    Resolve(Vec<ResolveError>),

    #[error("Component '{component}' failed to expand: {source}")]
    Expand {
        component: String,
        #[source]
        source: ExpandError,
    },

    #[error("Unnormalized transitions: {}", join(.0))]
    Probability(Vec<ProbabilityIssue>),

    #[error("Declaration error: {0}")]
    Decl(#[from] DeclError),

    #[error("I/O error writing artifact: {0}")]
    Io(#[from] std::io::Error),

    #[error("Constant '{name}' must be bound to check a property")]
    MissingConstant { name: String },

    #[error("Artifact write was already attempted and failed: {reason}")]
    WriteFailed { reason: String },

    #[error("Artifact was materialized to {destination}, not to a file")]
    NotOnDisk { destination: Destination },

    #[error("Model checker error: {0}")]
    Checker(#[from] CheckerError),
}

fn join<E: std::fmt::Display>(errors: &[E]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Where the machine is in its build.
#[derive(Debug, Clone, Copy)]
pub enum Lifecycle<'a> {
    Unbuilt,
    Assembled(&'a Artifact),
    Materialized {
        artifact: &'a Artifact,
        destination: &'a Destination,
    },
    /// The single write attempt failed; nothing will be written again.
    Failed {
        artifact: &'a Artifact,
        reason: &'a str,
    },
}

#[derive(Debug)]
enum WriteState {
    Pending,
    Written(Destination),
    Failed(String),
}

#[derive(Debug)]
struct Built {
    artifact: Artifact,
    write: WriteState,
}

/// Result of [`LoopingStateMachine::materialize`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeOutcome {
    Written(Destination),
    AlreadyMaterialized(Destination),
}

impl MaterializeOutcome {
    pub fn destination(&self) -> &Destination {
        match self {
            MaterializeOutcome::Written(d) | MaterializeOutcome::AlreadyMaterialized(d) => d,
        }
    }
}

/// A module that runs its components in a fixed cyclic order, `N` times.
///
/// Component `i` owns program counter `i`; after the last component the loop
/// step resets `pc` to 0 and increments `k`. Failure labels are absorbing
/// program counter values after the loop step.
#[derive(Debug)]
pub struct LoopingStateMachine {
    module_name: String,
    version: String,
    components: Vec<Component>,
    state_variables: Vec<BoundedVariable>,
    failure_labels: Vec<String>,
    layout: PcLayout,
    config: AssemblyConfig,
    built: Option<Built>,
}

impl LoopingStateMachine {
    /// Validates names up front; unresolved component references surface
    /// at [`assemble`](Self::assemble).
    pub fn new(
        module_name: impl Into<String>,
        version: impl Into<String>,
        components: Vec<Component>,
        state_variables: Vec<BoundedVariable>,
        failure_labels: Vec<String>,
    ) -> Result<Self, AssemblyError> {
        validate_declarations(&state_variables, &failure_labels).map_err(AssemblyError::Definition)?;
        let layout = PcLayout::new(components.len(), failure_labels.len());
        Ok(Self {
            module_name: module_name.into(),
            version: version.into(),
            components,
            state_variables,
            failure_labels,
            layout,
            config: AssemblyConfig::default(),
            built: None,
        })
    }

    pub fn from_declaration(
        declaration: ModelDeclaration,
        components: Vec<Component>,
    ) -> Result<Self, AssemblyError> {
        Self::new(
            declaration.module_name,
            declaration.version,
            components,
            declaration.variables,
            declaration.failure_labels,
        )
    }

    pub fn with_config(mut self, config: AssemblyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn layout(&self) -> &PcLayout {
        &self.layout
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    pub fn lifecycle(&self) -> Lifecycle<'_> {
        let Some(built) = &self.built else {
            return Lifecycle::Unbuilt;
        };
        let artifact = &built.artifact;
        match &built.write {
            WriteState::Pending => Lifecycle::Assembled(artifact),
            WriteState::Written(destination) => Lifecycle::Materialized {
                artifact,
                destination,
            },
            WriteState::Failed(reason) => Lifecycle::Failed {
                artifact,
                reason: reason.as_str(),
            },
        }
    }

    /// Program counter of a failure label.
    pub fn failure_pc(&self, label: &str) -> Option<ProgramCounter> {
        let index = self.failure_labels.iter().position(|l| l == label)?;
        self.layout.failure_pcs().nth(index)
    }

    pub fn artifact(&self) -> Option<&Artifact> {
        self.built.as_ref().map(|b| &b.artifact)
    }

    /// Build the artifact once; later calls return the cached one.
    pub fn assemble(&mut self) -> Result<&Artifact, AssemblyError> {
        Ok(&self.ensure_built()?.artifact)
    }

    /// Artifact text, assembling first if needed.
    pub fn render(&mut self) -> Result<&str, AssemblyError> {
        Ok(&self.assemble()?.text)
    }

    /// Write the artifact to `sink` at most once.
    ///
    /// The write is a single attempt: after it fails, later calls return
    /// [`AssemblyError::WriteFailed`] without touching any sink.
    pub fn materialize<S: ArtifactSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<MaterializeOutcome, AssemblyError> {
        let built = self.ensure_built()?;
        match &built.write {
            WriteState::Pending => {}
            WriteState::Written(destination) => {
                tracing::debug!(module = %built.artifact.module_name, %destination, "already materialized");
                return Ok(MaterializeOutcome::AlreadyMaterialized(destination.clone()));
            }
            WriteState::Failed(reason) => {
                return Err(AssemblyError::WriteFailed {
                    reason: reason.clone(),
                })
            }
        }

        built.write = WriteState::Failed("write did not complete".to_string());
        match sink.write(&built.artifact.file_name(), &built.artifact.text) {
            Ok(destination) => {
                tracing::info!(module = %built.artifact.module_name, %destination, "artifact written");
                built.write = WriteState::Written(destination.clone());
                Ok(MaterializeOutcome::Written(destination))
            }
            Err(err) => {
                tracing::warn!(module = %built.artifact.module_name, error = %err, "artifact write failed");
                built.write = WriteState::Failed(err.to_string());
                Err(err.into())
            }
        }
    }

    /// Materialize to `<output_dir>/<module>-<version>.pm`.
    pub fn save_to_file(&mut self) -> Result<MaterializeOutcome, AssemblyError> {
        let mut sink = FileSink::new(self.config.output_dir.clone());
        self.materialize(&mut sink)
    }

    /// Check `property` against the saved model, saving it first if needed.
    ///
    /// `constants` must bind `N`.
    pub fn check_property<C: ModelChecker + ?Sized>(
        &mut self,
        checker: &C,
        property: &Path,
        replications: u32,
        constants: BTreeMap<String, i64>,
    ) -> Result<Verdict, AssemblyError> {
        if !constants.contains_key(LOOP_BOUND) {
            return Err(AssemblyError::MissingConstant {
                name: LOOP_BOUND.to_string(),
            });
        }

        let model = match self.save_to_file()? {
            MaterializeOutcome::Written(Destination::File(path))
            | MaterializeOutcome::AlreadyMaterialized(Destination::File(path)) => path,
            other => {
                return Err(AssemblyError::NotOnDisk {
                    destination: other.destination().clone(),
                })
            }
        };

        let request = CheckRequest {
            model,
            property: property.to_path_buf(),
            replications,
            constants,
        };
        tracing::info!(
            model = %request.model.display(),
            property = %request.property.display(),
            replications,
            "checking property"
        );
        Ok(checker.check(&request)?)
    }

    // ── Assembly ─────────────────────────────────────────────────────

    fn ensure_built(&mut self) -> Result<&mut Built, AssemblyError> {
        let built = match self.built.take() {
            Some(built) => built,
            None => {
                let artifact = self.build_artifact()?;
                tracing::info!(
                    module = %self.module_name,
                    transitions = artifact.transition_count(),
                    "state machine assembled"
                );
                Built {
                    artifact,
                    write: WriteState::Pending,
                }
            }
        };
        Ok(self.built.insert(built))
    }

    fn build_artifact(&self) -> Result<Artifact, AssemblyError> {
        let symbols = SymbolTable::build(
            &self.state_variables,
            &self.failure_labels,
            self.layout.first_failure_pc(),
        )
        .map_err(AssemblyError::Definition)?;

        let mut errors = Vec::new();
        let mut jobs = Vec::with_capacity(self.components.len());
        for (component, pc) in self.components.iter().zip(self.layout.component_pcs()) {
            match symbols.resolve(component) {
                Ok(handles) => jobs.push((component, pc, symbols.bind(&handles))),
                Err(unresolved) => errors.extend(unresolved),
            }
        }
        if !errors.is_empty() {
            return Err(AssemblyError::Resolve(errors));
        }

        let blocks: Vec<ComponentBlock> = if self.config.parallel_expansion {
            jobs.par_iter()
                .map(|(component, pc, bindings)| expand_component(component, *pc, bindings))
                .collect::<Result<_, _>>()?
        } else {
            jobs.iter()
                .map(|(component, pc, bindings)| expand_component(component, *pc, bindings))
                .collect::<Result<_, _>>()?
        };

        self.check_probabilities(&blocks)?;

        let mut variables = self.state_variables.clone();
        variables.push(self.layout.pc_variable()?);
        variables.push(self.layout.loop_counter()?);

        let component_names: Vec<&str> = self.components.iter().map(|c| c.name.as_str()).collect();
        let legend = legend(&self.layout, &component_names, &self.failure_labels);
        let generated_at = self
            .config
            .timestamp
            .then(|| chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.6f").to_string());

        let text = ModuleParts {
            module_name: &self.module_name,
            generated_at,
            legend: legend.clone(),
            variables,
            blocks: &blocks,
            loop_step: self.layout.loop_step(),
            indent: &self.config.indent,
        }
        .to_string();

        Ok(Artifact {
            module_name: self.module_name.clone(),
            version: self.version.clone(),
            layout: self.layout,
            legend,
            blocks,
            text,
        })
    }

    fn check_probabilities(&self, blocks: &[ComponentBlock]) -> Result<(), AssemblyError> {
        if self.config.probability_check == ProbabilityCheck::Off {
            return Ok(());
        }
        let issues: Vec<ProbabilityIssue> = blocks
            .iter()
            .flat_map(|b| check_probabilities(&b.name, &b.transitions, self.config.probability_tolerance))
            .collect();
        if issues.is_empty() {
            return Ok(());
        }
        match self.config.probability_check {
            ProbabilityCheck::Strict => Err(AssemblyError::Probability(issues)),
            _ => {
                for issue in &issues {
                    tracing::warn!(
                        component = %issue.component,
                        guard = %issue.guard,
                        issue = %issue.kind,
                        "transition probabilities do not form a distribution"
                    );
                }
                Ok(())
            }
        }
    }
}

fn expand_component(
    component: &Component,
    pc: ProgramCounter,
    bindings: &Bindings<'_>,
) -> Result<ComponentBlock, AssemblyError> {
    let transitions = component
        .expand(bindings, pc)
        .map_err(|source| AssemblyError::Expand {
            component: component.name.clone(),
            source,
        })?;
    tracing::debug!(component = %component.name, %pc, transitions = transitions.len(), "component expanded");
    Ok(ComponentBlock {
        name: component.name.clone(),
        pc,
        transitions,
    })
}
