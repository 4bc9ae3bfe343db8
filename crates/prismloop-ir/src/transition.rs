use std::fmt;

use serde::{Deserialize, Serialize};

use crate::expr::{Assignment, Atom, Guard, Update};
use crate::types::{DeclError, ProgramCounter, PROGRAM_COUNTER};

/// One probability-weighted branch of a transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub update: Update,
    pub probability: f64,
    /// Where control goes when stamped; `None` falls through to the next slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump: Option<ProgramCounter>,
}

impl Outcome {
    pub fn new(update: Update, probability: f64) -> Self {
        Self {
            update,
            probability,
            jump: None,
        }
    }

    /// Send control to `target` (typically a failure state) instead of
    /// the next program-counter slot.
    pub fn jump_to(mut self, target: ProgramCounter) -> Self {
        self.jump = Some(target);
        self
    }
}

/// Whether a transition has received its program-counter pre/postcondition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "pc", rename_all = "snake_case")]
pub enum Stamp {
    #[default]
    Unstamped,
    Stamped(ProgramCounter),
}

/// `[] guard -> p1 : u1 + p2 : u2 + ...;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TransitionDecl", into = "TransitionDecl")]
pub struct Transition {
    guard: Guard,
    outcomes: Vec<Outcome>,
    stamp: Stamp,
}

impl Transition {
    /// Fails when `outcomes` is empty.
    pub fn new(guard: Guard, outcomes: Vec<Outcome>) -> Result<Self, DeclError> {
        if outcomes.is_empty() {
            return Err(DeclError::EmptyOutcomes {
                guard: guard.to_string(),
            });
        }
        Ok(Self {
            guard,
            outcomes,
            stamp: Stamp::Unstamped,
        })
    }

    /// Single outcome with probability 1.
    pub fn certain(guard: Guard, update: Update) -> Self {
        Self {
            guard,
            outcomes: vec![Outcome::new(update, 1.0)],
            stamp: Stamp::Unstamped,
        }
    }

    /// Append `pc=pc` to the guard and the program-counter successor to
    /// every outcome. Only the first call has any effect.
    pub fn stamp(&mut self, pc: ProgramCounter) -> &mut Self {
        if let Stamp::Stamped(_) = self.stamp {
            return self;
        }
        self.stamp = Stamp::Stamped(pc);
        self.guard.push(Atom::Eq {
            var: PROGRAM_COUNTER.to_string(),
            value: i64::from(pc.value()),
        });
        for outcome in &mut self.outcomes {
            let target = outcome.jump.unwrap_or_else(|| pc.next());
            outcome.update.push(Assignment::Set {
                var: PROGRAM_COUNTER.to_string(),
                value: i64::from(target.value()),
            });
        }
        self
    }

    pub fn stamped(mut self, pc: ProgramCounter) -> Self {
        self.stamp(pc);
        self
    }

    pub fn stamp_state(&self) -> Stamp {
        self.stamp
    }

    pub fn guard(&self) -> &Guard {
        &self.guard
    }

    pub fn outcomes(&self) -> &[Outcome] {
        &self.outcomes
    }

    pub fn total_probability(&self) -> f64 {
        self.outcomes.iter().map(|o| o.probability).sum()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[] {} -> ", self.guard)?;
        for (i, outcome) in self.outcomes.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{} : {}", outcome.probability, outcome.update)?;
        }
        f.write_str(";")
    }
}

/// Wire form of a [`Transition`], validated on conversion.
///
/// A stamped transition must carry its `pc=<n>` atom in the guard and a
/// `pc` assignment in every outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionDecl {
    pub guard: Guard,
    pub outcomes: Vec<Outcome>,
    #[serde(default)]
    pub stamp: Stamp,
}

impl TryFrom<TransitionDecl> for Transition {
    type Error = DeclError;

    fn try_from(decl: TransitionDecl) -> Result<Self, DeclError> {
        let mut transition = Transition::new(decl.guard, decl.outcomes)?;
        if let Stamp::Stamped(pc) = decl.stamp {
            let precondition = Atom::Eq {
                var: PROGRAM_COUNTER.to_string(),
                value: i64::from(pc.value()),
            };
            let postconditions = transition.outcomes.iter().all(|o| {
                o.update
                    .assignments()
                    .iter()
                    .any(|a| matches!(a, Assignment::Set { var, .. } if var == PROGRAM_COUNTER))
            });
            if !transition.guard.atoms().contains(&precondition) || !postconditions {
                return Err(DeclError::InconsistentStamp {
                    guard: transition.guard.to_string(),
                    pc,
                });
            }
            transition.stamp = decl.stamp;
        }
        Ok(transition)
    }
}

impl From<Transition> for TransitionDecl {
    fn from(transition: Transition) -> Self {
        Self {
            guard: transition.guard,
            outcomes: transition.outcomes,
            stamp: transition.stamp,
        }
    }
}
