use std::fmt;

use prismloop_ir::transition::Transition;

/// What is wrong with a transition's probabilities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IssueKind {
    /// Outcomes do not sum to 1, or the sum is not a finite number.
    Unnormalized { total: f64 },
    /// A single outcome lies outside `[0, 1]` or is NaN.
    OutOfRange { probability: f64 },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Unnormalized { total } => write!(f, "total probability {total}"),
            IssueKind::OutOfRange { probability } => {
                write!(f, "outcome probability {probability} outside [0, 1]")
            }
        }
    }
}

/// A transition whose outcome probabilities do not form a distribution.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Transition '{guard}' in component '{component}' has {kind}")]
pub struct ProbabilityIssue {
    pub component: String,
    pub guard: String,
    pub kind: IssueKind,
}

/// Check that every outcome probability lies in `[0, 1]` and that each
/// transition's outcomes sum to 1 within `tolerance`.
///
/// Returns the offending transitions (empty if all are distributions).
pub fn check_probabilities(
    component: &str,
    transitions: &[Transition],
    tolerance: f64,
) -> Vec<ProbabilityIssue> {
    let mut issues = Vec::new();
    for transition in transitions {
        let issue = |kind| ProbabilityIssue {
            component: component.to_string(),
            guard: transition.guard().to_string(),
            kind,
        };
        for outcome in transition.outcomes() {
            if !(0.0..=1.0).contains(&outcome.probability) {
                issues.push(issue(IssueKind::OutOfRange {
                    probability: outcome.probability,
                }));
            }
        }
        let total = transition.total_probability();
        if !total.is_finite() || (total - 1.0).abs() > tolerance {
            issues.push(issue(IssueKind::Unnormalized { total }));
        }
    }
    issues
}
