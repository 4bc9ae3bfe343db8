use std::collections::HashMap;
use std::sync::Arc;

use prismloop_compiler::component::{Bindings, Component, ComponentLogic};
use prismloop_compiler::perceiver::{
    perceive, perceive_correlated, CorrelatedPerceiver, Perceiver, TableColumns,
};
use prismloop_compiler::table::{FitTable, ProbabilityTable, StaticTable, TableError};
use prismloop_ir::types::{BoundedVariable, ProgramCounter};

fn estimate_var() -> BoundedVariable {
    BoundedVariable::new("est", 0, 2, 0).unwrap()
}

fn confusion_table() -> StaticTable {
    let mut table = StaticTable::new();
    let rows = [
        (0, [0.05, 0.5, 0.45]),
        (1, [0.1, 0.8, 0.1]),
        (2, [0.0, 0.3, 0.7]),
    ];
    for (gt, probs) in rows {
        for (obs, p) in probs.into_iter().enumerate() {
            table.insert(&[("gt", gt), ("obs", obs as i64)], p).unwrap();
        }
    }
    table
}

#[test]
fn test_min_filter_drops_low_probability_estimates() {
    let est = estimate_var();
    let probs = [0.05, 0.5, 0.45];
    let outcomes = perceive(|_, e| Ok(probs[e as usize]), 0, &est, Some(0.1)).unwrap();

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].update.to_string(), "(est'=1)");
    assert_eq!(outcomes[0].probability, 0.5);
    assert_eq!(outcomes[1].update.to_string(), "(est'=2)");
    assert_eq!(outcomes[1].probability, 0.45);
}

#[test]
fn test_filter_threshold_is_exclusive() {
    let est = estimate_var();
    let outcomes = perceive(|_, _| Ok(0.1), 0, &est, Some(0.1)).unwrap();
    assert!(outcomes.is_empty());
}

#[test]
fn test_without_filter_every_estimate_is_kept() {
    let est = estimate_var();
    let outcomes = perceive(|_, _| Ok(0.0), 1, &est, None).unwrap();
    assert_eq!(outcomes.len(), 3);
}

#[test]
fn test_correlated_update_records_new_error() {
    let est = estimate_var();
    let err = BoundedVariable::new("err", -2, 2, 0).unwrap();
    let outcomes = perceive_correlated(
        |t, pe, e| Ok(if pe == 0 && t == e { 1.0 } else { 0.0 }),
        2,
        0,
        &est,
        &err,
        Some(0.0),
    )
    .unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].update.to_string(), "(est'=2) & (err'=0)");

    let outcomes = perceive_correlated(|_, _, _| Ok(0.5), 2, 1, &est, &err, None).unwrap();
    let updates: Vec<String> = outcomes.iter().map(|o| o.update.to_string()).collect();
    assert_eq!(
        updates,
        vec!["(est'=0) & (err'=2)", "(est'=1) & (err'=1)", "(est'=2) & (err'=0)"]
    );
}

#[test]
fn test_perceiver_component_reads_table() {
    let truth = BoundedVariable::new("gt_var", 0, 2, 0).unwrap();
    let est = estimate_var();
    let perceiver = Perceiver::new(confusion_table()).with_min_filter(0.0);
    let bindings = Bindings {
        inputs: vec![&truth],
        outputs: vec![&est],
        failures: vec![],
    };
    let lines: Vec<String> = perceiver
        .expand(&bindings, ProgramCounter(1))
        .unwrap()
        .iter()
        .map(|t| t.to_string())
        .collect();
    assert_eq!(
        lines,
        vec![
            "[] gt_var=0 & pc=1 -> 0.05 : (est'=0) & (pc'=2) + 0.5 : (est'=1) & (pc'=2) + 0.45 : (est'=2) & (pc'=2);",
            "[] gt_var=1 & pc=1 -> 0.1 : (est'=0) & (pc'=2) + 0.8 : (est'=1) & (pc'=2) + 0.1 : (est'=2) & (pc'=2);",
            "[] gt_var=2 & pc=1 -> 0.3 : (est'=1) & (pc'=2) + 0.7 : (est'=2) & (pc'=2);",
        ]
    );
}

#[test]
fn test_perceiver_with_custom_columns() {
    let table = StaticTable::new()
        .with(&[("truth", 0), ("seen", 0)], 1.0)
        .unwrap();
    let truth = BoundedVariable::new("x", 0, 0, 0).unwrap();
    let est = BoundedVariable::new("x_hat", 0, 0, 0).unwrap();
    let perceiver = Perceiver::new(table).with_columns(TableColumns {
        truth: "truth".to_string(),
        estimate: "seen".to_string(),
        ..TableColumns::default()
    });
    let bindings = Bindings {
        inputs: vec![&truth],
        outputs: vec![&est],
        failures: vec![],
    };
    let transitions = perceiver.expand(&bindings, ProgramCounter(0)).unwrap();
    assert_eq!(
        transitions[0].to_string(),
        "[] x=0 & pc=0 -> 1 : (x_hat'=0) & (pc'=1);"
    );
}

#[test]
fn test_perceiver_surfaces_missing_table_entries() {
    let truth = BoundedVariable::new("gt_var", 0, 3, 0).unwrap();
    let est = estimate_var();
    let component = Component::new("camera", Perceiver::new(confusion_table()))
        .reads(["gt_var"])
        .writes(["est"]);
    let bindings = Bindings {
        inputs: vec![&truth],
        outputs: vec![&est],
        failures: vec![],
    };
    let err = component.expand(&bindings, ProgramCounter(0)).unwrap_err();
    assert!(err.to_string().contains("gt=3"));
}

#[test]
fn test_perceiver_requires_an_output_binding() {
    let truth = BoundedVariable::new("gt_var", 0, 2, 0).unwrap();
    let bindings = Bindings {
        inputs: vec![&truth],
        outputs: vec![],
        failures: vec![],
    };
    let perceiver = Perceiver::new(confusion_table());
    assert!(perceiver.expand(&bindings, ProgramCounter(0)).is_err());
}

/// Conditional frequencies of `obs` given `(gt, pe)`, fitted from
/// `(pe, gt, obs)` samples.
#[derive(Default)]
struct CountingTable {
    counts: HashMap<(i64, i64, i64), u32>,
    totals: HashMap<(i64, i64), u32>,
}

impl ProbabilityTable for CountingTable {
    fn get_value(&self, assignment: &[(&str, i64)]) -> Result<f64, TableError> {
        let find = |name: &str| {
            assignment
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| *v)
                .ok_or_else(|| TableError::MissingEntry {
                    assignment: name.to_string(),
                })
        };
        let (gt, pe, obs) = (find("gt")?, find("pe")?, find("obs")?);
        let total = self.totals.get(&(gt, pe)).copied().unwrap_or(0);
        if total == 0 {
            return Ok(0.0);
        }
        let count = self.counts.get(&(gt, pe, obs)).copied().unwrap_or(0);
        Ok(f64::from(count) / f64::from(total))
    }
}

impl FitTable for CountingTable {
    fn fit(&mut self, samples: &[Vec<i64>]) -> Result<(), TableError> {
        for sample in samples {
            let &[pe, gt, obs] = sample.as_slice() else {
                return Err(TableError::Fit {
                    reason: format!("expected 3 columns, got {}", sample.len()),
                });
            };
            *self.counts.entry((gt, pe, obs)).or_default() += 1;
            *self.totals.entry((gt, pe)).or_default() += 1;
        }
        Ok(())
    }
}

#[test]
fn test_correlated_perceiver_over_fitted_table() {
    let mut table = CountingTable::default();
    table
        .fit(&[vec![0, 1, 1], vec![0, 1, 1], vec![0, 1, 0], vec![1, 1, 0]])
        .unwrap();
    let table = Arc::new(table);

    let truth = BoundedVariable::new("cte", 1, 1, 1).unwrap();
    let err = BoundedVariable::new("err", 0, 1, 0).unwrap();
    let est = BoundedVariable::new("cte_est", 0, 1, 0).unwrap();
    let perceiver = CorrelatedPerceiver::new(Arc::clone(&table)).with_min_filter(0.0);
    let bindings = Bindings {
        inputs: vec![&truth, &err],
        outputs: vec![&est],
        failures: vec![],
    };
    let lines: Vec<String> = perceiver
        .expand(&bindings, ProgramCounter(0))
        .unwrap()
        .iter()
        .map(|t| t.to_string())
        .collect();
    let third = 1.0 / 3.0;
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        format!(
            "[] cte=1 & err=0 & pc=0 -> {} : (cte_est'=0) & (err'=1) & (pc'=1) + {} : (cte_est'=1) & (err'=0) & (pc'=1);",
            third,
            2.0 / 3.0
        )
    );
    assert_eq!(
        lines[1],
        "[] cte=1 & err=1 & pc=0 -> 1 : (cte_est'=0) & (err'=1) & (pc'=1);"
    );
}

#[test]
fn test_fit_rejects_malformed_samples() {
    let mut table = CountingTable::default();
    assert!(matches!(
        table.fit(&[vec![1, 2]]),
        Err(TableError::Fit { .. })
    ));
}
