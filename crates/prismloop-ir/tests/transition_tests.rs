use prismloop_ir::expr::{Guard, Update};
use prismloop_ir::transition::{Outcome, Stamp, Transition};
use prismloop_ir::types::{DeclError, ProgramCounter};

fn sample_transition() -> Transition {
    Transition::new(
        Guard::new().and_eq("x", 0),
        vec![
            Outcome::new(Update::set("y", 0), 0.25),
            Outcome::new(Update::set("y", 1), 0.75),
        ],
    )
    .unwrap()
}

#[test]
fn test_transition_without_outcomes_fails_fast() {
    let err = Transition::new(Guard::new().and_eq("x", 0), vec![]).unwrap_err();
    assert_eq!(
        err,
        DeclError::EmptyOutcomes {
            guard: "x=0".to_string()
        }
    );
}

#[test]
fn test_unstamped_transition_rendering() {
    assert_eq!(
        sample_transition().to_string(),
        "[] x=0 -> 0.25 : (y'=0) + 0.75 : (y'=1);"
    );
}

#[test]
fn test_stamp_adds_program_counter_pre_and_postcondition() {
    let mut t = sample_transition();
    t.stamp(ProgramCounter(3));
    assert_eq!(t.stamp_state(), Stamp::Stamped(ProgramCounter(3)));
    assert_eq!(
        t.to_string(),
        "[] x=0 & pc=3 -> 0.25 : (y'=0) & (pc'=4) + 0.75 : (y'=1) & (pc'=4);"
    );
}

#[test]
fn test_stamp_is_idempotent() {
    let once = sample_transition().stamped(ProgramCounter(1));
    let mut twice = sample_transition();
    twice.stamp(ProgramCounter(1)).stamp(ProgramCounter(1));
    assert_eq!(once, twice);

    // A second stamp with a different value is also ignored.
    twice.stamp(ProgramCounter(7));
    assert_eq!(once.to_string(), twice.to_string());
}

#[test]
fn test_stamp_on_empty_guard_and_update() {
    let t = Transition::certain(Guard::new(), Update::new()).stamped(ProgramCounter(1));
    assert_eq!(t.to_string(), "[] pc=1 -> 1 : (pc'=2);");
}

#[test]
fn test_jump_outcome_targets_failure_state() {
    let t = Transition::new(
        Guard::new().and_eq("x", 2),
        vec![
            Outcome::new(Update::new(), 0.9),
            Outcome::new(Update::new(), 0.1).jump_to(ProgramCounter(5)),
        ],
    )
    .unwrap()
    .stamped(ProgramCounter(0));
    assert_eq!(
        t.to_string(),
        "[] x=2 & pc=0 -> 0.9 : (pc'=1) + 0.1 : (pc'=5);"
    );
}

#[test]
fn test_loop_step_shape() {
    let t = Transition::certain(
        Guard::new().and_eq("pc", 2).and_lt("k", "N"),
        Update::set("pc", 0).and_offset("k", 1),
    );
    assert_eq!(t.to_string(), "[] pc=2 & k < N -> 1 : (pc'=0) & (k'=k+1);");
}

#[test]
fn test_total_probability() {
    assert!((sample_transition().total_probability() - 1.0).abs() < 1e-12);
}

// ── Serde ────────────────────────────────────────────────────────────

#[test]
fn test_deserialize_rejects_empty_outcomes() {
    let err = serde_json::from_str::<Transition>(r#"{"guard":[],"outcomes":[]}"#).unwrap_err();
    assert!(err.to_string().contains("has no outcomes"), "{err}");
}

#[test]
fn test_deserialize_rejects_stamp_missing_from_guard() {
    let json = r#"{
        "guard": [{ "type": "eq", "var": "x", "value": 0 }],
        "outcomes": [{ "update": [], "probability": 1.0 }],
        "stamp": { "state": "stamped", "pc": 2 }
    }"#;
    let err = serde_json::from_str::<Transition>(json).unwrap_err();
    assert!(err.to_string().contains("claims stamp pc=2"), "{err}");
}

#[test]
fn test_stamped_transition_survives_serde() {
    let stamped = sample_transition().stamped(ProgramCounter(2));
    let json = serde_json::to_string(&stamped).unwrap();
    let mut back: Transition = serde_json::from_str(&json).unwrap();
    assert_eq!(back, stamped);

    back.stamp(ProgramCounter(5));
    assert_eq!(back.to_string(), stamped.to_string());
}

#[test]
fn test_unstamped_transition_deserializes_unstamped() {
    let json = serde_json::to_string(&sample_transition()).unwrap();
    let back: Transition = serde_json::from_str(&json).unwrap();
    assert_eq!(back.stamp_state(), Stamp::Unstamped);
}
