//! Integration tests for the guarded retry wrapper

use std::cell::Cell;

use text_guards::{
    from_fn, CustomPredicate, GuardConfig, GuardError, GuardExt, GuardStatus, Operation,
    Predicate, RestrictionPredicate, StringPredicate,
};

fn always(value: bool) -> CustomPredicate {
    CustomPredicate::new(move |_| value)
}

// ============================================================================
// Retry Budget
// ============================================================================

#[test]
fn test_zero_retries_invokes_once() {
    let calls = Cell::new(0u32);
    let op = from_fn(|| {
        calls.set(calls.get() + 1);
        Ok("anything".to_string())
    });

    let outcome = op.guard(always(true), GuardConfig::new(0)).run().unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(outcome.status, GuardStatus::Exhausted);
}

#[test]
fn test_n_retries_invokes_n_plus_one_times() {
    let calls = Cell::new(0u32);
    let op = from_fn(|| {
        calls.set(calls.get() + 1);
        Ok("anything".to_string())
    });

    let outcome = op.guard(always(true), GuardConfig::new(7)).run().unwrap();
    assert_eq!(calls.get(), 8);
    assert_eq!(outcome.attempts, 8);
}

#[test]
fn test_passing_output_accepted_first_time() {
    let calls = Cell::new(0u32);
    let op = from_fn(|| {
        calls.set(calls.get() + 1);
        Ok("fine".to_string())
    });

    let outcome = op.guard(always(false), GuardConfig::new(3)).run().unwrap();
    assert_eq!(calls.get(), 1);
    assert!(outcome.is_accepted());
}

#[test]
fn test_k_violations_then_accept() {
    let outputs = ["my sock", "another sock", "SOCKS!", "a shoe"];
    let calls = Cell::new(0usize);
    let op = from_fn(|| {
        let out = outputs[calls.get()].to_string();
        calls.set(calls.get() + 1);
        Ok(out)
    });

    let predicate = StringPredicate::exact(["sock"]).unwrap();
    let outcome = op.guard(predicate, GuardConfig::new(3)).run().unwrap();
    assert_eq!(calls.get(), 4);
    assert!(outcome.is_accepted());
    assert_eq!(outcome.output, "a shoe");
}

#[test]
fn test_fail_policy_surfaces_exhaustion() {
    let op = from_fn(|| Ok("I love my sock".to_string()));
    let predicate = StringPredicate::exact(["sock"]).unwrap();

    let err = op
        .guard(predicate, GuardConfig::new(1).failing())
        .invoke()
        .unwrap_err();
    assert!(err.is_exhausted());
}

#[test]
fn test_predicate_error_propagates() {
    let calls = Cell::new(0u32);
    let op = from_fn(|| {
        calls.set(calls.get() + 1);
        Ok("text".to_string())
    });
    let judge = |_: &str, _: &[String]| -> Result<bool, GuardError> {
        Err(GuardError::Judgment("judge unreachable".to_string()))
    };
    let predicate = RestrictionPredicate::new(["must be polite"], judge).unwrap();

    let result = op.guard(predicate, GuardConfig::new(4)).run();
    assert!(matches!(result, Err(GuardError::Judgment(_))));
    assert_eq!(calls.get(), 1);
}

// ============================================================================
// String Predicate Examples
// ============================================================================

#[test]
fn test_string_guard_examples() {
    let exact = StringPredicate::exact(["sock"]).unwrap();
    assert!(exact.violates("I love my sock").unwrap());
    assert!(!exact.violates("I love my soc").unwrap());

    let lenient = StringPredicate::new(["socks"], 0.5).unwrap();
    assert!(lenient.violates("one sock").unwrap());
    assert!(!lenient.violates("and so on").unwrap());
}

#[test]
fn test_leniency_validated_at_construction() {
    assert!(matches!(
        StringPredicate::new(["sock"], 0.0),
        Err(GuardError::Configuration(_))
    ));
    assert!(matches!(
        StringPredicate::new(["sock"], 1.01),
        Err(GuardError::Configuration(_))
    ));
}

// ============================================================================
// Chaining
// ============================================================================

#[test]
fn test_chained_guards_inner_exhausts_outer_accepts() {
    let prompt = "Tell me a story about my favorite clothing";
    let calls = Cell::new(0u32);
    let op = from_fn(|| {
        calls.set(calls.get() + 1);
        Ok("Once upon a time there was a sock.".to_string())
    });

    let chained = op
        .guard(StringPredicate::exact(["sock"]).unwrap(), GuardConfig::new(5))
        .guard(StringPredicate::new([prompt], 0.5).unwrap(), GuardConfig::new(5));

    let outcome = chained.run().unwrap();
    // inner guard used its whole budget, outer guard accepted its output once
    assert_eq!(calls.get(), 6);
    assert_eq!(outcome.attempts, 1);
    assert!(outcome.is_accepted());
    assert_eq!(outcome.output, "Once upon a time there was a sock.");
}

#[test]
fn test_outer_guard_reinvokes_inner_chain() {
    let calls = Cell::new(0u32);
    let op = from_fn(|| {
        calls.set(calls.get() + 1);
        Ok(format!("draft {}", calls.get()))
    });

    // inner never objects; outer rejects the first two drafts
    let chained = op
        .guard(always(false), GuardConfig::new(0))
        .guard(
            CustomPredicate::new(|s| s == "draft 1" || s == "draft 2"),
            GuardConfig::new(5),
        );

    let outcome = chained.run().unwrap();
    assert_eq!(calls.get(), 3);
    assert_eq!(outcome.output, "draft 3");
}

#[test]
fn test_inner_fail_policy_propagates_through_outer() {
    let calls = Cell::new(0u32);
    let op = from_fn(|| {
        calls.set(calls.get() + 1);
        Ok("sock".to_string())
    });

    let chained = op
        .guard(StringPredicate::exact(["sock"]).unwrap(), GuardConfig::new(1).failing())
        .guard(always(true), GuardConfig::new(5));

    let result = chained.run();
    assert!(matches!(result, Err(GuardError::Exhausted { attempts: 2, .. })));
    assert_eq!(calls.get(), 2);
}
