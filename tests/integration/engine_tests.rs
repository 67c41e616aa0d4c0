//! Integration tests for the configured guard engine

use std::cell::Cell;

use text_guards::{
    from_fn, CommandOperation, Config, GuardConfig, GuardEngine, GuardError, GuardStatus,
    RestrictionPredicate,
};

fn engine_from(toml: &str) -> GuardEngine {
    let config: Config = toml::from_str(toml).unwrap();
    GuardEngine::from_config(&config).unwrap()
}

// ============================================================================
// Construction
// ============================================================================

#[test]
fn test_default_config_has_no_guards() {
    let engine = GuardEngine::from_config(&Config::default()).unwrap();
    assert!(engine.guard_names().is_empty());
}

#[test]
fn test_full_chain_from_toml() {
    let engine = engine_from(
        r#"
        [string]
        protected = ["sock"]

        [custom]
        deny_patterns = ["(?i)secret"]

        [restriction]
        restrictions = ["must not be rude"]
        judge_command = "cat > /dev/null; echo 'polite ❌'"
        "#,
    );
    assert_eq!(engine.guard_names(), vec!["string", "custom", "restriction"]);
    assert_eq!(engine.protected().to_vec(), vec!["sock".to_string()]);
}

#[test]
fn test_invalid_leniency_rejected() {
    let config: Config = toml::from_str("[string]\nprotected = [\"sock\"]\nleniency = 0\n").unwrap();
    assert!(matches!(
        GuardEngine::from_config(&config),
        Err(GuardError::Configuration(_))
    ));
}

#[test]
fn test_negative_retries_rejected() {
    let config: Config = toml::from_str("[string]\nprotected = [\"sock\"]\nretries = -3\n").unwrap();
    assert!(matches!(
        GuardEngine::from_config(&config),
        Err(GuardError::Configuration(_))
    ));
}

#[test]
fn test_invalid_deny_pattern_rejected() {
    let config: Config = toml::from_str("[custom]\ndeny_patterns = [\"(\"]\n").unwrap();
    assert!(GuardEngine::from_config(&config).is_err());
}

// ============================================================================
// Checks
// ============================================================================

#[test]
fn test_check_with_judge_command() {
    let engine = engine_from(
        r#"
        [restriction]
        restrictions = ["must not mention socks"]
        judge_command = "tail -n 1 | grep -qi sock && echo 'mentions socks ✅' || echo 'fine ❌'"
        "#,
    );

    let verdict = engine.check("a pair of shoes", &[]).unwrap();
    assert!(verdict.is_pass());

    let verdict = engine.check("a pair of socks", &[]).unwrap();
    assert_eq!(verdict.guard(), Some("restriction"));
}

#[test]
fn test_check_judge_failure_is_error() {
    let engine = engine_from(
        r#"
        [restriction]
        restrictions = ["must not mention socks"]
        judge_command = "exit 1"
        "#,
    );
    assert!(engine.check("anything", &[]).is_err());
}

#[test]
fn test_judge_that_ignores_prompt_on_long_output() {
    let engine = engine_from(
        r#"
        [restriction]
        restrictions = ["must not be rude"]
        judge_command = "echo 'polite ❌'"
        "#,
    );

    let long_output = "very polite. ".repeat(20_000);
    let verdict = engine.check(&long_output, &[]).unwrap();
    assert!(verdict.is_pass());
}

#[test]
fn test_empty_request_protected_strings_ignored() {
    let engine = engine_from("[string]\nprotected = [\"sock\"]\n");

    let verdict = engine.check("a pair of shoes", &["".to_string()]).unwrap();
    assert!(verdict.is_pass());

    let extra = vec!["".to_string(), "shoes".to_string()];
    let verdict = engine.check("a pair of shoes", &extra).unwrap();
    assert!(verdict.is_violation());
}

// ============================================================================
// Guarded Runs
// ============================================================================

#[test]
fn test_run_retries_until_clean() {
    let engine = engine_from(
        r#"
        [general]
        retries = 4

        [string]
        protected = ["sock"]
        "#,
    );

    let calls = Cell::new(0u32);
    let outcome = engine
        .run(from_fn(|| {
            calls.set(calls.get() + 1);
            Ok((if calls.get() < 3 { "sock" } else { "shoe" }).to_string())
        }))
        .unwrap();

    assert_eq!(calls.get(), 3);
    assert_eq!(outcome.status, GuardStatus::Accepted);
    assert_eq!(outcome.output, "shoe");
}

#[test]
fn test_run_exhausted_fail_policy() {
    let engine = engine_from(
        r#"
        [general]
        retries = 1
        on_exhaustion = "fail"

        [custom]
        deny_patterns = ["sock"]
        "#,
    );

    let result = engine.run(from_fn(|| Ok("sock".to_string())));
    assert!(matches!(result, Err(GuardError::Exhausted { attempts: 2, .. })));
}

#[test]
fn test_run_with_programmatic_restriction() {
    let judge = |output: &str, _: &[String]| -> Result<bool, GuardError> {
        Ok(output.contains("rude"))
    };
    let engine = GuardEngine::empty().with_guard(
        RestrictionPredicate::new(["must be polite"], judge).unwrap(),
        GuardConfig::new(3),
    );

    let calls = Cell::new(0u32);
    let outcome = engine
        .run(from_fn(|| {
            calls.set(calls.get() + 1);
            Ok((if calls.get() == 1 { "rude reply" } else { "kind reply" }).to_string())
        }))
        .unwrap();

    assert_eq!(calls.get(), 2);
    assert_eq!(outcome.output, "kind reply");
}

#[test]
fn test_run_command_operation() {
    let engine = engine_from("[custom]\ndeny_patterns = [\"forbidden\"]\n");
    let outcome = engine.run(CommandOperation::new("echo allowed")).unwrap();
    assert!(outcome.is_accepted());
    assert_eq!(outcome.output, "allowed");
}

#[test]
fn test_run_command_failure_not_retried() {
    let engine = engine_from("[custom]\ndeny_patterns = [\"x\"]\n");
    let result = engine.run(CommandOperation::new("echo oops >&2; exit 4"));
    assert!(matches!(result, Err(GuardError::Operation(_))));
}
