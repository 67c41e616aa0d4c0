//! Integration tests for the environment override

use std::env;

use text_guards::{from_fn, Config, GuardEngine};

#[test]
fn test_disabled_skips_guards() {
    let mut config = Config::default();
    config.string.protected = vec!["sock".to_string()];
    let engine = GuardEngine::from_config(&config).unwrap();

    // Without TEXT_GUARDS_DISABLED the output is flagged
    assert!(engine.check("my sock", &[]).unwrap().is_violation());

    env::set_var("TEXT_GUARDS_DISABLED", "1");
    let verdict = engine.check("my sock", &[]).unwrap();
    let outcome = engine.run(from_fn(|| Ok("my sock".to_string()))).unwrap();
    env::remove_var("TEXT_GUARDS_DISABLED");

    assert!(verdict.is_pass());
    assert_eq!(outcome.attempts, 1);
}
