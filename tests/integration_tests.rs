//! Integration tests for template resolution through the public API

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::json;

use tim::{
    render, CatchAll, DotPath, Engine, EngineConfig, InnerTokens, Pattern, Resolution, Scope,
    TimError,
};

fn sample_data() -> serde_json::Value {
    json!({
        "bl": { "ah": 6 },
        "blah": 77,
        "ba": 5,
        "r": 4,
        "doo": "dah"
    })
}

#[test]
fn test_full_resolution_loop() {
    let engine = Engine::new()
        .with_plugin(InnerTokens)
        .unwrap()
        .with_plugin(DotPath::new(sample_data()))
        .unwrap()
        .with_plugin(CatchAll::empty())
        .unwrap();

    let output = engine
        .run("foo{{blah{{blah}}ba{{}}r}}blob{{doo}}bob")
        .expect("Should resolve");
    insta::assert_snapshot!(output, @"fooblah77barblobdahbob");
}

#[test]
fn test_flat_engine_hands_composite_token_whole() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = Arc::clone(&seen);

    let mut engine = Engine::new().with_plugin(DotPath::new(sample_data())).unwrap();
    engine
        .register(
            Pattern::predicate(|content| content.contains("{{")),
            move |content: &str, _: &Scope<'_>| {
                recorder.lock().unwrap().push(content.to_string());
                Ok(Resolution::resolved("<composite>"))
            },
            1,
        )
        .unwrap();

    let output = engine
        .run("foo{{blah{{blah}}ba{{}}r}}blob{{doo}}bob")
        .expect("Should resolve");
    assert_eq!(output, "foo<composite>blobdahbob");
    assert_eq!(*seen.lock().unwrap(), vec!["blah{{blah}}ba{{}}r".to_string()]);
}

#[test]
fn test_composite_without_plugin_is_unresolved() {
    let engine = Engine::new().with_plugin(DotPath::new(sample_data())).unwrap();
    let err = engine
        .run("foo{{blah{{blah}}ba{{}}r}}blob")
        .expect_err("composite content is not a dot path");

    match err {
        TimError::UnresolvedToken { content, context } => {
            assert_eq!(content, "blah{{blah}}ba{{}}r");
            let context = context.expect("context attached");
            assert_eq!(context.span, 3..26);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unresolved_report_points_at_token() {
    let err = render("Hi {{user.name}} and {{Nope}}", &json!({ "user": { "name": "Ada" } }))
        .expect_err("uppercase content is not a dot path");
    let report = err.report_plain("greeting.tim");

    assert!(report.contains("greeting.tim"), "{report}");
    assert!(report.contains("Hi Ada and {{Nope}}"), "{report}");
    assert!(report.contains("unresolved token \"Nope\""), "{report}");
}

#[test]
fn test_token_free_input_is_identity() {
    let engine = Engine::new().with_plugin(CatchAll::with_text("X")).unwrap();
    for input in ["", "no tokens", "}} only closes }}", "single { braces }"] {
        assert_eq!(engine.run(input).unwrap(), input);
    }
}

#[test]
fn test_unmatched_open_halts_without_error() {
    let engine = Engine::new().with_plugin(CatchAll::with_text("X")).unwrap();
    assert_eq!(engine.run("foo{{bar").unwrap(), "foo{{bar");
    assert_eq!(engine.run("{{a}}{{b{{c}}").unwrap(), "X{{b{{c}}");
}

#[test]
fn test_priority_decline_then_resolve() {
    let mut engine = Engine::new();
    engine
        .register(Pattern::literal("x"), |_: &str, _: &Scope<'_>| Ok(Resolution::Declined), 5)
        .unwrap();
    engine
        .register(Pattern::literal("x"), |_: &str, _: &Scope<'_>| Ok(Resolution::resolved("ok")), 0)
        .unwrap();
    assert_eq!(engine.run("{{x}}").unwrap(), "ok");

    let empty = Engine::new();
    match empty.run("{{x}}").unwrap_err() {
        TimError::UnresolvedToken { content, .. } => assert_eq!(content, "x"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_results_are_rescanned() {
    let data = json!({ "page": "{{title}} - {{site}}", "title": "Home", "site": "tim" });
    assert_eq!(render("<title>{{page}}</title>", &data).unwrap(), "<title>Home - tim</title>");
}

#[test]
fn test_config_file_drives_engine() {
    let config = EngineConfig::from_toml(
        r#"
[delimiters]
open = "[["
close = "]]"

[limits]
passes = 2
"#,
    )
    .expect("Should parse");

    let engine = Engine::with_config(config)
        .with_plugin(DotPath::new(sample_data()))
        .unwrap();
    assert_eq!(engine.run("[[doo]] {{doo}} [[blah]]").unwrap(), "dah {{doo}} 77");

    let err = engine.run("[[r]][[ba]][[blah]]").unwrap_err();
    assert!(matches!(err, TimError::PassLimit { limit: 2 }));
}

#[test]
fn test_engine_shared_across_threads() {
    let engine = Arc::new(Engine::new().with_plugin(DotPath::new(sample_data())).unwrap());

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let engine = Arc::clone(&engine);
            std::thread::spawn(move || engine.run("{{doo}}{{bl.ah}}").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "dah6");
    }
}
