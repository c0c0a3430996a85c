//! 聚合与统计量场景

use logic_engine::{ActionSet, AlertSpec, Condition, LogicEngine, Rule, ThresholdOp};
use serde_json::json;

fn counting_rule(name: &str, tag: &str) -> Rule {
    Rule::new(
        name,
        Condition::threshold("count", ThresholdOp::GreaterThan, 0.0),
    )
    .with_id(name)
    .with_actions(ActionSet::tags([tag]).with_alert(AlertSpec::new(name, "low")))
}

#[test]
fn empty_rule_set_yields_all_zero_summary() {
    let engine = LogicEngine::new();
    let report = engine.evaluate(json!({"temperature": 100}));

    assert!(report.results.is_empty());
    assert!(report.tags.is_empty());
    assert!(report.alerts.is_empty());
    assert_eq!(report.summary.total_rules, 0);
    assert_eq!(report.summary.triggered_rules, 0);
    assert_eq!(report.summary.tags_generated, 0);
    assert_eq!(report.summary.alerts_generated, 0);
}

#[test]
fn summary_counters_are_derived() {
    let engine = LogicEngine::new();
    engine.add_rule(counting_rule("a", "tag-a")).unwrap();
    engine.add_rule(counting_rule("b", "tag-b")).unwrap();
    engine
        .add_rule(
            Rule::new(
                "never",
                Condition::threshold("count", ThresholdOp::LessThan, 0.0),
            )
            .with_actions(ActionSet::tags(["unreachable"])),
        )
        .unwrap();

    let report = engine.evaluate(json!({"count": 3}));

    assert_eq!(report.summary.total_rules, 3);
    assert_eq!(report.summary.triggered_rules, report.results.len());
    assert_eq!(report.summary.tags_generated, report.tags.len());
    assert_eq!(report.summary.alerts_generated, report.alerts.len());
    assert_eq!(report.summary.triggered_rules, 2);
}

#[test]
fn duplicate_tags_across_rules_appear_once() {
    let engine = LogicEngine::new();
    engine.add_rule(counting_rule("first", "urgent")).unwrap();
    engine.add_rule(counting_rule("second", "urgent")).unwrap();

    let report = engine.evaluate(json!({"count": 1}));

    assert_eq!(report.summary.triggered_rules, 2);
    assert_eq!(report.tags, vec!["urgent"]);
    assert_eq!(report.summary.tags_generated, 1);
}

#[test]
fn tag_order_is_first_insertion_order() {
    let engine = LogicEngine::new();
    engine.add_rule(counting_rule("one", "zebra")).unwrap();
    engine.add_rule(counting_rule("two", "apple")).unwrap();
    engine.add_rule(counting_rule("three", "zebra")).unwrap();

    let report = engine.evaluate(json!({"count": 1}));

    // 不排序：保持首次出现顺序
    assert_eq!(report.tags, vec!["zebra", "apple"]);
}

#[test]
fn alerts_preserve_registration_order() {
    let engine = LogicEngine::new();
    for name in ["alpha", "beta", "gamma"] {
        engine.add_rule(counting_rule(name, name)).unwrap();
    }

    let report = engine.evaluate(json!({"count": 1}));

    let order: Vec<_> = report.alerts.iter().map(|a| a.message.as_str()).collect();
    assert_eq!(order, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn alerts_share_one_evaluation_timestamp() {
    let engine = LogicEngine::new();
    engine.add_rule(counting_rule("a", "t1")).unwrap();
    engine.add_rule(counting_rule("b", "t2")).unwrap();

    let report = engine.evaluate(json!({"count": 1}));

    assert_eq!(report.alerts.len(), 2);
    assert_eq!(report.alerts[0].timestamp, report.alerts[1].timestamp);
}

#[test]
fn report_echoes_input_record() {
    let engine = LogicEngine::new();
    engine.add_rule(counting_rule("a", "t")).unwrap();

    let input = json!({"count": 2, "nested": {"field": "value"}});
    let report = engine.evaluate(input.clone());

    assert_eq!(report.input, input);
}

#[test]
fn rules_without_actions_still_count_as_triggered() {
    let engine = LogicEngine::new();
    engine
        .add_rule(Rule::new(
            "bare",
            Condition::threshold("count", ThresholdOp::GreaterThan, 0.0),
        ))
        .unwrap();

    let report = engine.evaluate(json!({"count": 1}));

    assert_eq!(report.summary.triggered_rules, 1);
    assert!(report.tags.is_empty());
    assert!(report.alerts.is_empty());
}
