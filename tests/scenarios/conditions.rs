//! 条件变体场景

use logic_engine::{
    ActionSet, AlertSpec, Condition, LogicEngine, MatchMode, Rule, ThresholdOp, ThresholdValue,
};
use serde_json::json;

/// 温度监控规则：temperature > 30 时打标签并触发高严重度告警
fn temperature_engine() -> LogicEngine {
    let engine = LogicEngine::new();
    engine
        .add_rule(
            Rule::new(
                "temp_monitor",
                Condition::threshold("temperature", ThresholdOp::GreaterThan, 30.0),
            )
            .with_id("temp_monitor")
            .with_actions(
                ActionSet::tags(["high-temp"])
                    .with_alert(AlertSpec::new("Temperature exceeds safe limit", "high")),
            ),
        )
        .unwrap();
    engine
}

#[test]
fn threshold_rule_matches_above_limit() {
    let report = temperature_engine().evaluate(json!({"temperature": 35}));

    assert_eq!(report.summary.triggered_rules, 1);
    assert!(report.results[0].met);
    assert_eq!(report.tags, vec!["high-temp"]);
    assert_eq!(report.alerts.len(), 1);
    assert_eq!(report.alerts[0].severity, "high");
    assert_eq!(report.alerts[0].message, "Temperature exceeds safe limit");
}

#[test]
fn threshold_rule_does_not_match_below_limit() {
    let report = temperature_engine().evaluate(json!({"temperature": 20}));

    assert_eq!(report.summary.triggered_rules, 0);
    assert!(report.tags.is_empty());
    assert!(report.alerts.is_empty());
}

#[test]
fn threshold_missing_field_fails_closed_without_diagnostic() {
    let report = temperature_engine().evaluate(json!({"humidity": 90}));

    assert_eq!(report.summary.triggered_rules, 0);
    // 字段缺失不是错误，不产生诊断
    assert!(report.diagnostics.is_empty());
}

#[test]
fn keyword_any_rule_matches() {
    let engine = LogicEngine::new();
    engine
        .add_rule(
            Rule::new(
                "urgent_detector",
                Condition::keyword("message", ["urgent", "asap"], MatchMode::Any),
            )
            .with_id("urgent_detector")
            .with_actions(ActionSet::tags(["priority"])),
        )
        .unwrap();

    let report = engine.evaluate(json!({"message": "this is urgent"}));

    assert_eq!(report.summary.triggered_rules, 1);
    assert_eq!(report.tags, vec!["priority"]);
}

#[test]
fn keyword_matching_is_case_insensitive() {
    let engine = LogicEngine::new();
    engine
        .add_rule(Rule::new(
            "detector",
            Condition::keyword("message", ["URGENT"], MatchMode::Any),
        ))
        .unwrap();

    let report = engine.evaluate(json!({"message": "Something Urgent happened"}));
    assert_eq!(report.summary.triggered_rules, 1);
}

#[test]
fn between_is_inclusive_on_both_bounds() {
    let engine = LogicEngine::new();
    engine
        .add_rule(Rule::new(
            "range",
            Condition::threshold(
                "value",
                ThresholdOp::Between,
                ThresholdValue::range(10.0, 20.0),
            ),
        ))
        .unwrap();

    for (value, expected) in [(10, 1), (20, 1), (15, 1), (9, 0), (21, 0)] {
        let report = engine.evaluate(json!({"value": value}));
        assert_eq!(
            report.summary.triggered_rules, expected,
            "between(10, 20) 对 {} 的结果错误",
            value
        );
    }
}

#[test]
fn custom_expression_rule_end_to_end() {
    let engine = LogicEngine::new();
    engine
        .add_rule(
            Rule::new(
                "optimal",
                Condition::custom(
                    "temperature > 25 and humidity < 70 and (status == 'active' or priority == 'high')",
                ),
            )
            .with_actions(ActionSet::tags(["optimal-conditions"])),
        )
        .unwrap();

    let matched = engine.evaluate(json!({
        "temperature": 28, "humidity": 60, "status": "active"
    }));
    assert_eq!(matched.tags, vec!["optimal-conditions"]);

    let unmatched = engine.evaluate(json!({
        "temperature": 28, "humidity": 60, "status": "idle", "priority": "low"
    }));
    assert!(unmatched.tags.is_empty());
}

#[test]
fn predicate_rule_invokes_capability_with_record() {
    let engine = LogicEngine::new();
    engine
        .add_rule(
            Rule::new(
                "complex",
                Condition::predicate(|record| {
                    let temp = record
                        .get_field("temperature")
                        .and_then(|v| v.as_f64())
                        .unwrap_or_default();
                    Ok(temp > 25.0 && record.get_field("status") == Some(&json!("active")))
                }),
            )
            .with_actions(ActionSet::tags(["predicate-hit"])),
        )
        .unwrap();

    let report = engine.evaluate(json!({"temperature": 30, "status": "active"}));
    assert_eq!(report.tags, vec!["predicate-hit"]);

    let report = engine.evaluate(json!({"temperature": 30, "status": "idle"}));
    assert!(report.tags.is_empty());
}
