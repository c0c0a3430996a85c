//! 失败隔离与诊断通道场景

use logic_engine::{ActionSet, Condition, LogicEngine, Rule, ThresholdOp};
use serde_json::json;

#[test]
fn failing_predicate_does_not_block_later_rules() {
    let engine = LogicEngine::new();
    engine
        .add_rule(
            Rule::new(
                "exploding",
                Condition::predicate(|_| anyhow::bail!("downstream unavailable")),
            )
            .with_id("exploding"),
        )
        .unwrap();
    engine
        .add_rule(
            Rule::new(
                "threshold",
                Condition::threshold("temperature", ThresholdOp::GreaterThan, 30.0),
            )
            .with_id("threshold")
            .with_actions(ActionSet::tags(["high-temp"])),
        )
        .unwrap();

    let report = engine.evaluate(json!({"temperature": 35}));

    assert_eq!(report.summary.total_rules, 2);
    assert_eq!(report.summary.triggered_rules, 1);
    assert_eq!(report.results[0].rule_id, "threshold");
    assert_eq!(report.tags, vec!["high-temp"]);
}

#[test]
fn each_failure_produces_exactly_one_diagnostic() {
    let engine = LogicEngine::new();
    engine
        .add_rule(
            Rule::new("bad_predicate", Condition::predicate(|_| anyhow::bail!("boom")))
                .with_id("bad_predicate"),
        )
        .unwrap();
    engine
        .add_rule(
            Rule::new("bad_expression", Condition::custom("status > 10"))
                .with_id("bad_expression"),
        )
        .unwrap();

    let report = engine.evaluate(json!({"status": "active"}));

    assert_eq!(report.summary.triggered_rules, 0);
    assert_eq!(report.diagnostics.len(), 2);
    assert_eq!(report.diagnostics[0].rule_id, "bad_predicate");
    assert_eq!(report.diagnostics[0].kind, "predicate_failed");
    assert_eq!(report.diagnostics[1].rule_id, "bad_expression");
    assert_eq!(report.diagnostics[1].kind, "expression_failed");
}

#[test]
fn diagnostics_do_not_leak_into_results() {
    let engine = LogicEngine::new();
    engine
        .add_rule(Rule::new("failing", Condition::predicate(|_| anyhow::bail!("x"))))
        .unwrap();

    let report = engine.evaluate(json!({}));

    // 失败的规则不出现在 results 里，只出现在诊断通道
    assert!(report.results.is_empty());
    assert_eq!(report.summary.triggered_rules, 0);
    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn configuration_errors_surface_at_add_time_not_evaluation() {
    let engine = LogicEngine::new();

    let err = engine
        .add_rule(Rule::new(
            "bad",
            Condition::threshold("value", ThresholdOp::Between, 10.0),
        ))
        .unwrap_err();
    assert_eq!(err.kind(), "invalid_rule");

    // 被拒绝的规则没有入库，评估照常进行
    let report = engine.evaluate(json!({"value": 15}));
    assert_eq!(report.summary.total_rules, 0);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn evaluate_never_panics_on_hostile_records() {
    let engine = LogicEngine::new();
    engine
        .add_rule(Rule::new(
            "threshold",
            Condition::threshold("a.b.c", ThresholdOp::GreaterThan, 0.0),
        ))
        .unwrap();
    engine
        .add_rule(Rule::new(
            "keyword",
            Condition::keyword("message", ["x"], logic_engine::MatchMode::Any),
        ))
        .unwrap();
    engine
        .add_rule(Rule::new("custom", Condition::custom("a.b.c > 0")))
        .unwrap();

    for record in [
        json!(null),
        json!([1, 2, 3]),
        json!("just a string"),
        json!({"a": {"b": null}}),
        json!({"message": {"nested": true}}),
    ] {
        let report = engine.evaluate(record);
        // 报告始终良构
        assert_eq!(report.summary.triggered_rules, report.results.len());
        assert_eq!(report.summary.tags_generated, report.tags.len());
        assert_eq!(report.summary.alerts_generated, report.alerts.len());
    }
}
