//! 评估引擎
//!
//! 编排单次评估：按注册顺序逐条评估规则，按规则隔离失败，
//! 命中时计算该规则的孤立贡献，最后由唯一的归并步骤确定性地
//! 合入共享累积器并推导统计量。`evaluate` 永不失败——任何一条
//! 规则出错都不会妨碍其余规则被评估。

use crate::actions::{ActionContribution, ActionProcessor};
use crate::compiler::CompiledRule;
use crate::error::{Result, RuleError};
use crate::evaluator::ConditionEvaluator;
use crate::models::{
    Diagnostic, EvaluationReport, EvaluationSummary, Rule, RuleMatch,
};
use crate::record::Record;
use crate::store::RuleStore;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// 单条规则的评估结局
///
/// 取代"捕获并打日志"的异常抑制：失败是显式的数据，由编排方聚合。
#[derive(Debug)]
pub enum RuleOutcome {
    /// 条件成立；携带命中条目和本规则的孤立贡献
    Matched {
        entry: RuleMatch,
        contribution: ActionContribution,
    },
    /// 条件不成立
    NotMatched,
    /// 评估失败；已隔离到本规则，贡献为空
    Errored(RuleError),
}

/// 规则评估引擎
#[derive(Clone, Default)]
pub struct LogicEngine {
    store: RuleStore,
}

impl LogicEngine {
    /// 创建空引擎
    pub fn new() -> Self {
        Self::default()
    }

    /// 复用既有存储创建引擎
    pub fn with_store(store: RuleStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    /// 配置期入口：追加一条规则
    ///
    /// 这是唯一会同步返回错误的变更接口；配置错误不会污染评估。
    pub fn add_rule(&self, rule: Rule) -> Result<String> {
        self.store.add(rule)
    }

    /// 从 JSON 字符串追加一条规则
    pub fn add_rule_from_json(&self, json: &str) -> Result<String> {
        self.store.add_from_json(json)
    }

    /// 运行时唯一入口：评估一条输入记录
    ///
    /// 永不失败，总是返回完整的报告；空规则集返回全零统计。
    /// 评估期间规则存储被冻结，并发注册会串行化到评估之后。
    #[instrument(skip(self, record))]
    pub fn evaluate(&self, record: Value) -> EvaluationReport {
        let record = Record::new(record);
        let now = Utc::now();
        let rules = self.store.frozen();

        let mut results = Vec::new();
        let mut tags: Vec<String> = Vec::new();
        let mut alerts = Vec::new();
        let mut diagnostics = Vec::new();

        for rule in rules.iter() {
            match Self::evaluate_rule(rule, &record, now) {
                RuleOutcome::Matched {
                    entry,
                    contribution,
                } => {
                    debug!(rule = %rule.label(), "规则命中");
                    results.push(entry);
                    // 标签并集：去重，保持首次插入顺序
                    for tag in contribution.tags {
                        if !tags.contains(&tag) {
                            tags.push(tag);
                        }
                    }
                    // 告警顺序跟随规则注册顺序
                    alerts.extend(contribution.alerts);
                }
                RuleOutcome::NotMatched => {}
                RuleOutcome::Errored(err) => {
                    warn!(rule = %rule.label(), error = %err, "规则评估失败，已隔离");
                    diagnostics.push(Diagnostic {
                        rule_id: rule.label().to_string(),
                        kind: err.kind().to_string(),
                        message: err.to_string(),
                    });
                }
            }
        }

        let summary = EvaluationSummary {
            total_rules: rules.len(),
            triggered_rules: results.len(),
            tags_generated: tags.len(),
            alerts_generated: alerts.len(),
        };
        drop(rules);

        EvaluationReport {
            input: record.into_inner(),
            results,
            tags,
            alerts,
            summary,
            diagnostics,
        }
    }

    /// 纯函数：(规则, 记录, 时间戳) → 孤立结局
    ///
    /// 不触碰任何共享状态，规则之间互相独立，这使并发评估在
    /// 构造上就是安全的；归并始终由 `evaluate` 单点完成。
    pub fn evaluate_rule(
        rule: &CompiledRule,
        record: &Record,
        timestamp: DateTime<Utc>,
    ) -> RuleOutcome {
        match ConditionEvaluator::evaluate(rule, record) {
            Ok(true) => {
                let contribution = rule
                    .actions()
                    .map(|actions| ActionProcessor::apply(actions, record, timestamp))
                    .unwrap_or_default();
                RuleOutcome::Matched {
                    entry: RuleMatch::new(rule.label(), rule.condition().clone()),
                    contribution,
                }
            }
            Ok(false) => RuleOutcome::NotMatched,
            Err(err) => RuleOutcome::Errored(err),
        }
    }
}
