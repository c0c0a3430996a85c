//! 条件评估器
//!
//! 对四种条件变体做无状态分发：(条件, 记录) → 布尔，可能失败。
//! 失败永远不会向上穿透到 `evaluate` 的调用方，由引擎按规则隔离。

use crate::compiler::CompiledRule;
use crate::error::{Result, RuleError};
use crate::models::{Condition, ThresholdValue};
use crate::operators::{MatchMode, ThresholdOp};
use crate::record::Record;
use serde_json::Value;

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 评估一条已编译规则的条件
    pub fn evaluate(rule: &CompiledRule, record: &Record) -> Result<bool> {
        match rule.condition() {
            Condition::Predicate { predicate } => predicate.check(record),
            Condition::Threshold {
                field,
                operator,
                threshold,
            } => Self::check_threshold(record.get_field(field), *operator, threshold),
            Condition::Keyword {
                field,
                keywords,
                match_mode,
            } => Ok(Self::check_keyword(
                &record.text_of(field),
                keywords,
                *match_mode,
            )),
            Condition::Custom { .. } => {
                let program = rule.program().ok_or_else(|| {
                    RuleError::ExpressionFailed("表达式未编译".to_string())
                })?;
                // 表达式内部的求值失败统一归为 ExpressionFailed
                program.eval(record).map_err(|e| match e {
                    RuleError::ExpressionFailed(_) => e,
                    other => RuleError::ExpressionFailed(other.to_string()),
                })
            }
        }
    }

    /// 阈值比较
    ///
    /// 字段缺失按未命中处理（fail closed，不算错误）；字段存在但无法
    /// 按数值解读时返回类型不匹配，由引擎降级为该规则的诊断。
    pub fn check_threshold(
        value: Option<&Value>,
        operator: ThresholdOp,
        threshold: &ThresholdValue,
    ) -> Result<bool> {
        let Some(value) = value else {
            return Ok(false);
        };

        let value = Self::as_f64(value).ok_or_else(|| RuleError::TypeMismatch {
            expected: "number".to_string(),
            actual: Self::type_name(value).to_string(),
        })?;

        match (operator, threshold) {
            // between 双侧闭区间：min <= value <= max
            (ThresholdOp::Between, ThresholdValue::Range { min, max }) => {
                Ok(value >= *min && value <= *max)
            }
            (ThresholdOp::Between, ThresholdValue::Scalar(_)) => Err(RuleError::TypeMismatch {
                expected: "{min, max}".to_string(),
                actual: "number".to_string(),
            }),
            (op, ThresholdValue::Scalar(threshold)) => {
                let threshold = *threshold;
                Ok(match op {
                    ThresholdOp::GreaterThan => value > threshold,
                    ThresholdOp::GreaterThanOrEqual => value >= threshold,
                    ThresholdOp::LessThan => value < threshold,
                    ThresholdOp::LessThanOrEqual => value <= threshold,
                    ThresholdOp::Equal => (value - threshold).abs() < f64::EPSILON,
                    ThresholdOp::NotEqual => (value - threshold).abs() >= f64::EPSILON,
                    ThresholdOp::Between => unreachable!(),
                })
            }
            (_, ThresholdValue::Range { .. }) => Err(RuleError::TypeMismatch {
                expected: "number".to_string(),
                actual: "{min, max}".to_string(),
            }),
        }
    }

    /// 关键字匹配（大小写不敏感）
    ///
    /// any/all 是子串包含；exact 要求整段文本与某个关键字完全相等。
    pub fn check_keyword(text: &str, keywords: &[String], mode: MatchMode) -> bool {
        let text = text.to_lowercase();
        match mode {
            MatchMode::Any => keywords.iter().any(|k| text.contains(&k.to_lowercase())),
            MatchMode::All => keywords.iter().all(|k| text.contains(&k.to_lowercase())),
            MatchMode::Exact => keywords.iter().any(|k| k.to_lowercase() == text),
        }
    }

    /// 尝试将 Value 转换为 f64；数字字符串也可参与数值比较
    pub(crate) fn as_f64(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// 获取值的类型名称
    pub(crate) fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}
