//! 规则编译器
//!
//! 在注册期完成规则的形状校验和自定义表达式的预编译。
//! 配置错误在这里同步返回给调用方，不会污染任何进行中的评估。

use crate::error::{Result, RuleError};
use crate::expr::Program;
use crate::models::{ActionSet, Condition, Rule, ThresholdValue};
use crate::operators::ThresholdOp;

/// 编译后的规则
///
/// 评估期只读；自定义条件的 AST 在这里缓存，避免每次评估重复解析。
#[derive(Debug, Clone)]
pub struct CompiledRule {
    rule: Rule,
    label: String,
    program: Option<Program>,
}

impl CompiledRule {
    /// 报告用标识
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn condition(&self) -> &Condition {
        &self.rule.condition
    }

    pub fn actions(&self) -> Option<&ActionSet> {
        self.rule.actions.as_ref()
    }

    /// 自定义条件的预编译程序；其余变体为 None
    pub fn program(&self) -> Option<&Program> {
        self.program.as_ref()
    }
}

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则；形状错误和表达式解析错误都在这里拒绝
    pub fn compile(rule: Rule) -> Result<CompiledRule> {
        let label = rule
            .label()
            .ok_or_else(|| {
                RuleError::InvalidRule("规则必须提供 id 或 name 之一".to_string())
            })?
            .to_string();

        Self::validate_condition(&rule.condition, &label)?;

        let program = match &rule.condition {
            Condition::Custom { expression } => Some(Program::compile(expression)?),
            _ => None,
        };

        Ok(CompiledRule {
            rule,
            label,
            program,
        })
    }

    /// 从 JSON 字符串编译规则
    pub fn compile_from_json(json: &str) -> Result<CompiledRule> {
        let rule: Rule = serde_json::from_str(json)?;
        Self::compile(rule)
    }

    fn validate_condition(condition: &Condition, label: &str) -> Result<()> {
        match condition {
            // 谓词的能力附加与否在评估期才可见；未附加会按失败隔离
            Condition::Predicate { .. } => Ok(()),
            Condition::Threshold {
                field,
                operator,
                threshold,
            } => {
                if field.is_empty() {
                    return Err(RuleError::InvalidRule(format!(
                        "规则 '{}' 的阈值条件缺少字段名",
                        label
                    )));
                }
                match (operator, threshold) {
                    (ThresholdOp::Between, ThresholdValue::Range { min, max }) => {
                        if min > max {
                            return Err(RuleError::InvalidRule(format!(
                                "规则 '{}' 的 between 区间无效: min {} > max {}",
                                label, min, max
                            )));
                        }
                        Ok(())
                    }
                    (ThresholdOp::Between, ThresholdValue::Scalar(_)) => {
                        Err(RuleError::InvalidRule(format!(
                            "规则 '{}' 的 between 操作符需要 {{min, max}} 负载",
                            label
                        )))
                    }
                    (op, ThresholdValue::Range { .. }) => Err(RuleError::InvalidRule(format!(
                        "规则 '{}' 的 {} 操作符需要单个数值阈值",
                        label, op
                    ))),
                    (_, ThresholdValue::Scalar(_)) => Ok(()),
                }
            }
            Condition::Keyword { field, keywords, .. } => {
                if field.is_empty() {
                    return Err(RuleError::InvalidRule(format!(
                        "规则 '{}' 的关键字条件缺少字段名",
                        label
                    )));
                }
                if keywords.is_empty() {
                    return Err(RuleError::InvalidRule(format!(
                        "规则 '{}' 的关键字列表不能为空",
                        label
                    )));
                }
                if keywords.iter().any(|k| k.is_empty()) {
                    return Err(RuleError::InvalidRule(format!(
                        "规则 '{}' 的关键字不能是空串",
                        label
                    )));
                }
                Ok(())
            }
            // 表达式在 compile 中解析，这里无需额外校验
            Condition::Custom { .. } => Ok(()),
        }
    }
}
