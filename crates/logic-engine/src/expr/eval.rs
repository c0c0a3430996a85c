//! 受限表达式的树遍历求值
//!
//! 求值是有界的：每个节点消耗一个步数，预算耗尽立即失败。
//! 没有 I/O，没有用户代码回调，不会阻塞。

use super::parser::{CompareOp, Expr, Literal};
use crate::error::{Result, RuleError};
use crate::evaluator::ConditionEvaluator;
use crate::record::Record;
use serde_json::Value;

/// 单个表达式的求值步数预算
pub const MAX_EVAL_STEPS: usize = 4096;

/// 求值期的操作数
///
/// `Missing` 与 `Null` 有区分：字段缺失与字段显式为 null 不是一回事。
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Missing,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Operand {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => n.as_f64().map(Self::Number).unwrap_or(Self::Null),
            Value::String(s) => Self::Str(s.clone()),
            // 数组/对象不参与比较，按文本化后的 JSON 处理
            other => Self::Str(other.to_string()),
        }
    }

    fn type_name(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::Str(_) => "string",
        }
    }

    /// 数值视角；与阈值评估器一致，数字字符串可参与数值比较
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Str(s) => s.parse().ok(),
            _ => None,
        }
    }
}

/// 树遍历解释器
pub struct Interpreter {
    budget: usize,
    steps_remaining: usize,
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_budget(MAX_EVAL_STEPS)
    }

    /// 指定步数预算；正常路径用 [`MAX_EVAL_STEPS`]
    pub fn with_budget(steps: usize) -> Self {
        Self {
            budget: steps,
            steps_remaining: steps,
        }
    }

    /// 求出整个表达式的布尔值
    pub fn run(&mut self, expr: &Expr, record: &Record) -> Result<bool> {
        self.eval_bool(expr, record)
    }

    fn consume_step(&mut self) -> Result<()> {
        if self.steps_remaining == 0 {
            return Err(RuleError::ExpressionFailed(format!(
                "求值步数超过预算 {}",
                self.budget
            )));
        }
        self.steps_remaining -= 1;
        Ok(())
    }

    /// 布尔上下文求值；and/or 短路
    fn eval_bool(&mut self, expr: &Expr, record: &Record) -> Result<bool> {
        self.consume_step()?;
        match expr {
            Expr::Literal(Literal::Bool(b)) => Ok(*b),
            Expr::Literal(other) => Err(RuleError::TypeMismatch {
                expected: "boolean".to_string(),
                actual: literal_type_name(other).to_string(),
            }),
            Expr::Field(path) => match record.get_field(path) {
                Some(Value::Bool(b)) => Ok(*b),
                Some(other) => Err(RuleError::TypeMismatch {
                    expected: "boolean".to_string(),
                    actual: ConditionEvaluator::type_name(other).to_string(),
                }),
                None => Err(RuleError::TypeMismatch {
                    expected: "boolean".to_string(),
                    actual: format!("缺失字段 '{}'", path),
                }),
            },
            Expr::Compare { op, lhs, rhs } => {
                let lhs = self.eval_operand(lhs, record)?;
                let rhs = self.eval_operand(rhs, record)?;
                self.compare(*op, &lhs, &rhs)
            }
            Expr::And(lhs, rhs) => {
                if !self.eval_bool(lhs, record)? {
                    return Ok(false);
                }
                self.eval_bool(rhs, record)
            }
            Expr::Or(lhs, rhs) => {
                if self.eval_bool(lhs, record)? {
                    return Ok(true);
                }
                self.eval_bool(rhs, record)
            }
            Expr::Not(inner) => Ok(!self.eval_bool(inner, record)?),
        }
    }

    /// 比较操作数上下文求值
    fn eval_operand(&mut self, expr: &Expr, record: &Record) -> Result<Operand> {
        self.consume_step()?;
        match expr {
            Expr::Literal(Literal::Number(n)) => Ok(Operand::Number(*n)),
            Expr::Literal(Literal::Str(s)) => Ok(Operand::Str(s.clone())),
            Expr::Literal(Literal::Bool(b)) => Ok(Operand::Bool(*b)),
            Expr::Literal(Literal::Null) => Ok(Operand::Null),
            Expr::Field(path) => Ok(record
                .get_field(path)
                .map(Operand::from_value)
                .unwrap_or(Operand::Missing)),
            // 布尔子表达式可以出现在比较位置，如 (a > 1) == true
            other => self.eval_bool(other, record).map(Operand::Bool),
        }
    }

    fn compare(&self, op: CompareOp, lhs: &Operand, rhs: &Operand) -> Result<bool> {
        match op {
            CompareOp::Eq => Ok(Self::equals(lhs, rhs)),
            CompareOp::Neq => Ok(!Self::equals(lhs, rhs)),
            _ => {
                let lhs_num = lhs.as_f64().ok_or_else(|| RuleError::TypeMismatch {
                    expected: "number".to_string(),
                    actual: lhs.type_name().to_string(),
                })?;
                let rhs_num = rhs.as_f64().ok_or_else(|| RuleError::TypeMismatch {
                    expected: "number".to_string(),
                    actual: rhs.type_name().to_string(),
                })?;
                Ok(match op {
                    CompareOp::Gt => lhs_num > rhs_num,
                    CompareOp::Gte => lhs_num >= rhs_num,
                    CompareOp::Lt => lhs_num < rhs_num,
                    CompareOp::Lte => lhs_num <= rhs_num,
                    CompareOp::Eq | CompareOp::Neq => unreachable!(),
                })
            }
        }
    }

    /// 相等比较：数值统一按浮点比较，类型不同不相等，缺失字段不等于任何值
    fn equals(lhs: &Operand, rhs: &Operand) -> bool {
        if let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) {
            return (a - b).abs() < f64::EPSILON;
        }
        match (lhs, rhs) {
            (Operand::Missing, _) | (_, Operand::Missing) => false,
            (a, b) => a == b,
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_type_name(literal: &Literal) -> &'static str {
    match literal {
        Literal::Number(_) => "number",
        Literal::Str(_) => "string",
        Literal::Bool(_) => "boolean",
        Literal::Null => "null",
    }
}
