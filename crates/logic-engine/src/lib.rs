//! 逻辑规则引擎
//!
//! 对一条输入记录评估一组有序的声明式规则，聚合命中规则的
//! 副作用（派生标签、触发告警），产出确定性的评估报告。支持：
//! - 四种条件变体：谓词、阈值比较、关键字匹配、受限布尔表达式
//! - 规则级失败隔离：单条规则出错不影响其余规则
//! - 注册期校验与表达式预编译
//! - 标签与告警的确定性聚合，统计量全部派生

pub mod actions;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod expr;
pub mod models;
pub mod operators;
pub mod record;
pub mod store;
pub mod telemetry;

pub use actions::{ActionContribution, ActionProcessor};
pub use compiler::{CompiledRule, RuleCompiler};
pub use engine::{LogicEngine, RuleOutcome};
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use models::{
    ActionSet, Alert, AlertSpec, Condition, Diagnostic, EvaluationReport, EvaluationSummary,
    Predicate, PredicateFn, Rule, RuleMatch, ThresholdValue,
};
pub use operators::{MatchMode, ThresholdOp};
pub use record::Record;
pub use store::RuleStore;
