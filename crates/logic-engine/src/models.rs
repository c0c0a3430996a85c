//! 规则引擎领域模型

use crate::error::{Result, RuleError};
use crate::operators::{MatchMode, ThresholdOp};
use crate::record::Record;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// 谓词能力的函数签名
///
/// 谓词由调用方在规则构造期注册，评估期以记录为入参调用；
/// 任何失败都会被捕获并转换为 [`RuleError::PredicateFailed`]。
pub type PredicateFn = Arc<dyn Fn(&Record) -> anyhow::Result<bool> + Send + Sync>;

/// 不透明的布尔谓词能力
///
/// 只能在代码中构造。从 JSON 反序列化得到的谓词是"未附加"状态，
/// 评估时按失败处理（fail closed），不会静默命中。
#[derive(Clone, Default)]
pub struct Predicate {
    func: Option<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(func: F) -> Self
    where
        F: Fn(&Record) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self {
            func: Some(Arc::new(func)),
        }
    }

    /// 调用谓词；未附加能力或能力自身失败都归为 `PredicateFailed`
    pub fn check(&self, record: &Record) -> Result<bool> {
        match &self.func {
            Some(func) => func(record).map_err(|e| RuleError::PredicateFailed(e.to_string())),
            None => Err(RuleError::PredicateFailed("谓词能力未附加".to_string())),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.func.is_some()
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_attached() {
            write!(f, "Predicate(<attached>)")
        } else {
            write!(f, "Predicate(<detached>)")
        }
    }
}

/// 阈值负载
///
/// `between` 操作符使用 `Range`，其余操作符使用 `Scalar`；
/// 注册期校验保证两者不会错配。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThresholdValue {
    Scalar(f64),
    Range { min: f64, max: f64 },
}

impl ThresholdValue {
    pub fn range(min: f64, max: f64) -> Self {
        Self::Range { min, max }
    }
}

impl From<f64> for ThresholdValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<i64> for ThresholdValue {
    fn from(value: i64) -> Self {
        Self::Scalar(value as f64)
    }
}

/// 条件：闭合的四变体类型
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// 调用方注册的不透明布尔能力
    Predicate {
        #[serde(skip)]
        predicate: Predicate,
    },
    /// 字段与数值阈值的比较
    Threshold {
        field: String,
        operator: ThresholdOp,
        threshold: ThresholdValue,
    },
    /// 字段文本的关键字匹配（大小写不敏感）
    Keyword {
        field: String,
        keywords: Vec<String>,
        #[serde(rename = "match")]
        match_mode: MatchMode,
    },
    /// 受限布尔表达式，注册期编译为 AST（见 expr 模块）
    Custom { expression: String },
}

impl Condition {
    pub fn predicate<F>(func: F) -> Self
    where
        F: Fn(&Record) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        Self::Predicate {
            predicate: Predicate::new(func),
        }
    }

    pub fn threshold(
        field: impl Into<String>,
        operator: ThresholdOp,
        threshold: impl Into<ThresholdValue>,
    ) -> Self {
        Self::Threshold {
            field: field.into(),
            operator,
            threshold: threshold.into(),
        }
    }

    pub fn keyword<I, S>(field: impl Into<String>, keywords: I, match_mode: MatchMode) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Keyword {
            field: field.into(),
            keywords: keywords.into_iter().map(Into::into).collect(),
            match_mode,
        }
    }

    pub fn custom(expression: impl Into<String>) -> Self {
        Self::Custom {
            expression: expression.into(),
        }
    }

    /// 变体名，用于日志和诊断
    pub fn variant(&self) -> &'static str {
        match self {
            Self::Predicate { .. } => "predicate",
            Self::Threshold { .. } => "threshold",
            Self::Keyword { .. } => "keyword",
            Self::Custom { .. } => "custom",
        }
    }
}

/// 告警声明（规则配置的一部分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertSpec {
    #[serde(default = "default_alert_message")]
    pub message: String,
    #[serde(default = "default_alert_severity")]
    pub severity: String,
}

fn default_alert_message() -> String {
    "Alert triggered".to_string()
}

fn default_alert_severity() -> String {
    "medium".to_string()
}

impl Default for AlertSpec {
    fn default() -> Self {
        Self {
            message: default_alert_message(),
            severity: default_alert_severity(),
        }
    }
}

impl AlertSpec {
    pub fn new(message: impl Into<String>, severity: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: severity.into(),
        }
    }
}

/// 规则的声明式副作用集合
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub add_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raise_alert: Option<AlertSpec>,
    /// 扩展点：接受但没有运行时效果，永远不会改写被评估的记录
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<Value>,
}

impl ActionSet {
    pub fn tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            add_tags: tags.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_alert(mut self, alert: AlertSpec) -> Self {
        self.raise_alert = Some(alert);
        self
    }
}

/// 规则定义
///
/// 注册后不可变：引擎只追加，从不修改或删除。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    /// 报告用标识；`id` 和 `name` 至少提供一个，不要求全局唯一
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub condition: Condition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<ActionSet>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(name: impl Into<String>, condition: Condition) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            name: Some(name.into()),
            condition,
            actions: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_actions(mut self, actions: ActionSet) -> Self {
        self.actions = Some(actions);
        self
    }

    /// 报告用标识：优先 `id`，其次 `name`
    pub fn label(&self) -> Option<&str> {
        self.id.as_deref().or(self.name.as_deref())
    }
}

/// 已触发的告警
#[derive(Debug, Clone, Serialize)]
pub struct Alert {
    pub message: String,
    pub severity: String,
    pub timestamp: DateTime<Utc>,
    /// 评估时输入记录的深拷贝快照
    pub data: Value,
}

/// 单条命中记录；只有命中的规则才会产生条目
#[derive(Debug, Clone, Serialize)]
pub struct RuleMatch {
    pub rule_id: String,
    pub condition: Condition,
    pub met: bool,
}

impl RuleMatch {
    pub fn new(rule_id: impl Into<String>, condition: Condition) -> Self {
        Self {
            rule_id: rule_id.into(),
            condition,
            met: true,
        }
    }
}

/// 被隔离的规则失败，作为数据记录在报告中
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub rule_id: String,
    pub kind: String,
    pub message: String,
}

/// 派生统计量，只由最终计数推出，不可独立设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EvaluationSummary {
    pub total_rules: usize,
    pub triggered_rules: usize,
    pub tags_generated: usize,
    pub alerts_generated: usize,
}

/// 一次评估的完整报告
///
/// 每次 `evaluate` 调用新建一份，所有权完全归调用方；
/// 引擎之后不再持有任何引用。
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub input: Value,
    pub results: Vec<RuleMatch>,
    /// 去重后的标签，保持首次插入顺序
    pub tags: Vec<String>,
    /// 按规则注册顺序排列的告警
    pub alerts: Vec<Alert>,
    pub summary: EvaluationSummary,
    /// 被隔离失败的诊断通道；按需消费，不影响报告其余部分
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}
