//! 动作处理器
//!
//! 把命中规则的动作声明转换为该规则的孤立增量贡献。
//! 本组件不做 I/O，也不会失败：动作的形状错误属于配置错误，
//! 在规则注册期就已被拒绝。

use crate::models::{ActionSet, Alert};
use crate::record::Record;
use chrono::{DateTime, Utc};
use tracing::debug;

/// 单条规则的增量贡献
///
/// 各规则的贡献互相隔离，由引擎的归并步骤统一合入共享累积器。
#[derive(Debug, Clone, Default)]
pub struct ActionContribution {
    /// 本规则新增的标签（内部已去重，保持声明顺序）
    pub tags: Vec<String>,
    /// 本规则触发的告警（0 或 1 条）
    pub alerts: Vec<Alert>,
}

impl ActionContribution {
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.alerts.is_empty()
    }
}

/// 动作处理器
pub struct ActionProcessor;

impl ActionProcessor {
    /// apply(动作声明, 记录) → 贡献
    ///
    /// 告警携带评估时刻的时间戳和记录的深拷贝快照。
    pub fn apply(
        actions: &ActionSet,
        record: &Record,
        timestamp: DateTime<Utc>,
    ) -> ActionContribution {
        let mut contribution = ActionContribution::default();

        for tag in &actions.add_tags {
            if !contribution.tags.iter().any(|t| t == tag) {
                contribution.tags.push(tag.clone());
            }
        }

        if let Some(spec) = &actions.raise_alert {
            contribution.alerts.push(Alert {
                message: spec.message.clone(),
                severity: spec.severity.clone(),
                timestamp,
                data: record.snapshot(),
            });
        }

        // transform 是扩展点：接受但不生效，命中的规则永远看不到
        // 被兄弟规则改写过的记录
        if let Some(transform) = &actions.transform {
            debug!(?transform, "transform 动作未接入运行时，已忽略");
        }

        contribution
    }
}
