//! 条件操作符定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 阈值比较操作符
///
/// `Between` 是唯一接受 `{min, max}` 负载的操作符，双侧闭区间。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdOp {
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    Equal,
    NotEqual,
    Between,
}

impl fmt::Display for ThresholdOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::GreaterThan => "greater_than",
            Self::GreaterThanOrEqual => "greater_than_or_equal",
            Self::LessThan => "less_than",
            Self::LessThanOrEqual => "less_than_or_equal",
            Self::Equal => "equal",
            Self::NotEqual => "not_equal",
            Self::Between => "between",
        };
        write!(f, "{}", s)
    }
}

/// 关键字匹配模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// 任一关键字是文本的子串即命中
    Any,
    /// 全部关键字都是文本的子串才命中
    All,
    /// 整段文本与某个关键字完全相等（大小写折叠后）才命中
    Exact,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::All => write!(f, "all"),
            Self::Exact => write!(f, "exact"),
        }
    }
}
