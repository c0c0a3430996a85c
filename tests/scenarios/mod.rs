//! 引擎端到端场景测试
//!
//! 覆盖：
//! - 各条件变体的命中/未命中场景
//! - 标签与告警聚合的确定性
//! - 规则级失败隔离与诊断通道

pub mod aggregation;
pub mod conditions;
pub mod isolation;
