//! 规则存储
//!
//! 按注册顺序保存的只追加序列。没有删除和更新操作：规则一经注册，
//! 在引擎实例的生命周期内不可变。评估期间存储被冻结（读锁持有
//! 整个评估过程），并发的注册调用会在写锁上串行化，而不是未定义行为。

use crate::compiler::{CompiledRule, RuleCompiler};
use crate::error::Result;
use crate::models::Rule;
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// 规则存储
#[derive(Clone, Default)]
pub struct RuleStore {
    rules: Arc<RwLock<Vec<Arc<CompiledRule>>>>,
}

impl RuleStore {
    /// 创建空存储
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前注册的规则数量
    pub fn len(&self) -> usize {
        self.rules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.read().is_empty()
    }

    /// 追加一条规则；返回其报告用标识
    ///
    /// 形状校验和表达式预编译都发生在这里，失败的规则不会入库。
    #[instrument(skip(self, rule), fields(rule = %rule.label().unwrap_or("-")))]
    pub fn add(&self, rule: Rule) -> Result<String> {
        let compiled = RuleCompiler::compile(rule)?;
        let label = compiled.label().to_string();

        self.rules.write().push(Arc::new(compiled));

        info!("规则已注册: {}", label);
        Ok(label)
    }

    /// 从 JSON 字符串追加一条规则
    pub fn add_from_json(&self, json: &str) -> Result<String> {
        let compiled = RuleCompiler::compile_from_json(json)?;
        let label = compiled.label().to_string();

        self.rules.write().push(Arc::new(compiled));

        info!("规则已注册: {}", label);
        Ok(label)
    }

    /// 批量追加；单条失败跳过，不影响其余规则
    #[instrument(skip(self, rules))]
    pub fn add_batch(&self, rules: Vec<Rule>) -> Vec<String> {
        let mut loaded = Vec::with_capacity(rules.len());
        let mut failed = 0usize;

        for rule in rules {
            match self.add(rule) {
                Ok(label) => loaded.push(label),
                Err(e) => {
                    failed += 1;
                    warn!(error = %e, "规则注册失败，已跳过");
                }
            }
        }

        info!("批量注册完成: {} 成功, {} 失败", loaded.len(), failed);
        loaded
    }

    /// 注册顺序的规则序列快照
    pub fn rules(&self) -> Vec<Arc<CompiledRule>> {
        self.rules.read().clone()
    }

    /// 为一次评估冻结存储
    ///
    /// 守卫存续期间规则序列不可变更；并发的 `add` 会阻塞到评估结束。
    pub(crate) fn frozen(&self) -> RwLockReadGuard<'_, Vec<Arc<CompiledRule>>> {
        self.rules.read()
    }
}
