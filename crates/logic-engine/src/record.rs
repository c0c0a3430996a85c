//! 评估输入记录
//!
//! 对外边界是开放的 JSON 映射（字段名 → 标量 / 字符串 / 嵌套结构），
//! 引擎内部统一通过 [`Record`] 做字段提取和文本化。

use serde_json::Value;

/// 一次评估的输入记录
#[derive(Debug, Clone, Default)]
pub struct Record {
    data: Value,
}

impl Record {
    pub fn new(data: Value) -> Self {
        Self { data }
    }

    /// 从 JSON 字符串创建
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let data: Value = serde_json::from_str(json)?;
        Ok(Self { data })
    }

    /// 获取字段值（支持点号分隔的路径，如 "event.type" 或 "user.profile.age"）
    pub fn get_field(&self, path: &str) -> Option<&Value> {
        let mut current = &self.data;

        for part in path.split('.') {
            match current {
                Value::Object(map) => {
                    current = map.get(part)?;
                }
                Value::Array(arr) => {
                    // 支持数组索引访问，如 "items.0.name"
                    let index: usize = part.parse().ok()?;
                    current = arr.get(index)?;
                }
                _ => return None,
            }
        }

        Some(current)
    }

    /// 字段的文本化表示，用于关键字匹配
    ///
    /// 字段缺失返回空串；字符串原样返回；其余值使用 JSON 文本表示。
    pub fn text_of(&self, path: &str) -> String {
        match self.get_field(path) {
            None => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// 输入记录的深拷贝快照，用于告警留存
    ///
    /// 快照与调用方持有的记录再无关联，后续修改不会回溯影响已产生的告警。
    pub fn snapshot(&self) -> Value {
        self.data.clone()
    }

    /// 获取底层数据
    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn into_inner(self) -> Value {
        self.data
    }
}

impl From<Value> for Record {
    fn from(data: Value) -> Self {
        Self::new(data)
    }
}
