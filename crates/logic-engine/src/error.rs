//! 规则引擎错误类型

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleError {
    /// 注册期配置错误，唯一会同步返回给变更接口调用方的错误类别
    #[error("规则配置无效: {0}")]
    InvalidRule(String),

    #[error("表达式解析失败: {0}")]
    ExpressionParse(String),

    #[error("谓词执行失败: {0}")]
    PredicateFailed(String),

    #[error("表达式求值失败: {0}")]
    ExpressionFailed(String),

    #[error("类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),
}

impl RuleError {
    /// 诊断分类标识，写入 `Diagnostic::kind`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRule(_) => "invalid_rule",
            Self::ExpressionParse(_) => "expression_parse",
            Self::PredicateFailed(_) => "predicate_failed",
            Self::ExpressionFailed(_) => "expression_failed",
            Self::TypeMismatch { .. } => "type_mismatch",
            Self::Json(_) => "json",
        }
    }
}

pub type Result<T> = std::result::Result<T, RuleError>;
