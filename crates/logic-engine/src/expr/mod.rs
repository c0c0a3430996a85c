//! 受限布尔表达式
//!
//! 自定义条件不执行任意代码：表达式在规则注册期一次性编译为 AST，
//! 评估期由带步数预算的树遍历解释器求值。文法只包含字段引用、
//! 数值/字符串/布尔/null 字面量、六种比较操作符和 and/or/not 组合子。

mod eval;
mod lexer;
mod parser;

pub use eval::{Interpreter, MAX_EVAL_STEPS};
pub use lexer::{Lexer, Token};
pub use parser::{CompareOp, Expr, Literal, Parser, MAX_PARSE_DEPTH};

use crate::error::Result;
use crate::record::Record;

/// 编译完成的表达式程序
///
/// 保存源文本只为诊断输出；求值只走 AST。
#[derive(Debug, Clone)]
pub struct Program {
    source: String,
    root: Expr,
}

impl Program {
    /// 注册期编译；解析失败以配置错误的形式同步返回
    pub fn compile(source: &str) -> Result<Self> {
        let root = Parser::parse(source)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> &Expr {
        &self.root
    }

    /// 在默认步数预算内求值
    pub fn eval(&self, record: &Record) -> Result<bool> {
        Interpreter::new().run(&self.root, record)
    }
}
