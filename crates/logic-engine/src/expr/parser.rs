//! 受限表达式的语法分析
//!
//! 文法（自顶向下，优先级从低到高）：
//!
//! ```text
//! expr       := or_expr
//! or_expr    := and_expr ( "or" and_expr )*
//! and_expr   := not_expr ( "and" not_expr )*
//! not_expr   := "not" not_expr | comparison
//! comparison := operand ( ("==" | "!=" | ">" | ">=" | "<" | "<=") operand )?
//! operand    := literal | field | "(" expr ")"
//! ```
//!
//! 比较不可链式（`a < b < c` 是语法错误）；嵌套深度有硬上限。

use super::lexer::{Lexer, Token};
use crate::error::{Result, RuleError};

/// 解析器递归深度上限，防止恶意嵌套打爆栈
pub const MAX_PARSE_DEPTH: usize = 64;

/// 比较操作符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Eq => "==",
            Self::Neq => "!=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
        };
        write!(f, "{}", s)
    }
}

/// 字面量
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Number(f64),
    Str(String),
    Bool(bool),
    Null,
}

/// 表达式 AST
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Literal),
    /// 对记录字段的引用（点号路径）
    Field(String),
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

/// 语法分析器
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// 从源文本解析出 AST
    pub fn parse(source: &str) -> Result<Expr> {
        if source.trim().is_empty() {
            return Err(RuleError::ExpressionParse("表达式不能为空".to_string()));
        }

        let tokens = Lexer::new(source).tokenize()?;
        let mut parser = Self { tokens, pos: 0 };
        let expr = parser.parse_or(0)?;

        if let Some(token) = parser.peek() {
            return Err(RuleError::ExpressionParse(format!(
                "表达式结尾有多余的标记 '{}'",
                token
            )));
        }
        Ok(expr)
    }

    fn parse_or(&mut self, depth: usize) -> Result<Expr> {
        Self::check_depth(depth)?;
        let mut expr = self.parse_and(depth + 1)?;
        while self.eat(&Token::Or) {
            let rhs = self.parse_and(depth + 1)?;
            expr = Expr::Or(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_and(&mut self, depth: usize) -> Result<Expr> {
        Self::check_depth(depth)?;
        let mut expr = self.parse_not(depth + 1)?;
        while self.eat(&Token::And) {
            let rhs = self.parse_not(depth + 1)?;
            expr = Expr::And(Box::new(expr), Box::new(rhs));
        }
        Ok(expr)
    }

    fn parse_not(&mut self, depth: usize) -> Result<Expr> {
        Self::check_depth(depth)?;
        if self.eat(&Token::Not) {
            let inner = self.parse_not(depth + 1)?;
            return Ok(Expr::Not(Box::new(inner)));
        }
        self.parse_comparison(depth + 1)
    }

    fn parse_comparison(&mut self, depth: usize) -> Result<Expr> {
        Self::check_depth(depth)?;
        let lhs = self.parse_operand(depth + 1)?;

        let Some(op) = self.peek_compare_op() else {
            return Ok(lhs);
        };
        self.pos += 1;

        let rhs = self.parse_operand(depth + 1)?;
        if self.peek_compare_op().is_some() {
            return Err(RuleError::ExpressionParse(
                "比较不可链式，请用 'and' 连接".to_string(),
            ));
        }

        Ok(Expr::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    fn parse_operand(&mut self, depth: usize) -> Result<Expr> {
        Self::check_depth(depth)?;
        let Some(token) = self.next() else {
            return Err(RuleError::ExpressionParse(
                "表达式意外结束".to_string(),
            ));
        };

        match token {
            Token::Number(n) => Ok(Expr::Literal(Literal::Number(n))),
            Token::Str(s) => Ok(Expr::Literal(Literal::Str(s))),
            Token::True => Ok(Expr::Literal(Literal::Bool(true))),
            Token::False => Ok(Expr::Literal(Literal::Bool(false))),
            Token::Null => Ok(Expr::Literal(Literal::Null)),
            Token::Ident(path) => Ok(Expr::Field(path)),
            Token::LParen => {
                let inner = self.parse_or(depth + 1)?;
                if !self.eat(&Token::RParen) {
                    return Err(RuleError::ExpressionParse("括号未闭合".to_string()));
                }
                Ok(inner)
            }
            other => Err(RuleError::ExpressionParse(format!(
                "意外的标记 '{}'",
                other
            ))),
        }
    }

    fn check_depth(depth: usize) -> Result<()> {
        if depth > MAX_PARSE_DEPTH {
            return Err(RuleError::ExpressionParse(format!(
                "表达式嵌套超过上限 {}",
                MAX_PARSE_DEPTH
            )));
        }
        Ok(())
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_compare_op(&self) -> Option<CompareOp> {
        match self.peek()? {
            Token::Eq => Some(CompareOp::Eq),
            Token::Neq => Some(CompareOp::Neq),
            Token::Gt => Some(CompareOp::Gt),
            Token::Gte => Some(CompareOp::Gte),
            Token::Lt => Some(CompareOp::Lt),
            Token::Lte => Some(CompareOp::Lte),
            _ => None,
        }
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }
}
