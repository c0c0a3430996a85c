//! 受限表达式的词法分析

use crate::error::{Result, RuleError};

/// 表达式标记
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Number(f64),
    Str(String),
    /// 字段引用，允许点号分隔的路径段（含数组下标），如 `user.profile.age`
    Ident(String),
    True,
    False,
    Null,
    And,
    Or,
    Not,
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    LParen,
    RParen,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Str(s) => write!(f, "'{}'", s),
            Self::Ident(name) => write!(f, "{}", name),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
            Self::Null => write!(f, "null"),
            Self::And => write!(f, "and"),
            Self::Or => write!(f, "or"),
            Self::Not => write!(f, "not"),
            Self::Eq => write!(f, "=="),
            Self::Neq => write!(f, "!="),
            Self::Gt => write!(f, ">"),
            Self::Gte => write!(f, ">="),
            Self::Lt => write!(f, "<"),
            Self::Lte => write!(f, "<="),
            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
        }
    }
}

/// 词法分析器
pub struct Lexer<'src> {
    src: &'src [u8],
    pos: usize,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            src: source.as_bytes(),
            pos: 0,
        }
    }

    /// 将整个输入扫描为标记序列
    pub fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            let Some(c) = self.peek() else {
                break;
            };

            let token = match c {
                b'(' => {
                    self.advance();
                    Token::LParen
                }
                b')' => {
                    self.advance();
                    Token::RParen
                }
                b'=' => {
                    self.advance();
                    if self.eat(b'=') {
                        Token::Eq
                    } else {
                        return Err(self.error("'='，比较请使用 '=='"));
                    }
                }
                b'!' => {
                    self.advance();
                    if self.eat(b'=') {
                        Token::Neq
                    } else {
                        return Err(self.error("'!'，取反请使用 'not'"));
                    }
                }
                b'>' => {
                    self.advance();
                    if self.eat(b'=') { Token::Gte } else { Token::Gt }
                }
                b'<' => {
                    self.advance();
                    if self.eat(b'=') { Token::Lte } else { Token::Lt }
                }
                b'\'' | b'"' => self.read_string()?,
                b'-' | b'0'..=b'9' => self.read_number()?,
                b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.read_ident(),
                other if other.is_ascii_graphic() => {
                    return Err(self.error(&format!("'{}'", other as char)));
                }
                other => {
                    return Err(self.error(&format!("0x{:02x}", other)));
                }
            };
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn error(&self, what: &str) -> RuleError {
        RuleError::ExpressionParse(format!("位置 {} 处有意外的字符 {}", self.pos, what))
    }

    fn peek(&self) -> Option<u8> {
        self.src.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\r' | b'\n')) {
            self.advance();
        }
    }

    fn read_string(&mut self) -> Result<Token> {
        let quote = self.peek().unwrap_or(b'\'');
        self.advance();

        // 按字节收集，结束时整体还原 UTF-8，保证多字节字符不被拆散
        let mut bytes = Vec::new();
        loop {
            match self.peek() {
                None => {
                    return Err(RuleError::ExpressionParse(
                        "字符串字面量未闭合".to_string(),
                    ));
                }
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some(b'\\') => {
                    self.advance();
                    match self.peek() {
                        Some(b'\\') => bytes.push(b'\\'),
                        Some(b'\'') => bytes.push(b'\''),
                        Some(b'"') => bytes.push(b'"'),
                        Some(b'n') => bytes.push(b'\n'),
                        Some(b't') => bytes.push(b'\t'),
                        Some(other) => {
                            return Err(RuleError::ExpressionParse(format!(
                                "不支持的转义序列 '\\{}'",
                                other as char
                            )));
                        }
                        None => {
                            return Err(RuleError::ExpressionParse(
                                "字符串字面量未闭合".to_string(),
                            ));
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    bytes.push(c);
                    self.advance();
                }
            }
        }

        let value = String::from_utf8(bytes)
            .map_err(|_| RuleError::ExpressionParse("字符串字面量不是合法的 UTF-8".to_string()))?;
        Ok(Token::Str(value))
    }

    fn read_number(&mut self) -> Result<Token> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.advance();
            if !matches!(self.peek(), Some(b'0'..=b'9')) {
                return Err(self.error("'-'，负号后必须跟数字"));
            }
        }
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.advance();
        }
        if self.peek() == Some(b'.') && matches!(self.src.get(self.pos + 1), Some(b'0'..=b'9')) {
            self.advance();
            while matches!(self.peek(), Some(b'0'..=b'9')) {
                self.advance();
            }
        }

        let text = std::str::from_utf8(&self.src[start..self.pos]).expect("ASCII 数字序列");
        let number: f64 = text
            .parse()
            .map_err(|_| RuleError::ExpressionParse(format!("无法解析数字 '{}'", text)))?;
        Ok(Token::Number(number))
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while matches!(
            self.peek(),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | b'.')
        ) {
            self.advance();
        }

        let text = std::str::from_utf8(&self.src[start..self.pos]).expect("ASCII 标识符");
        match text {
            "true" => Token::True,
            "false" => Token::False,
            "null" => Token::Null,
            "and" => Token::And,
            "or" => Token::Or,
            "not" => Token::Not,
            _ => Token::Ident(text.to_string()),
        }
    }
}
