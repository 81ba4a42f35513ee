//! 表达式标记

use crate::operators::LogicalOperator;
use std::fmt;

/// 标记类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// 布尔字面量 `true` / `false`
    Literal,
    /// 数字（未替换的规则 ID）
    Number,
    Operator,
    Parenthesis,
    /// 紧跟 `(` 的字面量或数字，预留给调用形式
    Function,
}

/// 表达式标记，生成后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    symbol: String,
    kind: TokenKind,
    precedence: u8,
    right_associative: bool,
}

impl Token {
    pub fn new(symbol: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            symbol: symbol.into(),
            kind,
            precedence: 0,
            right_associative: false,
        }
    }

    pub fn operator(op: LogicalOperator) -> Self {
        Self {
            symbol: op.symbol().to_string(),
            kind: TokenKind::Operator,
            precedence: op.precedence(),
            right_associative: op.is_right_associative(),
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn precedence(&self) -> u8 {
        self.precedence
    }

    pub fn is_right_associative(&self) -> bool {
        self.right_associative
    }

    pub fn is_open_paren(&self) -> bool {
        self.kind == TokenKind::Parenthesis && self.symbol == "("
    }

    pub(crate) fn into_function(mut self) -> Self {
        self.kind = TokenKind::Function;
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.symbol)
    }
}

/// 解析布尔字面量（不区分大小写）
pub fn parse_boolean(symbol: &str) -> Option<bool> {
    if symbol.eq_ignore_ascii_case("true") {
        Some(true)
    } else if symbol.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boolean() {
        assert_eq!(parse_boolean("true"), Some(true));
        assert_eq!(parse_boolean("FALSE"), Some(false));
        assert_eq!(parse_boolean("True"), Some(true));
        assert_eq!(parse_boolean("yes"), None);
        assert_eq!(parse_boolean("1"), None);
    }

    #[test]
    fn test_operator_token_carries_table_entry() {
        let tok = Token::operator(LogicalOperator::Or);
        assert_eq!(tok.symbol(), "|");
        assert_eq!(tok.kind(), TokenKind::Operator);
        assert_eq!(tok.precedence(), 12);
        assert!(!tok.is_right_associative());
    }
}
